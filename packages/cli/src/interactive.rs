//! Interactive dashboard session.
//!
//! Walks the user through the same choices as the dashboard sidebar
//! (dataset, year, suburb, street, severity, property-damage toggle), then
//! prints the matching crash count, the preview rows, and the charts, and
//! optionally exports the markers.

use std::path::PathBuf;

use crash_map_cli_utils::MultiProgress;
use crash_map_filter::options::{self, SidebarOptions};
use crash_map_filter::{FilterCriteria, filter_crashes};
use crash_map_marker::{PopupTemplate, project_markers};
use crash_map_source::registry;
use dialoguer::{Confirm, Input, Select};

use crate::output::{self, MarkerFormat};

/// Label for "no constraint" in the select lists.
const ANY: &str = "(any)";

/// Prompts for one value from `values`, with [`ANY`] first.
fn select_optional(prompt: &str, values: &[String]) -> Result<Option<String>, dialoguer::Error> {
    let mut items: Vec<&str> = Vec::with_capacity(values.len() + 1);
    items.push(ANY);
    items.extend(values.iter().map(String::as_str));

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .max_length(15)
        .interact()?;

    Ok(idx.checked_sub(1).and_then(|i| values.get(i).cloned()))
}

/// Runs the interactive session.
///
/// # Errors
///
/// Returns an error if a prompt fails, the dataset cannot be loaded, or the
/// marker export cannot be written.
pub async fn run(
    multi: &MultiProgress,
    file: Option<PathBuf>,
    limit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Crash Map");
    println!();

    let datasets = registry::all_datasets();
    let labels: Vec<String> = datasets
        .iter()
        .map(|d| format!("{} ({})", d.name(), d.region))
        .collect();
    let idx = Select::new()
        .with_prompt("Dataset")
        .items(&labels)
        .default(0)
        .interact()?;
    let def = datasets
        .into_iter()
        .nth(idx)
        .ok_or("no dataset selected")?;

    if let Some(license) = &def.license.attribution_text {
        println!("Data: {license}");
    }

    let records = crate::load_records(&def, file, limit, multi).await?;
    let choices = SidebarOptions::from_records(&def.years.descending(), def.years.default, &records);

    let year_labels: Vec<String> = choices.years.iter().copied().map(output::year_label).collect();
    let default_year = choices
        .years
        .iter()
        .position(|y| *y == choices.default_year)
        .unwrap_or(0);
    let year_idx = Select::new()
        .with_prompt("Year")
        .items(&year_labels)
        .default(default_year)
        .interact()?;
    let year = choices.years[year_idx];

    let suburb = select_optional("Suburb", &choices.suburbs)?;
    let street = select_optional("Street", &choices.streets)?;
    let severity = select_optional("Crash severity", &choices.severities)?;

    let exclude_property_damage_only = Confirm::new()
        .with_prompt("Ignore property damage only crashes?")
        .default(true)
        .interact()?;

    let criteria = FilterCriteria {
        year,
        suburb,
        street,
        severity,
        exclude_property_damage_only,
    };
    let subset = filter_crashes(&records, &criteria);

    println!();
    println!("{} of {} crashes match", subset.len(), records.len());
    println!();
    print!("{}", output::charts_summary(&crash_map_analytics::summarize(&subset, &criteria)));

    println!();
    println!("First five rows of data");
    let preview = options::preview(&records, &criteria, 5);
    print!("{}", output::crash_table(&preview));
    println!();

    let markers = project_markers(&subset, &PopupTemplate::new(def.has_fatality_total()));
    if markers.is_empty() {
        println!("No crashes with coordinates to map.");
        return Ok(());
    }

    if Confirm::new()
        .with_prompt(format!("Export {} markers as GeoJSON?", markers.len()))
        .default(false)
        .interact()?
    {
        let path: String = Input::new()
            .with_prompt("Output file")
            .default("crash_markers.geojson".to_string())
            .interact_text()?;
        let path = PathBuf::from(path);
        output::emit(
            &output::render_markers(&markers, MarkerFormat::Geojson)?,
            Some(&path),
        )?;
    }

    Ok(())
}
