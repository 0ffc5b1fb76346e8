//! Plain-text and file output for CLI results.

use std::path::Path;

use clap::ValueEnum;
use crash_map_analytics_models::DashboardCharts;
use crash_map_crash_models::CrashRecord;
use crash_map_filter::YearSelection;
use crash_map_filter::options::SidebarOptions;
use crash_map_marker::MarkerSet;

/// Serialization format for exported markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkerFormat {
    /// The raw marker list with bounds.
    Json,
    /// A GeoJSON `FeatureCollection`.
    Geojson,
}

/// Human label for a year choice.
pub fn year_label(year: YearSelection) -> String {
    match year {
        YearSelection::All => "All".to_string(),
        YearSelection::Year(y) => y.to_string(),
    }
}

/// Joins `lines`, ending every one with a newline.
fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Renders rows as a fixed-width table.
pub fn crash_table(rows: &[&CrashRecord]) -> String {
    let mut lines = vec![
        format!(
            "{:<12} {:<6} {:<10} {:<22} {:<24} {:<20}",
            "REF", "YEAR", "DAY", "SEVERITY", "STREET", "SUBURB"
        ),
        "-".repeat(99),
    ];
    lines.extend(rows.iter().map(|r| {
        format!(
            "{:<12} {:<6} {:<10} {:<22} {:<24} {:<20}",
            r.ref_number, r.year, r.day_of_week, r.severity, r.street, r.suburb
        )
    }));
    block(lines)
}

/// Renders option lists. Suburbs and streets are summarized by count
/// unless `full` is set.
pub fn options_summary(options: &SidebarOptions, full: bool) -> String {
    let years: Vec<String> = options.years.iter().copied().map(year_label).collect();

    let mut lines = vec![
        format!("Years:      {}", years.join(", ")),
        format!("Default:    {}", year_label(options.default_year)),
        format!("Severities: {}", options.severities.join(", ")),
    ];

    if full {
        lines.push(format!("\nSuburbs ({}):", options.suburbs.len()));
        lines.extend(options.suburbs.iter().map(|suburb| format!("  {suburb}")));
        lines.push(format!("\nStreets ({}):", options.streets.len()));
        lines.extend(options.streets.iter().map(|street| format!("  {street}")));
    } else {
        lines.push(format!("Suburbs:    {}", options.suburbs.len()));
        lines.push(format!("Streets:    {}", options.streets.len()));
    }
    block(lines)
}

/// Renders every chart as a text listing.
pub fn charts_summary(charts: &DashboardCharts) -> String {
    let mut lines = vec![format!("{} crashes\n", charts.total)];

    lines.push(charts.top_streets.title.clone());
    lines.extend(
        charts
            .top_streets
            .points
            .iter()
            .map(|p| format!("  {:<32} {:>6}", p.street, p.count)),
    );

    lines.push(format!("\n{}", charts.severity_share.title));
    lines.extend(charts.severity_share.points.iter().map(|p| {
        format!(
            "  {:<32} {:>6} {:>6.1}%",
            p.severity,
            p.count,
            p.share * 100.0
        )
    }));

    lines.push(format!("\n{}", charts.crashes_per_day.title));
    lines.extend(
        charts
            .crashes_per_day
            .points
            .iter()
            .map(|p| format!("  {:<32} {:>6}", p.day, p.count)),
    );

    lines.push(format!("\n{}", charts.crashes_per_hour.title));
    lines.extend(charts.crashes_per_hour.points.iter().map(|p| {
        let hour = format!("{:02}:00", p.hour);
        format!("  {hour:<32} {:>6}", p.count)
    }));
    block(lines)
}

/// Serializes markers in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_markers(markers: &MarkerSet, format: MarkerFormat) -> serde_json::Result<String> {
    match format {
        MarkerFormat::Json => serde_json::to_string_pretty(markers),
        MarkerFormat::Geojson => serde_json::to_string_pretty(&markers.to_geojson()),
    }
}

/// Writes `contents` to `path`, or stdout when `path` is `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn emit(contents: &str, path: Option<&Path>) -> std::io::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, contents)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}
