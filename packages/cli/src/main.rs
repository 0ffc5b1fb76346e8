#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crash map tools.
//!
//! Each subcommand loads the selected dataset, applies the filter flags,
//! and prints or exports the result. Run without a subcommand for an
//! interactive session.
//!
//! Uses `indicatif-log-bridge` (via [`crash_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the download spinner never fight for the terminal.

mod interactive;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crash_map_cli_utils::{IndicatifProgress, MultiProgress};
use crash_map_crash_models::CrashRecord;
use crash_map_filter::options::SidebarOptions;
use crash_map_filter::{FilterCriteria, YearSelection, filter_crashes};
use crash_map_marker::{PopupTemplate, project_markers};
use crash_map_source::source_def::DatasetDefinition;
use crash_map_source::{LoadOptions, registry};

use crate::output::MarkerFormat;

/// Rows printed by `filter` when `--rows` is not given.
const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "crash_map", about = "Road crash dataset filtering and map export")]
struct Cli {
    /// Dataset identifier from the built-in registry
    #[arg(long, global = true, default_value = registry::DEFAULT_DATASET_ID)]
    dataset: String,
    /// Load the dataset definition from this TOML file instead of the registry
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Read rows from this local CSV instead of downloading
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    /// Maximum number of rows to load (for testing)
    #[arg(long, global = true)]
    limit: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Filter flags shared by the subcommands that work on a subset.
#[derive(Args, Clone)]
struct FilterArgs {
    /// `all` or a year. Defaults to the dataset's most recent year
    #[arg(long)]
    year: Option<YearSelection>,
    /// Exact suburb name
    #[arg(long)]
    suburb: Option<String>,
    /// Exact street name
    #[arg(long)]
    street: Option<String>,
    /// Exact severity (e.g. "Fatal")
    #[arg(long)]
    severity: Option<String>,
    /// Keep "Property damage only" crashes
    #[arg(long)]
    include_property_damage: bool,
}

impl FilterArgs {
    fn criteria(&self, default_year: i32) -> FilterCriteria {
        FilterCriteria {
            year: self.year.unwrap_or(YearSelection::Year(default_year)),
            suburb: self.suburb.clone(),
            street: self.street.clone(),
            severity: self.severity.clone(),
            exclude_property_damage_only: !self.include_property_damage,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in datasets
    Datasets,
    /// Show the values available for each filter
    Options {
        /// List every suburb and street instead of counts
        #[arg(long)]
        full: bool,
    },
    /// Count matching crashes and print the first rows
    Filter {
        #[command(flatten)]
        filter: FilterArgs,
        /// Number of rows to print
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },
    /// Export map markers for matching crashes
    Markers {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = MarkerFormat::Json)]
        format: MarkerFormat,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the dashboard charts for matching crashes
    Charts {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Start the API server
    Serve,
}

/// Resolves the dataset definition named on the command line.
fn resolve_dataset(cli: &Cli) -> Result<DatasetDefinition, crash_map_source::SourceError> {
    match &cli.config {
        Some(path) => registry::load_dataset_file(path),
        None => registry::find_dataset(&cli.dataset),
    }
}

/// Loads every row of `definition` with a progress spinner.
async fn load_records(
    definition: &DatasetDefinition,
    file: Option<PathBuf>,
    limit: Option<u64>,
    multi: &MultiProgress,
) -> Result<Vec<CrashRecord>, crash_map_source::SourceError> {
    let progress = IndicatifProgress::rows_bar(multi, &format!("Loading {}", definition.name()));
    let options = LoadOptions {
        limit,
        local_file: file,
    };
    let records = crash_map_source::load_dataset(definition, &options, &progress).await?;
    log::info!("Loaded {} crash records", records.len());
    Ok(records)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crash_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        return interactive::run(&multi, cli.file.clone(), cli.limit).await;
    };

    match command {
        Commands::Datasets => {
            println!("{:<20} {:<12} {:<11} NAME", "ID", "REGION", "YEARS");
            println!("{}", "-".repeat(70));
            for def in registry::all_datasets() {
                let years = format!("{}-{}", def.years.first, def.years.last);
                println!(
                    "{:<20} {:<12} {years:<11} {}",
                    def.id(),
                    def.region,
                    def.name()
                );
            }
        }
        Commands::Options { full } => {
            let def = resolve_dataset(&cli)?;
            let records = load_records(&def, cli.file.clone(), cli.limit, &multi).await?;
            let options =
                SidebarOptions::from_records(&def.years.descending(), def.years.default, &records);
            print!("{}", output::options_summary(&options, *full));
        }
        Commands::Filter { filter, rows } => {
            let def = resolve_dataset(&cli)?;
            let records = load_records(&def, cli.file.clone(), cli.limit, &multi).await?;
            let criteria = filter.criteria(def.years.default);
            let subset = filter_crashes(&records, &criteria);

            println!("{} of {} crashes match\n", subset.len(), records.len());
            let preview: Vec<&CrashRecord> = subset.iter().take(*rows).collect();
            print!("{}", output::crash_table(&preview));
        }
        Commands::Markers {
            filter,
            format,
            output: path,
        } => {
            let def = resolve_dataset(&cli)?;
            let records = load_records(&def, cli.file.clone(), cli.limit, &multi).await?;
            let criteria = filter.criteria(def.years.default);
            let subset = filter_crashes(&records, &criteria);

            let markers = project_markers(&subset, &PopupTemplate::new(def.has_fatality_total()));
            match markers.bounds {
                Some(b) => log::info!(
                    "{} markers within ({}, {})-({}, {})",
                    markers.len(),
                    b.south,
                    b.west,
                    b.north,
                    b.east
                ),
                None => log::info!("No markers to export"),
            }
            output::emit(&output::render_markers(&markers, *format)?, path.as_deref())?;
        }
        Commands::Charts { filter } => {
            let def = resolve_dataset(&cli)?;
            let records = load_records(&def, cli.file.clone(), cli.limit, &multi).await?;
            let criteria = filter.criteria(def.years.default);
            let subset = filter_crashes(&records, &criteria);
            print!(
                "{}",
                output::charts_summary(&crash_map_analytics::summarize(&subset, &criteria))
            );
        }
        Commands::Serve => {
            let def = resolve_dataset(&cli)?;
            let options = LoadOptions {
                limit: cli.limit,
                local_file: cli.file.clone(),
            };
            let (bind_addr, port) = crash_map_server::bind_from_env();
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(crash_map_server::run_server_with(
                    def, &options, bind_addr, port,
                ))
            })
            .await??;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_flags_map_to_criteria() {
        let cli = Cli::parse_from([
            "crash_map",
            "filter",
            "--year",
            "all",
            "--suburb",
            "Nambour",
            "--include-property-damage",
        ]);
        let Some(Commands::Filter { filter, rows }) = cli.command else {
            panic!("expected filter command");
        };
        let criteria = filter.criteria(2021);
        assert_eq!(criteria.year, YearSelection::All);
        assert_eq!(criteria.suburb.as_deref(), Some("Nambour"));
        assert!(!criteria.exclude_property_damage_only);
        assert_eq!(rows, DEFAULT_PREVIEW_ROWS);
    }

    #[test]
    fn filter_defaults_to_dashboard_selection() {
        let cli = Cli::parse_from(["crash_map", "charts"]);
        let Some(Commands::Charts { filter }) = cli.command else {
            panic!("expected charts command");
        };
        assert_eq!(
            filter.criteria(2021),
            FilterCriteria::dashboard_defaults(2021)
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from([
            "crash_map",
            "markers",
            "--format",
            "geojson",
            "--file",
            "crashes.csv",
            "--limit",
            "10",
        ]);
        assert_eq!(cli.file, Some(PathBuf::from("crashes.csv")));
        assert_eq!(cli.limit, Some(10));
        assert_eq!(cli.dataset, registry::DEFAULT_DATASET_ID);
        let Some(Commands::Markers { format, .. }) = cli.command else {
            panic!("expected markers command");
        };
        assert_eq!(format, MarkerFormat::Geojson);
    }
}
