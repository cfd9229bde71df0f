#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renders the crash map for one set of filter settings.
//!
//! Loads the datasets named by a pipeline configuration (the embedded
//! Baltimore City configuration by default), applies the date range,
//! non-motorist toggle, and layer selection given on the command line, and
//! writes the resulting layers and map view as JSON.
//!
//! Uses `indicatif-log-bridge` (via [`crash_map_cli_utils::init_logger`])
//! so that log lines and the load progress bar never fight for the
//! terminal.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use crash_map_cli_utils::LoadProgressBar;
use crash_map_layer_models::{BaseMap, DateRange, FilterCriteria, HeatmapConfig, LayerId};
use crash_map_pipeline::{BaseDataset, DatasetCache, PipelineConfig};

#[derive(Parser)]
#[command(name = "crash_map_cli", about = "Crash heatmap renderer")]
struct Cli {
    /// Pipeline configuration file (defaults to the embedded Baltimore City config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// First crash date to include (defaults to the earliest in the data)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last crash date to include (defaults to the latest in the data)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Only include crashes involving a non-motorist
    #[arg(long)]
    nonmotorist_only: bool,

    /// Overlay layer to show (repeatable)
    #[arg(long = "layer")]
    layers: Vec<LayerId>,

    /// Heatmap point radius in pixels (1-100)
    #[arg(long)]
    radius: Option<u32>,

    /// Heatmap blur in pixels (1-100)
    #[arg(long)]
    blur: Option<u32>,

    /// Minimum heatmap opacity (0-1)
    #[arg(long)]
    min_opacity: Option<f64>,

    /// Background tiles
    #[arg(long, default_value_t = BaseMap::default())]
    base_map: BaseMap,

    /// Write the render here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crash_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::baltimore(),
    };
    log::info!("Using config '{}' ({})", config.id, config.name);

    let progress = LoadProgressBar::attach(&multi, "Loading datasets");
    let mut cache = DatasetCache::new();
    let dataset = cache.get_or_load(&config, progress.as_ref())?;

    let criteria = build_criteria(&cli, &dataset)?;
    let render = dataset.render(&criteria);

    if let Some(message) = &render.validation_message {
        eprintln!("{message}");
    }
    log::info!(
        "Rendered {} layers from {} incidents",
        render.layers.len(),
        render.incident_count
    );

    let json = serde_json::to_string_pretty(&render)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Fills in whatever the command line leaves out from the dataset's
/// default criteria.
fn build_criteria(
    cli: &Cli,
    dataset: &BaseDataset,
) -> Result<FilterCriteria, Box<dyn std::error::Error>> {
    let span = dataset.default_criteria().map(|c| c.date_range);
    let (Some(start), Some(end)) = (
        cli.start.or_else(|| span.map(|s| s.start)),
        cli.end.or_else(|| span.map(|s| s.end)),
    ) else {
        return Err("No incidents loaded; pass both --start and --end".into());
    };

    let defaults = HeatmapConfig::default();
    let heatmap = HeatmapConfig::new(
        cli.radius.unwrap_or(defaults.radius),
        cli.blur.unwrap_or(defaults.blur),
        cli.min_opacity.unwrap_or(defaults.min_opacity),
    )?;

    let mut criteria = FilterCriteria {
        nonmotorist_only: cli.nonmotorist_only,
        heatmap,
        base_map: cli.base_map,
        ..FilterCriteria::new(DateRange::new(start, end))
    };
    for layer in &cli.layers {
        criteria = criteria.with_layer(*layer);
    }

    Ok(criteria)
}
