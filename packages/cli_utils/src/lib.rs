#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the crash map binaries.
//!
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so
//! log lines are printed above the progress bar instead of through it.
//! [`LoadProgressBar`] renders the pipeline's dataset load.

use std::sync::Arc;
use std::time::Duration;

use crash_map_pipeline::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str =
    "{spinner:.cyan} {msg:<28} {bar:30.green/dim} {pos}/{len} files [{elapsed}]";

/// Progress bar for [`BaseDataset::load`](crash_map_pipeline::BaseDataset::load).
///
/// Spins until the load reports how many files it will read.
pub struct LoadProgressBar {
    bar: ProgressBar,
}

impl LoadProgressBar {
    /// Adds a load bar to `multi`.
    #[must_use]
    pub fn attach(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        Arc::new(Self { bar })
    }
}

impl ProgressCallback for LoadProgressBar {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        log::debug!("{msg}");
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_and_clear();
        log::info!("{msg} in {:.1?}", self.bar.elapsed());
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge`.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Returns the
/// [`MultiProgress`] every progress bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    multi
}
