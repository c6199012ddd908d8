#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing shared by the disaster risk binaries.
//!
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so log
//! lines never tear a progress bar, and [`IndicatifProgress`] renders the
//! analytics [`ProgressCallback`] updates.

use std::sync::Arc;
use std::time::Duration;

use disaster_risk_analytics::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const TICK: Duration = Duration::from_millis(100);

fn style(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| fallback())
}

/// A [`ProgressCallback`] drawn with `indicatif`.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied by `set_total()` once the amount of work is known.
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    fn spinning(multi: &MultiProgress, message: &str, sized_style: ProgressStyle) -> Arc<Self> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(TICK);
        bar.set_style(style("{spinner:.red} {msg}", ProgressStyle::default_spinner));
        bar.set_message(message.to_string());

        Arc::new(Self { bar, sized_style })
    }

    /// Bar for per-district assessment runs.
    ///
    /// Spins until [`ProgressCallback::set_total()`] reports the district
    /// count, then shows position, percentage and elapsed time.
    #[must_use]
    pub fn assessment_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let sized = style(
            "  {msg:<24} {wide_bar:.red/dim} {pos}/{len} {percent}% [{elapsed}]",
            ProgressStyle::default_bar,
        )
        .progress_chars("=>-");

        Self::spinning(multi, message, sized)
    }

    /// Spinner for a single step with no countable work, such as loading
    /// the analysis layers.
    #[must_use]
    pub fn spinner(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar_style = style("{spinner:.red} {msg} [{elapsed}]", ProgressStyle::default_spinner);
        Self::spinning(multi, message, bar_style)
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.sized_style.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge`.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Every progress bar must
/// be added to the returned [`MultiProgress`].
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
        .is_err()
    {
        log::debug!("Logger already installed");
    }
    log::set_max_level(level);

    multi
}
