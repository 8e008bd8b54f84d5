//! Progress indicators for download reporting.
//!
//! Wraps `indicatif` with the launcher's styling and automation support.
//! Bars are hidden entirely when the `LIFTOFF_NO_PROGRESS` environment
//! variable is set or the `--no-progress` flag asked for plain output, so
//! scripts and CI logs stay clean.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

/// Checks if progress bars should be disabled via the environment.
fn is_progress_disabled() -> bool {
    std::env::var("LIFTOFF_NO_PROGRESS").is_ok()
}

/// A byte-granularity transfer bar for one update run.
///
/// Positions are set in whole-file increments; the update protocol reports
/// no mid-file progress.
pub struct TransferBar {
    bar: IndicatifBar,
}

impl TransferBar {
    /// Create a bar spanning `total_bytes`, or a hidden one when progress
    /// output is disabled.
    #[must_use]
    pub fn new(total_bytes: u64, enabled: bool) -> Self {
        let bar = if enabled && !is_progress_disabled() {
            IndicatifBar::new(total_bytes)
        } else {
            IndicatifBar::hidden()
        };
        bar.set_style(download_style());
        Self {
            bar,
        }
    }

    /// Move the bar to an absolute byte position.
    pub fn set_position(&self, bytes: u64) {
        self.bar.set_position(bytes);
    }

    /// Show which file just completed.
    pub fn set_message(&self, message: String) {
        self.bar.set_message(message);
    }

    /// Complete the bar and clear it from the terminal.
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{msg:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
        .unwrap()
        .progress_chars("━╸━")
}
