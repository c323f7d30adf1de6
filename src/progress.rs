// src/progress.rs

// Terminal progress for the construction passes.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Progress of one pass over the memory-mapped GFA file, measured in bytes.
/// A disabled pass draws nothing.
pub struct PassProgress {
    bar: Option<ProgressBar>,
}

impl PassProgress {
    pub fn new(enabled: bool, pass: &str, total_bytes: usize) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new(total_bytes as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{prefix:>8.bold} [{elapsed_precise}] {bar:40.green/white} {bytes}/{total_bytes} {msg}",
            ) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.set_prefix(pass.to_string());
            bar.enable_steady_tick(TICK);
            bar
        });
        PassProgress { bar }
    }

    /// Marks everything before byte offset `end` as scanned.
    pub fn scanned(&self, end: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(end as u64);
        }
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Spinner for work without a byte count, such as compressing the index.
pub fn spinner(enabled: bool, message: String) -> Option<ProgressBar> {
    enabled.then(|| {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(TICK);
        bar
    })
}
