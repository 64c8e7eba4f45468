use crate::extractor::ExtractionProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const FILE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}";
const SCAN_TEMPLATE: &str = "{spinner:.green} {msg} ({elapsed})";
const TICK: Duration = Duration::from_millis(100);

/// Owns the bars of one run; every bar is hidden when output is not a
/// human-facing terminal.
pub struct ProgressManager {
    bars: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            bars: MultiProgress::new(),
            enabled,
        }
    }

    /// Bar counting processed matches.
    pub fn create_file_progress(&self, total_files: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(FILE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let pb = self.bars.add(ProgressBar::new(total_files).with_style(style));
        pb.set_message("gathering...");
        pb.enable_steady_tick(TICK);
        pb
    }

    /// Spinner shown while the tree is walked.
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(SCAN_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let pb = self.bars.add(ProgressBar::new_spinner().with_style(style));
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.bars.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.bars.clear().ok();
        }
    }
}

fn tally(progress: &ExtractionProgress) -> String {
    let mut parts = vec![format!("{} moved", progress.moved)];
    if progress.skipped > 0 {
        parts.push(format!("{} skipped", progress.skipped));
    }
    if progress.failed > 0 {
        parts.push(format!("{} failed", progress.failed));
    }
    parts.join(", ")
}

pub fn update_file_progress(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.set_position(progress.files_processed as u64);

    let mut message = progress.current_file.clone().unwrap_or_default();
    message.push_str(&format!(" [{}]", tally(progress)));

    let remaining = progress.estimated_remaining();
    if remaining.as_secs() > 0 {
        message.push_str(&format!(" ETA {}", format_duration(remaining)));
    }

    pb.set_message(message);
}

pub fn finish_progress_with_summary(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.finish_with_message(format!(
        "{} in {}",
        tally(progress),
        format_duration(progress.elapsed())
    ));
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        3600.. => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
        60.. => format!("{}m {}s", secs / 60, secs % 60),
        1.. => format!("{}s", secs),
        0 => format!("{}ms", duration.as_millis()),
    }
}
