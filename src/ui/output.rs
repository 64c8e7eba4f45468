use crate::error::{FileGatherError, UserFriendlyError};
use crate::extractor::{ExtractionReport, MoveOutcome, PlannedMove};
use crate::scanner::Extension;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static ARROW: Emoji = Emoji("➜ ", "-> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    /// Errors are printed even in quiet mode.
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn start_operation(&self, operation: &str) {
        self.emit(Level::Start, operation);
    }

    fn emit(&self, level: Level, message: &str) {
        if let Some(min_verbosity) = level.min_verbosity() {
            if !self.should_show_message(min_verbosity) {
                return;
            }
        }

        match self.mode {
            OutputMode::Human => self.print_human_message(level, message),
            OutputMode::Json => self.print_json_message(level.json_name(), message),
            OutputMode::Plain if level == Level::Error => {
                eprintln!("{}: {}", level.plain_prefix(), message)
            }
            OutputMode::Plain => println!("{}: {}", level.plain_prefix(), message),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &FileGatherError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Per-run reporting
    pub fn print_match_count(&self, count: usize, extension: &Extension) {
        if count == 0 {
            self.print_no_matches(extension);
            return;
        }

        let message = format!("Found {} file(s) with extension '{}'", count, extension);
        match self.mode {
            OutputMode::Human if self.should_show_message(0) => {
                self.print_human_message(Level::Info, &message)
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "matches",
                "count": count,
                "extension": extension.as_str()
            })),
            OutputMode::Plain if self.should_show_message(0) => println!("FOUND: {}", count),
            _ => {}
        }
    }

    pub fn print_no_matches(&self, extension: &Extension) {
        let message = format!("No files with extension '{}' found", extension);
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "matches",
                "count": 0,
                "extension": extension.as_str()
            })),
            _ => self.warning(&message),
        }
    }

    /// One status line for a processed file.
    pub fn print_outcome(&self, outcome: &MoveOutcome) {
        match self.mode {
            OutputMode::Json => {
                let mut value = serde_json::to_value(outcome).unwrap_or_default();
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("type".to_string(), "outcome".into());
                }
                self.print_json_object(&value);
            }
            OutputMode::Plain => match outcome {
                MoveOutcome::Skipped { source } => {
                    if self.should_show_message(0) {
                        println!("SKIPPED: {}", source.display());
                    }
                }
                MoveOutcome::Moved {
                    source,
                    destination,
                } => {
                    if self.should_show_message(0) {
                        println!("MOVED: {} -> {}", source.display(), destination.display());
                    }
                }
                MoveOutcome::Failed { source, message } => {
                    eprintln!("FAILED: {}: {}", source.display(), message)
                }
            },
            OutputMode::Human => match outcome {
                MoveOutcome::Skipped { source } => {
                    if self.should_show_message(0) {
                        println!(
                            "  {} {} (already in destination)",
                            self.dim("skipped"),
                            file_label(source)
                        );
                    }
                }
                MoveOutcome::Moved {
                    source,
                    destination,
                } => {
                    if self.should_show_message(0) {
                        let arrow = if self.use_colors {
                            ARROW.to_string()
                        } else {
                            "-> ".to_string()
                        };
                        println!(
                            "  {} {} {}{}",
                            self.green("moved"),
                            file_label(source),
                            arrow,
                            destination.display()
                        );
                    }
                }
                MoveOutcome::Failed { source, message } => {
                    self.error(&format!("Error moving {}: {}", source.display(), message))
                }
            },
        }
    }

    /// Prints what a dry run would do.
    pub fn print_plan(&self, plan: &[PlannedMove]) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "plan",
                    "moves": plan
                }));
            }
            _ => {
                if self.quiet {
                    return;
                }
                for entry in plan {
                    match &entry.destination {
                        Some(dest) => println!(
                            "  would move {} -> {}",
                            entry.source.display(),
                            dest.display()
                        ),
                        None => println!(
                            "  would skip {} (already in destination)",
                            entry.source.display()
                        ),
                    }
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_extraction_summary(&self, report: &ExtractionReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => {}
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            _ => self.print_extraction_summary(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn green(&self, text: &str) -> String {
        if self.use_colors {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn print_human_message(&self, level: Level, message: &str) {
        let line = if self.use_colors {
            let styled = match level {
                Level::Success => style(message).green().bold(),
                Level::Error => style(message).red().bold(),
                Level::Warning => style(message).yellow().bold(),
                Level::Info => style(message).cyan(),
                Level::Debug => style(message).dim(),
                Level::Start => style(message).bold(),
            };
            format!("{}{}", level.emoji(), styled)
        } else {
            format!("{} {}", level.symbol(), message)
        };

        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, report: &ExtractionReport) {
        let summary = &report.summary;
        let duration = Duration::from_millis(summary.duration_ms as u64);

        println!();
        self.print_separator();

        let headline = format!(
            "Done. Moved {} file(s) to {}",
            summary.moved,
            report.destination.display()
        );
        if self.use_colors {
            println!("{}{}", CHECKMARK, style(headline).green().bold());
        } else {
            println!("✓ {}", headline);
        }

        println!();
        println!("  Files found:  {}", self.highlight(summary.files_found.to_string()));
        println!("  Moved:        {}", self.highlight(summary.moved.to_string()));
        if summary.skipped > 0 {
            println!("  Skipped:      {}", self.highlight(summary.skipped.to_string()));
        }
        if summary.failed > 0 {
            let failed = if self.use_colors {
                style(summary.failed).red().bold().to_string()
            } else {
                summary.failed.to_string()
            };
            println!("  Failed:       {}", failed);
        }
        println!("  Size moved:   {}", self.highlight(format_bytes(summary.bytes_moved)));
        println!("  Time taken:   {}", self.highlight(format_duration(duration)));

        self.print_separator();
    }

    fn highlight(&self, text: String) -> String {
        if self.use_colors {
            style(text).cyan().bold().to_string()
        } else {
            text
        }
    }

    fn print_plain_summary(&self, report: &ExtractionReport) {
        let summary = &report.summary;
        println!("COMPLETED: Moved {} file(s)", summary.moved);
        println!("Found: {}", summary.files_found);
        println!("Skipped: {}", summary.skipped);
        println!("Failed: {}", summary.failed);
        println!("Bytes moved: {}", summary.bytes_moved);
        println!("Duration: {}ms", summary.duration_ms);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Error,
    Warning,
    Info,
    Debug,
    Start,
}

impl Level {
    /// `None` means the message is never suppressed.
    fn min_verbosity(self) -> Option<u8> {
        match self {
            Level::Error => None,
            Level::Success | Level::Warning | Level::Start => Some(0),
            Level::Info => Some(1),
            Level::Debug => Some(2),
        }
    }

    fn json_name(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Start => "operation_start",
        }
    }

    fn plain_prefix(self) -> &'static str {
        match self {
            Level::Success => "SUCCESS",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Start => "STARTING",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Level::Success => "✓",
            Level::Error => "✗",
            Level::Warning => "!",
            Level::Info => "i",
            Level::Debug => "  DEBUG:",
            Level::Start => ">",
        }
    }

    fn emoji(self) -> Emoji<'static, 'static> {
        match self {
            Level::Success => CHECKMARK,
            Level::Error => CROSS,
            Level::Warning => WARNING,
            Level::Info => INFO,
            Level::Debug => Emoji("  ", "  "),
            Level::Start => ROCKET,
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Routes messages through the progress bar so lines don't tear it.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn outcome(&self, outcome: &MoveOutcome) {
        self.suspend_and_print(|f| f.print_outcome(outcome));
    }

}
