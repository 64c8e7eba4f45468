pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, SearchConfig};
pub use error::{FileGatherError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract, DestinationManager, ExtractionProgress, ExtractionReport, Extractor, FileMover,
    MoveOutcome, PlannedMove, SearchRequest,
};
pub use scanner::{Extension, ExtensionFilter, FileScanner, MatchedFile};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use ui::ProgressAwareOutput;

/// Main library interface: runs a gather with console reporting.
pub struct FileGather {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl FileGather {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Gathers every match of `request` into its destination, printing one
    /// line per file. Per-file failures are part of the report, not errors.
    pub fn run(&self, request: &SearchRequest) -> Result<ExtractionReport> {
        let extractor = Extractor::new(&self.config);

        self.output_formatter.start_operation(&format!(
            "Searching {} for '{}' files",
            request.root_path.display(),
            request.extension
        ));

        let spinner = self.progress_manager.create_spinner("Scanning folders...");
        let prepared = extractor.prepare(request);
        spinner.finish_and_clear();
        let prepared = prepared?;

        let destination = prepared.destination.get_output_directory().to_path_buf();
        self.output_formatter
            .info(&format!("Destination folder: {}", destination.display()));

        let stats = FileScanner::new(&self.config.search, &request.extension)
            .get_statistics(&prepared.files);
        self.output_formatter.debug(&stats.display_summary());

        self.output_formatter
            .print_match_count(prepared.files.len(), &request.extension);

        if prepared.files.is_empty() {
            return Ok(ExtractionReport::empty(request, &destination));
        }

        let file_progress = self
            .progress_manager
            .create_file_progress(prepared.files.len() as u64);
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));
        let progress_callback = |progress: &ExtractionProgress| {
            if let Some(outcome) = progress.last_outcome() {
                output.outcome(outcome);
            }
            ui::progress::update_file_progress(&file_progress, progress);
        };

        let progress = extractor.move_files(request, &prepared, Some(&progress_callback));

        ui::progress::finish_progress_with_summary(&file_progress, &progress);
        self.progress_manager.clear();

        Ok(ExtractionReport::from_progress(request, &destination, &progress))
    }

    /// Computes the moves `run` would make, touching nothing.
    pub fn plan(&self, request: &SearchRequest) -> Result<Vec<PlannedMove>> {
        Extractor::new(&self.config).plan(request)
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::sample().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &FileGatherError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
