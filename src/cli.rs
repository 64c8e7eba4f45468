use crate::config::{CliOverrides, Config};
use crate::error::{FileGatherError, Result};
use crate::extractor::SearchRequest;
use crate::ui::{OutputMode, PromptDefaults};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filegather")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gather every file with a given extension into one folder")]
#[command(
    long_about = "filegather searches a folder tree for files with one extension and moves \
                  them all into a single destination folder, numbering duplicates instead of \
                  overwriting them."
)]
#[command(before_help = "📦 filegather - File Gathering Tool")]
#[command(after_help = "EXAMPLES:\n  \
    filegather ./projects -e ipt\n  \
    filegather ./projects -e .ipt -d ./all-parts\n  \
    filegather ./projects -e step --dry-run --exclude archive,old\n  \
    filegather --interactive\n\n\
    Run without arguments to be prompted for the folder and extension.")]
pub struct Cli {
    /// Parent folder to search recursively
    pub root: Option<PathBuf>,

    /// Extension to gather, with or without the leading dot
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Folder to move files into (defaults to the parent folder)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be moved without moving anything")]
    pub dry_run: bool,

    /// Always prompt for the folder, extension and destination
    #[arg(short, long)]
    pub interactive: bool,

    /// Maximum directory depth to descend
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Match the extension regardless of case
    #[arg(long)]
    pub ignore_case: bool,

    /// Follow symbolic links while searching
    #[arg(long)]
    pub follow_links: bool,

    /// Directory names to skip (comma-separated)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extension(self.extension.clone())
            .with_destination(self.destination.clone())
            .with_exclude(self.exclude.clone())
            .with_max_depth(self.max_depth)
            .with_ignore_case(self.ignore_case)
            .with_follow_links(self.follow_links)
    }

    /// True when the interactive wrapper has to fill in the request.
    pub fn needs_prompt(&self, config: &Config) -> bool {
        self.interactive || self.root.is_none() || config.search.extension.is_none()
    }

    /// Builds the request from flags merged with `config`.
    pub fn search_request(&self, config: &Config) -> Result<SearchRequest> {
        let root = self.root.clone().ok_or_else(|| FileGatherError::Config {
            message: "No parent folder given".to_string(),
        })?;
        let extension = config.search.extension.as_deref().unwrap_or_default();

        Ok(SearchRequest::new(root, extension)?.with_destination(config.output.destination.clone()))
    }

    pub fn prompt_defaults(&self, config: &Config) -> PromptDefaults {
        PromptDefaults {
            root: self.root.clone(),
            extension: config.search.extension.clone(),
            destination: config.output.destination.clone(),
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_format.into()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
