use crate::error::{FileGatherError, Result};
use crate::scanner::Extension;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Extension used when none is given on the command line
    pub extension: Option<String>,
    pub ignore_case: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub exclude_dirs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination used when none is given on the command line
    pub destination: Option<PathBuf>,
    pub preserve_timestamps: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: None,
            preserve_timestamps: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FileGatherError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FileGatherError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| FileGatherError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["filegather.toml", ".filegather.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extension) = cli_args.extension {
            self.search.extension = Some(extension.clone());
        }

        if let Some(ref destination) = cli_args.destination {
            self.output.destination = Some(destination.clone());
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.search.exclude_dirs.extend(exclude.iter().cloned());
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.search.max_depth = Some(max_depth);
        }

        if cli_args.ignore_case {
            self.search.ignore_case = true;
        }

        if cli_args.follow_links {
            self.search.follow_links = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| FileGatherError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| FileGatherError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref extension) = self.search.extension {
            Extension::parse(extension)?;
        }

        if self.search.max_depth == Some(0) {
            return Err(FileGatherError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if self
            .search
            .exclude_dirs
            .iter()
            .any(|dir| dir.trim().is_empty())
        {
            return Err(FileGatherError::Config {
                message: "Excluded directory names cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Starting point written by `--generate-config`.
    pub fn sample() -> Self {
        let mut sample_config = Self::default();
        sample_config.search.extension = Some("ipt".to_string());
        sample_config.search.max_depth = Some(32);
        sample_config
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extension: Option<String>,
    pub destination: Option<PathBuf>,
    pub exclude: Option<Vec<String>>,
    pub max_depth: Option<usize>,
    pub ignore_case: bool,
    pub follow_links: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_destination(mut self, destination: Option<PathBuf>) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}
