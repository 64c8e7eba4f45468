use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileGatherError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Root folder does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Invalid file extension: '{extension}'")]
    InvalidExtension { extension: String },

    #[error("Failed to create destination folder {path}: {source}")]
    DestinationCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Prompt failed: {message}")]
    Prompt { message: String },
}

impl FileGatherError {
    /// Process exit status for a run that stopped with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            FileGatherError::RootNotFound { .. } | FileGatherError::NotADirectory { .. } => 3,
            FileGatherError::InvalidExtension { .. } => 4,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for FileGatherError {
    fn user_message(&self) -> String {
        match self {
            FileGatherError::RootNotFound { path } => {
                format!("Parent folder '{}' does not exist!", path.display())
            }
            FileGatherError::NotADirectory { path } => {
                format!("'{}' is a file, not a folder", path.display())
            }
            FileGatherError::InvalidExtension { extension } => {
                format!("'{}' is not a usable file extension", extension)
            }
            FileGatherError::DestinationCreation { path, source } => {
                format!(
                    "Could not create destination folder {}: {}",
                    path.display(),
                    source
                )
            }
            FileGatherError::Move { from, source, .. } => {
                format!("Error moving {}: {}", from.display(), source)
            }
            FileGatherError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            FileGatherError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            FileGatherError::Prompt { message } => {
                format!("Could not read input: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            FileGatherError::RootNotFound { .. } => Some(
                "Check the spelling of the folder path. Relative paths are resolved from the current working directory.".to_string()
            ),
            FileGatherError::NotADirectory { .. } => Some(
                "Pass the folder that contains the files, not one of the files itself.".to_string()
            ),
            FileGatherError::InvalidExtension { .. } => Some(
                "Give an extension such as 'ipt' or '.ipt'.".to_string()
            ),
            FileGatherError::DestinationCreation { .. } => Some(
                "Ensure you have write permission for the parent of the destination folder.".to_string()
            ),
            FileGatherError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for FileGatherError {
    fn from(error: toml::de::Error) -> Self {
        FileGatherError::Config {
            message: error.to_string(),
        }
    }
}

impl From<dialoguer::Error> for FileGatherError {
    fn from(error: dialoguer::Error) -> Self {
        FileGatherError::Prompt {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FileGatherError>;
