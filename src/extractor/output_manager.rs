use crate::error::{FileGatherError, Result};
use crate::extractor::file_extractor::{ExtractionProgress, MoveOutcome, SearchRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Owns the destination folder of one run: creating it and deciding whether
/// a file already sits directly inside it.
pub struct DestinationManager {
    requested: PathBuf,
    canonical: Option<PathBuf>,
}

impl DestinationManager {
    pub fn for_request(request: &SearchRequest) -> Self {
        let requested = request.destination_dir().to_path_buf();
        let canonical = fs::canonicalize(&requested).ok();

        Self {
            requested,
            canonical,
        }
    }

    /// Creates the destination with all missing parents. Returns whether the
    /// folder had to be created; an existing folder is left untouched.
    pub fn initialize(&mut self) -> Result<bool> {
        let created = if self.requested.is_dir() {
            false
        } else if self.requested.exists() {
            return Err(FileGatherError::DestinationCreation {
                path: self.requested.clone(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "path exists and is not a directory",
                ),
            });
        } else {
            fs::create_dir_all(&self.requested).map_err(|source| {
                FileGatherError::DestinationCreation {
                    path: self.requested.clone(),
                    source,
                }
            })?;
            tracing::info!("Created destination folder {}", self.requested.display());
            true
        };

        self.canonical = fs::canonicalize(&self.requested).ok();
        Ok(created)
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.requested
    }

    /// True when `file` lives directly in the destination folder, not in one
    /// of its subfolders.
    pub fn contains_directly(&self, file: &Path) -> bool {
        let Some(parent) = file.parent() else {
            return false;
        };

        if parent == self.requested {
            return true;
        }

        match (&self.canonical, fs::canonicalize(parent)) {
            (Some(dest), Ok(parent)) => *dest == parent,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    #[serde(serialize_with = "crate::extractor::file_extractor::lossy_path")]
    pub root_path: PathBuf,
    #[serde(serialize_with = "crate::extractor::file_extractor::lossy_path")]
    pub destination: PathBuf,
    pub extension: String,
    pub summary: ExtractionSummary,
    pub outcomes: Vec<MoveOutcome>,
    pub extraction_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub files_found: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_moved: u64,
    pub duration_ms: u128,
}

impl ExtractionReport {
    pub fn from_progress(
        request: &SearchRequest,
        destination: &Path,
        progress: &ExtractionProgress,
    ) -> Self {
        Self {
            root_path: request.root_path.clone(),
            destination: destination.to_path_buf(),
            extension: request.extension.to_string(),
            summary: ExtractionSummary {
                files_found: progress.total_files,
                moved: progress.moved,
                skipped: progress.skipped,
                failed: progress.failed,
                bytes_moved: progress.bytes_moved,
                duration_ms: progress.elapsed().as_millis(),
            },
            outcomes: progress.outcomes.clone(),
            extraction_time: Utc::now(),
        }
    }

    /// Report for a run that found nothing to move.
    pub fn empty(request: &SearchRequest, destination: &Path) -> Self {
        Self {
            root_path: request.root_path.clone(),
            destination: destination.to_path_buf(),
            extension: request.extension.to_string(),
            summary: ExtractionSummary::default(),
            outcomes: Vec::new(),
            extraction_time: Utc::now(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}
