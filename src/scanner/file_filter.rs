use crate::config::SearchConfig;
use crate::error::{FileGatherError, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// A file extension normalized to start with `.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Extension(String);

impl Extension {
    /// Normalizes `raw` so it starts with a dot. Fails on an empty input or a
    /// bare dot, which would match nothing meaningful.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let normalized = if trimmed.starts_with('.') {
            trimmed.to_string()
        } else {
            format!(".{}", trimmed)
        };

        if normalized.len() < 2 || normalized.contains(['/', '\\']) {
            return Err(FileGatherError::InvalidExtension {
                extension: raw.to_string(),
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct ExtensionFilter {
    extension: Extension,
    ignore_case: bool,
    exclude_dirs: Vec<String>,
}

impl ExtensionFilter {
    pub fn new(config: &SearchConfig, extension: &Extension) -> Self {
        Self {
            extension: extension.clone(),
            ignore_case: config.ignore_case,
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    pub fn is_match(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.split_name(name).is_some())
    }

    /// Splits `filename` into the part before the matched extension and the
    /// matched extension itself, keeping the file's own casing. Works on the
    /// raw name, so names that are not valid UTF-8 still match.
    pub fn split_name<'a>(&self, filename: &'a OsStr) -> Option<(&'a OsStr, &'a OsStr)> {
        let ext = self.extension.as_str().as_bytes();
        let name = filename.as_encoded_bytes();
        let split_at = name.len().checked_sub(ext.len())?;

        let (stem, suffix) = name.split_at(split_at);
        let matches = if self.ignore_case {
            suffix.eq_ignore_ascii_case(ext)
        } else {
            suffix == ext
        };
        if !matches {
            return None;
        }

        // SAFETY: both halves come from `filename`, and the split sits right
        // before the ASCII '.' that starts the matched suffix.
        let parts = unsafe {
            (
                OsStr::from_encoded_bytes_unchecked(stem),
                OsStr::from_encoded_bytes_unchecked(suffix),
            )
        };
        Some(parts)
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        match path.file_name().and_then(|s| s.to_str()) {
            Some(dir_name) => !self
                .exclude_dirs
                .iter()
                .any(|exclude| exclude.eq_ignore_ascii_case(dir_name)),
            None => true,
        }
    }
}
