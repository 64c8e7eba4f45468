use crate::config::SearchConfig;
use crate::error::{FileGatherError, Result};
use crate::scanner::file_filter::{Extension, ExtensionFilter};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct MatchedFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: OsString,
    pub size: u64,
}

impl MatchedFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();

        Self {
            source_path,
            relative_path,
            filename,
            size,
        }
    }

    pub fn parent_dir(&self) -> Option<&Path> {
        self.source_path.parent()
    }
}

pub struct FileScanner {
    filter: ExtensionFilter,
    follow_links: bool,
    max_depth: Option<usize>,
}

impl FileScanner {
    pub fn new(config: &SearchConfig, extension: &Extension) -> Self {
        Self {
            filter: ExtensionFilter::new(config, extension),
            follow_links: config.follow_links,
            max_depth: config.max_depth,
        }
    }

    pub fn filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    /// Checks that `root` is an existing directory.
    pub fn validate_root(root: &Path) -> Result<()> {
        if !root.exists() {
            return Err(FileGatherError::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        if !root.is_dir() {
            return Err(FileGatherError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        Ok(())
    }

    /// Collects every matching file under `root`, the root itself included.
    /// Entries are visited in file-name order so the result is deterministic.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<MatchedFile>> {
        let root_path = root.as_ref();
        Self::validate_root(root_path)?;

        let mut matches = Vec::new();

        let mut walker = WalkDir::new(root_path)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let walker = walker
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Unreadable subtrees are reported but never abort the scan
                    tracing::warn!("Scan warning: {}", err);
                    continue;
                }
            };

            // Symlinks that are not followed are gathered as links
            if entry.file_type().is_dir() || !self.filter.is_match(entry.path()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    tracing::warn!("Cannot read metadata for {}: {}", entry.path().display(), err);
                    0
                }
            };

            let relative_path = entry
                .path()
                .strip_prefix(root_path)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());

            tracing::debug!("Matched {}", entry.path().display());
            matches.push(MatchedFile::new(entry.into_path(), relative_path, size));
        }

        Ok(matches)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        self.filter.should_traverse_directory(entry.path())
    }

    pub fn get_statistics(&self, files: &[MatchedFile]) -> ScanStatistics {
        let directories: HashSet<&Path> = files.iter().filter_map(|f| f.parent_dir()).collect();

        let (largest_file_size, largest_file_path) = files
            .iter()
            .max_by_key(|f| f.size)
            .map(|f| (f.size, f.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            source_directories: directories.len(),
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub source_directories: usize,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n  Source folders: {}\n",
            self.total_files,
            crate::ui::output::format_bytes(self.total_size),
            self.source_directories
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_path.display(),
                crate::ui::output::format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}
