use crate::config::{Config, SearchConfig};
use crate::error::{FileGatherError, Result};
use crate::extractor::file_mover::{path_occupied, resolve_collision_free_path, FileMover};
use crate::extractor::output_manager::DestinationManager;
use crate::scanner::{Extension, ExtensionFilter, FileScanner, MatchedFile};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What to gather, from where, and into which folder.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub root_path: PathBuf,
    pub extension: Extension,
    pub destination: Option<PathBuf>,
}

impl SearchRequest {
    pub fn new<P: Into<PathBuf>>(root_path: P, extension: &str) -> Result<Self> {
        Ok(Self {
            root_path: root_path.into(),
            extension: Extension::parse(extension)?,
            destination: None,
        })
    }

    pub fn with_destination(mut self, destination: Option<PathBuf>) -> Self {
        self.destination = destination;
        self
    }

    /// The folder files end up in: the explicit destination, or the root.
    pub fn destination_dir(&self) -> &Path {
        self.destination.as_deref().unwrap_or(&self.root_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Already directly inside the destination; left alone.
    Skipped {
        #[serde(serialize_with = "lossy_path")]
        source: PathBuf,
    },
    Moved {
        #[serde(serialize_with = "lossy_path")]
        source: PathBuf,
        #[serde(serialize_with = "lossy_path")]
        destination: PathBuf,
    },
    Failed {
        #[serde(serialize_with = "lossy_path")]
        source: PathBuf,
        message: String,
    },
}

impl MoveOutcome {
    pub fn source(&self) -> &Path {
        match self {
            MoveOutcome::Skipped { source }
            | MoveOutcome::Moved { source, .. }
            | MoveOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// One entry of a dry run: where a file would go, or `None` when it would
/// be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    #[serde(serialize_with = "lossy_path")]
    pub source: PathBuf,
    #[serde(serialize_with = "lossy_optional_path")]
    pub destination: Option<PathBuf>,
}

/// Paths go out as (lossy) strings so a name that is not valid UTF-8 still
/// appears in the JSON report instead of failing it.
pub(crate) fn lossy_path<P, S>(path: &P, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

fn lossy_optional_path<S>(
    path: &Option<PathBuf>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match path {
        Some(path) => serializer.serialize_some(&path.to_string_lossy()),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_moved: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub outcomes: Vec<MoveOutcome>,
}

impl ExtractionProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            moved: 0,
            skipped: 0,
            failed: 0,
            bytes_moved: 0,
            current_file: None,
            start_time: Instant::now(),
            outcomes: Vec::with_capacity(total_files),
        }
    }

    pub fn record(&mut self, outcome: MoveOutcome, bytes: u64) {
        match outcome {
            MoveOutcome::Skipped { .. } => self.skipped += 1,
            MoveOutcome::Moved { .. } => {
                self.moved += 1;
                self.bytes_moved += bytes;
            }
            MoveOutcome::Failed { .. } => self.failed += 1,
        }

        self.files_processed += 1;
        self.current_file = outcome
            .source()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.outcomes.push(outcome);
    }

    pub fn last_outcome(&self) -> Option<&MoveOutcome> {
        self.outcomes.last()
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::from_secs(0);
        }

        let rate = self.files_processed as f64 / self.elapsed().as_secs_f64();
        let remaining_files = self.total_files.saturating_sub(self.files_processed);

        if rate > 0.0 && rate.is_finite() {
            Duration::from_secs_f64(remaining_files as f64 / rate)
        } else {
            Duration::from_secs(0)
        }
    }
}

/// The validated root, the ready destination and the files to process.
pub struct PreparedExtraction {
    pub destination: DestinationManager,
    pub files: Vec<MatchedFile>,
}

pub struct Extractor {
    search: SearchConfig,
    mover: FileMover,
}

impl Extractor {
    pub fn new(config: &Config) -> Self {
        Self {
            search: config.search.clone(),
            mover: FileMover::new().with_preserve_timestamps(config.output.preserve_timestamps),
        }
    }

    /// Validates the root, creates the destination and enumerates matches.
    /// Nothing is touched when the root is missing.
    pub fn prepare(&self, request: &SearchRequest) -> Result<PreparedExtraction> {
        FileScanner::validate_root(&request.root_path)?;

        let mut destination = DestinationManager::for_request(request);
        destination.initialize()?;

        let scanner = FileScanner::new(&self.search, &request.extension);
        let files = scanner.scan_directory(&request.root_path)?;

        Ok(PreparedExtraction { destination, files })
    }

    /// Moves every prepared file. Per-file failures become `Failed` outcomes;
    /// the batch always runs to the end.
    pub fn move_files(
        &self,
        request: &SearchRequest,
        prepared: &PreparedExtraction,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> ExtractionProgress {
        let filter = ExtensionFilter::new(&self.search, &request.extension);
        let mut progress = ExtractionProgress::new(prepared.files.len());

        for file in &prepared.files {
            let (outcome, bytes) = self.move_one(file, &filter, &prepared.destination);

            if let MoveOutcome::Failed { ref source, ref message } = outcome {
                tracing::warn!("Failed to move {}: {}", source.display(), message);
            }

            progress.record(outcome, bytes);

            if let Some(callback) = progress_callback {
                callback(&progress);
            }
        }

        progress
    }

    fn move_one(
        &self,
        file: &MatchedFile,
        filter: &ExtensionFilter,
        destination: &DestinationManager,
    ) -> (MoveOutcome, u64) {
        let source = file.source_path.clone();

        if destination.contains_directly(&source) {
            return (MoveOutcome::Skipped { source }, 0);
        }

        let target = match target_for(file, filter, destination.get_output_directory(), path_occupied) {
            Ok(target) => target,
            Err(e) => {
                return (
                    MoveOutcome::Failed {
                        source,
                        message: e.to_string(),
                    },
                    0,
                )
            }
        };

        match self.mover.move_file(&source, &target) {
            Ok(method) => {
                tracing::debug!("{:?} {} -> {}", method, source.display(), target.display());
                (
                    MoveOutcome::Moved {
                        source,
                        destination: target,
                    },
                    file.size,
                )
            }
            Err(FileGatherError::Move { source: io_error, .. }) => (
                MoveOutcome::Failed {
                    source,
                    message: io_error.to_string(),
                },
                0,
            ),
            Err(e) => (
                MoveOutcome::Failed {
                    source,
                    message: e.to_string(),
                },
                0,
            ),
        }
    }

    /// Runs the whole operation: prepare, then move.
    pub fn extract(
        &self,
        request: &SearchRequest,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let prepared = self.prepare(request)?;
        Ok(self.move_files(request, &prepared, progress_callback))
    }

    /// Computes what `extract` would do without touching the filesystem.
    /// Names handed out earlier in the plan count as taken.
    pub fn plan(&self, request: &SearchRequest) -> Result<Vec<PlannedMove>> {
        FileScanner::validate_root(&request.root_path)?;

        let destination = DestinationManager::for_request(request);
        let scanner = FileScanner::new(&self.search, &request.extension);
        let files = scanner.scan_directory(&request.root_path)?;
        let filter = scanner.filter();

        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let mut plan = Vec::with_capacity(files.len());

        for file in &files {
            if destination.contains_directly(&file.source_path) {
                plan.push(PlannedMove {
                    source: file.source_path.clone(),
                    destination: None,
                });
                continue;
            }

            let is_taken = |candidate: &Path| claimed.contains(candidate) || path_occupied(candidate);
            let target = target_for(file, filter, destination.get_output_directory(), is_taken)?;

            claimed.insert(target.clone());
            plan.push(PlannedMove {
                source: file.source_path.clone(),
                destination: Some(target),
            });
        }

        Ok(plan)
    }
}

fn target_for<F>(
    file: &MatchedFile,
    filter: &ExtensionFilter,
    dest_dir: &Path,
    is_taken: F,
) -> Result<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let (stem, suffix) =
        filter
            .split_name(&file.filename)
            .ok_or_else(|| FileGatherError::InvalidPath {
                path: file.source_path.display().to_string(),
            })?;

    Ok(resolve_collision_free_path(dest_dir, stem, suffix, is_taken))
}

/// Gathers every `extension` file under `root_path` into `destination`
/// (or the root itself) and returns one outcome per match.
pub fn extract<P: AsRef<Path>>(
    root_path: P,
    extension: &str,
    destination: Option<&Path>,
) -> Result<Vec<MoveOutcome>> {
    let request = SearchRequest::new(root_path.as_ref(), extension)?
        .with_destination(destination.map(Path::to_path_buf));

    let progress = Extractor::new(&Config::default()).extract(&request, None)?;
    Ok(progress.outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
        let mut entries: Vec<(PathBuf, String)> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let content = fs::read_to_string(e.path()).unwrap_or_default();
                (e.path().strip_prefix(root).unwrap().to_path_buf(), content)
            })
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_search_request_normalizes_extension() {
        let request = SearchRequest::new("/data", "ipt").unwrap();
        assert_eq!(request.extension.as_str(), ".ipt");
        assert_eq!(request.destination_dir(), Path::new("/data"));

        let request = request.with_destination(Some(PathBuf::from("/out")));
        assert_eq!(request.destination_dir(), Path::new("/out"));

        assert!(SearchRequest::new("/data", "").is_err());
    }

    #[test]
    fn test_gather_into_root_with_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("a/x.ipt"), "from a");
        write(&root.join("b/x.ipt"), "from b");
        write(&root.join("c/y.txt"), "text");

        let outcomes = extract(root, "ipt", None).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(MoveOutcome::is_moved));
        assert_eq!(fs::read_to_string(root.join("x.ipt")).unwrap(), "from a");
        assert_eq!(fs::read_to_string(root.join("x_1.ipt")).unwrap(), "from b");
        assert!(!root.join("a/x.ipt").exists());
        assert!(!root.join("b/x.ipt").exists());
        assert_eq!(fs::read_to_string(root.join("c/y.txt")).unwrap(), "text");
    }

    #[test]
    fn test_every_match_reported_once_and_others_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let dest = temp_dir.path().join("dest");
        write(&root.join("top.ipt"), "t");
        write(&root.join("p/q/r/deep.ipt"), "d");
        write(&root.join("p/other.iam"), "o");
        write(&root.join("p/almost.ipt.bak"), "b");

        let outcomes = extract(&root, ".ipt", Some(dest.as_path())).unwrap();

        let mut sources: Vec<PathBuf> = outcomes.iter().map(|o| o.source().to_path_buf()).collect();
        sources.sort();
        assert_eq!(sources, vec![root.join("p/q/r/deep.ipt"), root.join("top.ipt")]);
        assert!(root.join("p/other.iam").exists());
        assert!(root.join("p/almost.ipt.bak").exists());
        assert!(dest.join("top.ipt").exists());
        assert!(dest.join("deep.ipt").exists());
    }

    #[test]
    fn test_repeated_runs_number_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let dest = temp_dir.path().join("dest");

        for run in 0..2 {
            write(&root.join("one/part.ipt"), &format!("one-{}", run));
            write(&root.join("two/part.ipt"), &format!("two-{}", run));
            extract(&root, "ipt", Some(dest.as_path())).unwrap();
        }

        assert_eq!(fs::read_to_string(dest.join("part.ipt")).unwrap(), "one-0");
        assert_eq!(fs::read_to_string(dest.join("part_1.ipt")).unwrap(), "two-0");
        assert_eq!(fs::read_to_string(dest.join("part_2.ipt")).unwrap(), "one-1");
        assert_eq!(fs::read_to_string(dest.join("part_3.ipt")).unwrap(), "two-1");
    }

    #[test]
    fn test_file_in_destination_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("x.ipt"), "stay");
        write(&root.join("sub/x.ipt"), "come");

        let outcomes = extract(root, "ipt", None).unwrap();

        assert_eq!(outcomes.len(), 2);
        let skipped: Vec<&MoveOutcome> = outcomes
            .iter()
            .filter(|o| matches!(o, MoveOutcome::Skipped { .. }))
            .collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].source(), root.join("x.ipt"));
        assert_eq!(fs::read_to_string(root.join("x.ipt")).unwrap(), "stay");
        assert_eq!(fs::read_to_string(root.join("x_1.ipt")).unwrap(), "come");
    }

    #[test]
    fn test_destination_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let dest = root.join("collected");
        write(&dest.join("old.ipt"), "old");
        write(&dest.join("nested/n.ipt"), "nested");
        write(&root.join("a/new.ipt"), "new");

        let outcomes = extract(root, "ipt", Some(dest.as_path())).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.contains(&MoveOutcome::Skipped { source: dest.join("old.ipt") }));
        assert!(dest.join("n.ipt").exists());
        assert!(dest.join("new.ipt").exists());
        assert_eq!(fs::read_to_string(dest.join("old.ipt")).unwrap(), "old");
    }

    #[test]
    fn test_missing_root_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let before = snapshot(temp_dir.path());
        let dest = temp_dir.path().join("dest");

        let result = extract(temp_dir.path().join("missing"), "ipt", Some(dest.as_path()));

        assert!(matches!(result, Err(FileGatherError::RootNotFound { .. })));
        assert!(!dest.exists());
        assert_eq!(snapshot(temp_dir.path()), before);
    }

    #[test]
    fn test_no_matches_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("a/readme.txt"), "r");
        let before = snapshot(temp_dir.path());

        let outcomes = extract(temp_dir.path(), "ipt", None).unwrap();

        assert!(outcomes.is_empty());
        assert_eq!(snapshot(temp_dir.path()), before);
    }

    #[test]
    fn test_multi_part_extension_keeps_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("a/backup.tar.gz"), "1");
        write(&root.join("b/backup.tar.gz"), "2");

        extract(root, "tar.gz", None).unwrap();

        assert!(root.join("backup.tar.gz").exists());
        assert!(root.join("backup_1.tar.gz").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_is_isolated() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let dest = temp_dir.path().join("dest");
        write(&root.join("a/good.ipt"), "g");
        write(&root.join("locked/bad.ipt"), "b");
        write(&root.join("z/later.ipt"), "l");

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions, nothing to assert there
        let canary = locked.join(".canary");
        if fs::write(&canary, "").is_ok() {
            let _ = fs::remove_file(&canary);
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcomes = extract(&root, "ipt", Some(dest.as_path())).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(outcomes.len(), 3);
        let failed: Vec<&MoveOutcome> = outcomes
            .iter()
            .filter(|o| matches!(o, MoveOutcome::Failed { .. }))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source(), root.join("locked/bad.ipt"));
        assert!(dest.join("good.ipt").exists());
        assert!(dest.join("later.ipt").exists());
        assert!(!dest.join("bad.ipt").exists());
        assert!(root.join("locked/bad.ipt").exists());
    }

    #[test]
    fn test_progress_callback_sees_every_file() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("a/1.ipt"), "1");
        write(&temp_dir.path().join("b/2.ipt"), "2");

        let request = SearchRequest::new(temp_dir.path(), "ipt").unwrap();
        let calls = Cell::new(0usize);
        let callback = |progress: &ExtractionProgress| {
            calls.set(calls.get() + 1);
            assert_eq!(progress.files_processed, calls.get());
            assert!(progress.last_outcome().is_some());
        };

        let progress = Extractor::new(&Config::default())
            .extract(&request, Some(&callback))
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(progress.moved, 2);
        assert_eq!(progress.bytes_moved, 2);
        assert_eq!(progress.percentage(), 100.0);
    }

    #[test]
    fn test_plan_matches_real_run_and_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let dest = temp_dir.path().join("dest");
        write(&root.join("a/x.ipt"), "a");
        write(&root.join("b/x.ipt"), "b");
        write(&root.join("c/x.ipt"), "c");

        let request = SearchRequest::new(&root, "ipt")
            .unwrap()
            .with_destination(Some(dest.clone()));
        let extractor = Extractor::new(&Config::default());

        let before = snapshot(temp_dir.path());
        let plan = extractor.plan(&request).unwrap();
        assert_eq!(snapshot(temp_dir.path()), before);
        assert!(!dest.exists());

        let planned: Vec<Option<PathBuf>> = plan.iter().map(|p| p.destination.clone()).collect();
        assert_eq!(
            planned,
            vec![
                Some(dest.join("x.ipt")),
                Some(dest.join("x_1.ipt")),
                Some(dest.join("x_2.ipt")),
            ]
        );

        let progress = extractor.extract(&request, None).unwrap();
        let moved: Vec<Option<PathBuf>> = progress
            .outcomes
            .iter()
            .map(|o| match o {
                MoveOutcome::Moved { destination, .. } => Some(destination.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(moved, planned);
    }

    #[test]
    fn test_plan_marks_skips() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("here.ipt"), "h");

        let request = SearchRequest::new(temp_dir.path(), "ipt").unwrap();
        let plan = Extractor::new(&Config::default()).plan(&request).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].destination, None);
    }

    #[test]
    fn test_record_tracks_current_file() {
        let mut progress = ExtractionProgress::new(4);
        progress.record(MoveOutcome::Skipped { source: PathBuf::from("a/a.ipt") }, 0);

        assert_eq!(progress.percentage(), 25.0);
        assert_eq!(progress.current_file.as_deref(), Some("a.ipt"));
        assert_eq!(progress.skipped, 1);
    }

    #[test]
    fn test_estimated_remaining() {
        let mut progress = ExtractionProgress::new(4);
        assert_eq!(progress.estimated_remaining(), Duration::ZERO);

        std::thread::sleep(Duration::from_millis(20));
        progress.record(MoveOutcome::Skipped { source: PathBuf::from("a.ipt") }, 0);

        // one of four done after at least 20ms
        assert!(progress.estimated_remaining() >= Duration::from_millis(40));

        for name in ["b.ipt", "c.ipt", "d.ipt"] {
            progress.record(MoveOutcome::Skipped { source: PathBuf::from(name) }, 0);
        }
        assert_eq!(progress.estimated_remaining(), Duration::ZERO);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_gathered() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let name = OsStr::from_bytes(b"caf\xe9.ipt");
        write(&root.join("a").join(name), "from a");
        write(&root.join("b").join(name), "from b");

        let outcomes = extract(root, "ipt", None).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(MoveOutcome::is_moved));
        assert_eq!(fs::read_to_string(root.join(name)).unwrap(), "from a");
        let numbered = root.join(OsStr::from_bytes(b"caf\xe9_1.ipt"));
        assert_eq!(fs::read_to_string(numbered).unwrap(), "from b");

        let json = serde_json::to_value(&outcomes[0]).unwrap();
        assert_eq!(json["status"], "moved");
        assert!(json["destination"].as_str().unwrap().ends_with("caf\u{fffd}.ipt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_moved_as_link() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let target = temp_dir.path().join("outside.bin");
        write(&target, "outside");
        fs::create_dir_all(root.join("a")).unwrap();
        std::os::unix::fs::symlink(&target, root.join("a/link.ipt")).unwrap();

        let outcomes = extract(&root, "ipt", None).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_moved());
        let moved = root.join("link.ipt");
        assert!(fs::symlink_metadata(&moved).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&moved).unwrap(), target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "outside");
        assert!(!root.join("a/link.ipt").exists());
    }
}
