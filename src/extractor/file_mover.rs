use crate::error::{FileGatherError, Result};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// How a file reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    Renamed,
    /// Rename failed (typically across filesystems), contents were copied
    /// and the source removed.
    Copied,
}

const BUFFER_SIZE: usize = 64 * 1024;

pub struct FileMover {
    preserve_timestamps: bool,
}

impl FileMover {
    pub fn new() -> Self {
        Self {
            preserve_timestamps: true,
        }
    }

    pub fn with_preserve_timestamps(mut self, preserve: bool) -> Self {
        self.preserve_timestamps = preserve;
        self
    }

    /// Moves `source` to `dest`, falling back to copy + delete when a plain
    /// rename is refused.
    pub fn move_file(&self, source: &Path, dest: &Path) -> Result<MoveMethod> {
        let rename_error = match fs::rename(source, dest) {
            Ok(()) => return Ok(MoveMethod::Renamed),
            Err(e) => e,
        };

        if rename_error.kind() == io::ErrorKind::NotFound && !path_occupied(source) {
            return Err(move_error(source, dest, rename_error));
        }

        tracing::debug!(
            "Rename of {} failed ({}), falling back to copy",
            source.display(),
            rename_error
        );

        self.copy_then_remove(source, dest)
            .map(|_| MoveMethod::Copied)
            .map_err(|e| move_error(source, dest, e))
    }

    /// Copies `source` to a new file at `dest`, then removes `source`. If the
    /// source cannot be removed the copy is deleted again so the file is never
    /// left in both places. A symlink is recreated as a symlink.
    pub(crate) fn copy_then_remove(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        let bytes = if fs::symlink_metadata(source)?.file_type().is_symlink() {
            copy_symlink(source, dest)?;
            0
        } else {
            self.copy_file_with_buffer(source, dest)?
        };

        if let Err(e) = fs::remove_file(source) {
            let _ = fs::remove_file(dest);
            return Err(e);
        }

        Ok(bytes)
    }

    fn copy_file_with_buffer(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        let source_file = File::open(source)?;
        let metadata = source_file.metadata()?;

        // create_new refuses to clobber anything that appeared at dest
        let dest_file = OpenOptions::new().write(true).create_new(true).open(dest)?;

        let result = self.copy_contents(source_file, dest_file);
        let total_bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(dest);
                return Err(e);
            }
        };

        if let Err(e) = fs::set_permissions(dest, metadata.permissions()) {
            tracing::debug!("Could not copy permissions to {}: {}", dest.display(), e);
        }

        if self.preserve_timestamps {
            let mtime = filetime::FileTime::from_last_modification_time(&metadata);
            if let Err(e) = filetime::set_file_mtime(dest, mtime) {
                tracing::debug!("Could not preserve mtime on {}: {}", dest.display(), e);
            }
        }

        Ok(total_bytes)
    }

    fn copy_contents(&self, source: File, dest: File) -> io::Result<u64> {
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, source);
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, dest);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read])?;
            total_bytes += bytes_read as u64;
        }

        writer.flush()?;
        Ok(total_bytes)
    }
}

impl Default for FileMover {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    // symlink() fails with AlreadyExists rather than replacing dest
    std::os::unix::fs::symlink(fs::read_link(source)?, dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, _dest: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot copy symlink {} across filesystems", source.display()),
    ))
}

fn move_error(from: &Path, to: &Path, source: io::Error) -> FileGatherError {
    FileGatherError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

/// True when anything, including a dangling symlink, occupies `path`.
pub fn path_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Picks the first free name in `dest_dir`: `<stem><suffix>`, then
/// `<stem>_1<suffix>`, `<stem>_2<suffix>`, ... Every candidate is checked
/// afresh through `is_taken`.
/// Names are assembled as `OsString`s, so stems that are not valid UTF-8
/// come through byte for byte.
pub fn resolve_collision_free_path<F>(
    dest_dir: &Path,
    stem: &OsStr,
    suffix: &OsStr,
    is_taken: F,
) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let candidate_name = |counter: Option<u64>| {
        let mut name = OsString::from(stem);
        if let Some(n) = counter {
            name.push(format!("_{}", n));
        }
        name.push(suffix);
        dest_dir.join(name)
    };

    let mut candidate = candidate_name(None);
    let mut counter: u64 = 1;

    while is_taken(&candidate) {
        tracing::debug!("{} is taken, trying the next suffix", candidate.display());
        candidate = candidate_name(Some(counter));
        counter += 1;
    }

    candidate
}
