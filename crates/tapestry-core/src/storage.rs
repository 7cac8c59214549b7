//! Disk I/O and file lifecycle for downloads.
//!
//! A download is written to a uniquely named temp file next to its final
//! destination, then committed with a single same-directory rename. The temp
//! file is deleted when the writer is dropped without being finalized, so
//! every early return or failure path cleans up without explicit calls.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name prefix shared by all in-flight download temp files.
pub const TEMP_PREFIX: &str = ".download_";

/// Name suffix shared by all in-flight download temp files.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Sequential writer over a temp file that is removed on drop.
pub struct StorageWriter {
    file: NamedTempFile,
    written: u64,
}

impl StorageWriter {
    /// Creates a temp file in `dir` (e.g. `.download_Ab12Cd.tmp`).
    pub fn create_in(dir: &Path) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tracing::debug!(path = %file.path().display(), "created temp file");
        Ok(StorageWriter { file, written: 0 })
    }

    /// Creates a temp file beside `final_path`, creating parent directories
    /// as needed.
    pub fn create_for(final_path: &Path) -> Result<Self> {
        let dir = parent_dir(final_path);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
        Self::create_in(&dir)
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush, sync, and atomically rename onto `final_path`, replacing any
    /// existing file. Consumes the writer. On failure the temp file is removed.
    pub fn finalize(mut self, final_path: &Path) -> Result<u64> {
        self.file.flush().context("temp file flush failed")?;
        self.file
            .as_file()
            .sync_all()
            .context("temp file sync failed")?;
        let written = self.written;
        let temp_path = self.file.path().to_path_buf();
        self.file.persist(final_path).map_err(|e| {
            anyhow::Error::new(io::Error::from(e)).context(format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            ))
        })?;
        Ok(written)
    }
}

impl Write for StorageWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Directory holding `path`; `.` for bare file names.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Lists leftover temp files in `dir` (used by tests and cleanup checks).
pub fn stray_temp_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX) {
            out.push(entry.path());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_dir_of_bare_name_is_cwd() {
        assert_eq!(parent_dir(Path::new("file.bin")), PathBuf::from("."));
        assert_eq!(
            parent_dir(Path::new("/tmp/a/file.bin")),
            PathBuf::from("/tmp/a")
        );
    }

    #[test]
    fn temp_file_uses_naming_convention() {
        let dir = tempfile::tempdir().unwrap();
        let writer = StorageWriter::create_in(dir.path()).unwrap();
        let name = writer.temp_path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(TEMP_PREFIX));
        assert!(name.ends_with(TEMP_SUFFIX));
        assert_eq!(writer.temp_path().parent().unwrap(), dir.path());
    }

    #[test]
    fn write_finalize_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        fs::write(&final_path, b"old contents").unwrap();

        let mut writer = StorageWriter::create_for(&final_path).unwrap();
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        assert_eq!(writer.written(), 11);
        let tp = writer.temp_path().to_path_buf();
        let n = writer.finalize(&final_path).unwrap();

        assert_eq!(n, 11);
        assert!(!tp.exists());
        assert_eq!(fs::read(&final_path).unwrap(), b"hello world");
        assert!(stray_temp_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn drop_without_finalize_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = StorageWriter::create_in(dir.path()).unwrap();
        writer.write_all(b"partial").unwrap();
        let tp = writer.temp_path().to_path_buf();
        assert!(tp.exists());
        drop(writer);
        assert!(!tp.exists());
        assert!(stray_temp_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn create_for_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("nested/dirs/output.txt");
        let writer = StorageWriter::create_for(&final_path).unwrap();
        writer.finalize(&final_path).unwrap();
        assert!(final_path.exists());
    }
}
