//! Destinations for generated artifacts

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;

/// Receives each artifact as it is produced
pub trait OutputSink {
    /// Store `source_text` at `relative_path`, creating directories as needed
    fn write(&mut self, relative_path: &Path, source_text: &str) -> Result<()>;
}

/// Writes under a root directory.
///
/// Each file is written to a temporary file in its target directory and then
/// renamed over the destination, so a file is either complete or untouched.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl OutputSink for FsSink {
    fn write(&mut self, relative_path: &Path, source_text: &str) -> Result<()> {
        let target = self.root.join(relative_path);
        let dir = target.parent().unwrap_or(self.root.as_path());
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(source_text.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| e.error)?;

        debug!("Wrote {}", target.display());
        Ok(())
    }
}

/// Records nothing; logs what would have been written
#[derive(Debug, Clone, Default)]
pub struct DryRunSink {
    planned: Vec<PathBuf>,
}

impl DryRunSink {
    pub fn planned(&self) -> &[PathBuf] {
        &self.planned
    }
}

impl OutputSink for DryRunSink {
    fn write(&mut self, relative_path: &Path, source_text: &str) -> Result<()> {
        debug!(
            "Dry run: would write {} ({} bytes)",
            relative_path.display(),
            source_text.len()
        );
        self.planned.push(relative_path.to_path_buf());
        Ok(())
    }
}

/// Keeps artifacts in memory, in write order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Vec<(PathBuf, String)>,
}

impl MemorySink {
    pub fn files(&self) -> &[(PathBuf, String)] {
        &self.files
    }

    /// Text written at `relative_path`, if any
    pub fn get(&self, relative_path: impl AsRef<Path>) -> Option<&str> {
        let wanted = relative_path.as_ref();
        self.files
            .iter()
            .find(|(path, _)| path == wanted)
            .map(|(_, text)| text.as_str())
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, relative_path: &Path, source_text: &str) -> Result<()> {
        self.files
            .push((relative_path.to_path_buf(), source_text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path());
        sink.write(Path::new("School.DataAccess/clsStudentData.cs"), "class A {}")
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("School.DataAccess/clsStudentData.cs")).unwrap();
        assert_eq!(written, "class A {}");
    }

    #[test]
    fn test_fs_sink_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path());
        let path = Path::new("Out/clsA.cs");
        sink.write(path, "first version, longer than the second").unwrap();
        sink.write(path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join(path)).unwrap(), "second");
        // No temp files left behind
        let entries = std::fs::read_dir(dir.path().join("Out")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_fs_sink_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        // A file where a directory is needed
        std::fs::write(dir.path().join("School.DataAccess"), "").unwrap();
        let mut sink = FsSink::new(dir.path());
        assert!(sink
            .write(Path::new("School.DataAccess/clsStudentData.cs"), "x")
            .is_err());
    }

    #[test]
    fn test_dry_run_sink_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DryRunSink::default();
        sink.write(&dir.path().join("a/b.cs"), "x").unwrap();
        assert_eq!(sink.planned(), [dir.path().join("a/b.cs")]);
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn test_memory_sink_lookup() {
        let mut sink = MemorySink::default();
        sink.write(Path::new("a.cs"), "A").unwrap();
        sink.write(Path::new("b.cs"), "B").unwrap();
        assert_eq!(sink.get("b.cs"), Some("B"));
        assert_eq!(sink.get("c.cs"), None);
        assert_eq!(sink.files().len(), 2);
    }
}
