//! Persistence sinks for generated stub text.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::PersistError;

/// Durable storage for generated text, keyed by root name.
pub trait Sink {
    /// Store the generated text for one root. Failures are surfaced to the
    /// caller unmodified; the sink never retries.
    fn persist(&mut self, root: &str, text: &str) -> Result<(), PersistError>;

    /// Called once at the end of a batch run, on all exit paths.
    fn finish(&mut self) {}
}

/// Writes one `<root>.py` artifact per root into a directory, creating the
/// directory on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    extension: String,
}

impl DirectorySink {
    /// Sink writing `.py` artifacts under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "py".to_string(),
        }
    }

    /// Override the artifact extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The directory artifacts are written into.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl Sink for DirectorySink {
    fn persist(&mut self, root: &str, text: &str) -> Result<(), PersistError> {
        // Root names become file names; anything path-like would escape the
        // output directory.
        if root.is_empty() || root.contains(['/', '\\']) || root.contains("..") {
            return Err(PersistError::InvalidName(root.to_string()));
        }
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(PersistError::NotADirectory(self.dir.clone()));
        }
        let io = |source| PersistError::Io {
            root: root.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io)?;
        let path = self.dir.join(format!("{}.{}", root, self.extension));
        fs::write(&path, text).map_err(io)
    }
}

/// In-memory sink for tests and embedders.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Persisted texts, keyed by root name.
    pub outputs: BTreeMap<String, String>,
    /// Whether [`Sink::finish`] has run.
    pub finished: bool,
}

impl Sink for MemorySink {
    fn persist(&mut self, root: &str, text: &str) -> Result<(), PersistError> {
        self.outputs.insert(root.to_string(), text.to_string());
        Ok(())
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_sink_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("stubs"));
        sink.persist("engine", "x = 1\n").unwrap();

        let written = fs::read_to_string(dir.path().join("stubs/engine.py")).unwrap();
        assert_eq!(written, "x = 1\n");
    }

    #[test]
    fn test_directory_sink_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path()).with_extension("pyi");
        sink.persist("engine", "").unwrap();
        assert!(dir.path().join("engine.pyi").exists());
    }

    #[test]
    fn test_directory_sink_rejects_pathlike_roots() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        for bad in ["", "a/b", "a\\b", ".."] {
            assert!(matches!(
                sink.persist(bad, ""),
                Err(PersistError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_directory_sink_rejects_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, "not a directory").unwrap();

        let mut sink = DirectorySink::new(&file);
        assert!(matches!(
            sink.persist("engine", ""),
            Err(PersistError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_memory_sink_records_and_finishes() {
        let mut sink = MemorySink::default();
        sink.persist("engine", "text").unwrap();
        assert_eq!(sink.outputs.get("engine").map(String::as_str), Some("text"));
        assert!(!sink.finished);
        sink.finish();
        assert!(sink.finished);
    }
}
