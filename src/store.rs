// store.rs

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::warn;

use crate::task::Task;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open task file: {0}")]
    Open(#[source] std::io::Error),
    #[error("failed to write task file: {0}")]
    Write(#[source] serde_json::Error),
}

/// Directory holding the task file and the log file. Falls back to the
/// current directory when no home can be resolved.
pub fn data_dir() -> PathBuf {
    let dir = ProjectDirs::from("", "", "taskhub")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Whole-file persistence for the task collection. There is no append or
/// patch operation: every mutation re-reads the full collection, applies
/// the change, and rewrites the file. Single writer by design.
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn default_path() -> PathBuf {
        data_dir().join("tasks.json")
    }

    /// Reads the entire collection. A missing file is a fresh start; a file
    /// that fails to read or parse is logged and treated as empty rather
    /// than surfaced to the caller.
    pub fn load_all(&self) -> Vec<Task> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read task file, starting empty");
                return Vec::new();
            }
        };
        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "task file did not parse, starting empty");
                Vec::new()
            }
        }
    }

    /// Serializes the entire collection, overwriting the file.
    pub fn save_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(StoreError::Open)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, tasks).map_err(StoreError::Write)
    }

    /// Next free id against the given collection: max existing id plus one,
    /// monotonic versus everything currently persisted.
    pub fn next_id(tasks: &[Task]) -> u64 {
        tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }
}
