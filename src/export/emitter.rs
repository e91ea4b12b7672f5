//! File delivery boundary
//!
//! The core only depends on the [`FileEmitter`] contract. The directory
//! implementation stages content to a temporary file next to the target and
//! promotes it by rename; the staged file is removed whether or not the
//! promotion succeeds.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Saves rendered document text under a filename
pub trait FileEmitter {
    fn save(&self, content: &str, filename: &str) -> ExportResult<PathBuf>;
}

/// Writes exported files into a directory
pub struct DirEmitter {
    dir: PathBuf,
}

impl DirEmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileEmitter for DirEmitter {
    fn save(&self, content: &str, filename: &str) -> ExportResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ExportError::Delivery(format!(
                "failed to create output directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let target = self.dir.join(filename);
        let staged = self.dir.join(format!("{filename}.tmp"));

        let written = fs::write(&staged, content).and_then(|()| fs::rename(&staged, &target));
        match written {
            Ok(()) => {
                debug!(path = %target.display(), bytes = content.len(), "export written");
                Ok(target)
            }
            Err(e) => {
                let _ = fs::remove_file(&staged);
                Err(ExportError::Delivery(format!(
                    "failed to write {}: {e}",
                    target.display()
                )))
            }
        }
    }
}

/// Captures saves in memory (tests)
#[cfg(test)]
#[derive(Default)]
pub struct MemoryEmitter {
    pub saved: std::cell::RefCell<Vec<(String, String)>>,
    pub fail: std::cell::Cell<bool>,
}

#[cfg(test)]
impl FileEmitter for MemoryEmitter {
    fn save(&self, content: &str, filename: &str) -> ExportResult<PathBuf> {
        if self.fail.get() {
            return Err(ExportError::Delivery("emitter unavailable".into()));
        }
        self.saved
            .borrow_mut()
            .push((filename.to_string(), content.to_string()));
        Ok(PathBuf::from(filename))
    }
}
