//! Pluggable persistence behind the annotation store.
//!
//! The store is constructed with a backend implementing
//! [`AnnotationPersistence`]; production code uses [`FilePersistence`],
//! tests inject [`MemoryPersistence`].

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use super::Annotation;

/// Errors from reading or writing the persisted annotation list.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    /// The backing file could not be read.
    #[error("failed to read annotations from {path}: {0}", path = .1.display())]
    Read(#[source] io::Error, PathBuf),

    /// The backing file could not be written.
    #[error("failed to write annotations to {path}: {0}", path = .1.display())]
    Write(#[source] io::Error, PathBuf),

    /// The backing file exists but does not hold a valid annotation array.
    #[error("stored annotations in {path} are not a valid annotation array: {0}", path = .1.display())]
    Corrupt(#[source] serde_json::Error, PathBuf),

    /// The annotation list could not be serialized.
    #[error("failed to serialize annotations: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Loads and saves the full annotation list.
///
/// `save` replaces whatever was persisted before; there is no merging and no
/// coordination between concurrent writers (last write wins).
pub trait AnnotationPersistence {
    /// Loads the persisted list. An absent backing slot loads as empty.
    fn load(&self) -> Result<Vec<Annotation>, PersistenceError>;

    /// Replaces the persisted list with `annotations`.
    fn save(&self, annotations: &[Annotation]) -> Result<(), PersistenceError>;
}

/// File-backed persistence: one pretty-printed JSON array per store.
#[derive(Clone, Debug)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Creates a backend reading and writing `path`. The file is created on
    /// first save; parent directories are created as needed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnnotationPersistence for FilePersistence {
    fn load(&self) -> Result<Vec<Annotation>, PersistenceError> {
        if !self.path.exists() {
            debug!("no annotation file at {}", self.path.display());
            return Ok(vec![]);
        }
        let data = fs::read_to_string(&self.path)
            .map_err(|e| PersistenceError::Read(e, self.path.clone()))?;
        serde_json::from_str(&data).map_err(|e| PersistenceError::Corrupt(e, self.path.clone()))
    }

    fn save(&self, annotations: &[Annotation]) -> Result<(), PersistenceError> {
        let data =
            serde_json::to_string_pretty(annotations).map_err(PersistenceError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PersistenceError::Write(e, self.path.clone()))?;
            }
        }
        fs::write(&self.path, data).map_err(|e| PersistenceError::Write(e, self.path.clone()))
    }
}

/// In-memory persistence, a test double that records what was saved.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: RefCell<Vec<Annotation>>,
    saves: Cell<usize>,
}

impl MemoryPersistence {
    /// Creates a backend preloaded with `annotations`.
    #[must_use]
    pub fn with_contents(annotations: Vec<Annotation>) -> Self {
        Self {
            slot: RefCell::new(annotations),
            saves: Cell::new(0),
        }
    }

    /// The most recently saved list.
    #[must_use]
    pub fn saved(&self) -> Vec<Annotation> {
        self.slot.borrow().clone()
    }

    /// How many times `save` has been called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl AnnotationPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Annotation>, PersistenceError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, annotations: &[Annotation]) -> Result<(), PersistenceError> {
        *self.slot.borrow_mut() = annotations.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
