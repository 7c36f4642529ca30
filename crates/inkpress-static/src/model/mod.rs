//! Entities built from parsed source documents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use inkpress_blocks::MetaError;

mod archive;
mod document;
mod post;
mod site;
mod time;

pub use archive::{Archive, ArchiveMonth};
pub use document::{Author, Content, Document, Page};
pub use post::{Post, Tag, TagEntry, TagIndex};
pub use site::SiteMeta;
pub use time::Time;

/// Errors raised while turning blocks into an entity.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Expected at least {expected} blocks, found {found}")]
    BlockCount { expected: usize, found: usize },

    #[error("Block {index} must be an ini metadata block")]
    NotMetadata { index: usize },

    #[error("Invalid metadata: {0}")]
    Meta(#[from] MetaError),
}

/// File-system facts about a source document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the document was read from
    pub path: PathBuf,

    /// Last modification time, used when metadata carries no date
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }

    /// Stat `path`.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(Self::new(path, modified))
    }

    /// File name without extension.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}
