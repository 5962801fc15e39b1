use crate::descriptor::Descriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A candidate image that has not been described yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusItem {
    /// Identifier reported in rankings (the file name for directory corpora)
    pub id: String,
    pub path: PathBuf,
}

impl CorpusItem {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Use the file name of `path` as the identifier
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = file_name_id(&path);
        Self { id, path }
    }
}

/// The identifier used for an image on disk: its file name without directories
pub fn file_name_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// An identified descriptor ready to be ranked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: String,
    pub descriptor: Descriptor,
}

impl CorpusEntry {
    pub fn new(id: impl Into<String>, descriptor: impl Into<Descriptor>) -> Self {
        Self {
            id: id.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for CorpusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.descriptor.shape())
    }
}
