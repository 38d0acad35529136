//! Read-only artifacts produced by the training process.
//!
//! Three JSON files sit side by side: the boosted tree ensemble, the ordered
//! feature-column names it was trained on, and the class-index → category
//! name lookup. All are loaded once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::ModelError;

pub const MODEL_FILE: &str = "xgb_model.json";
pub const COLUMNS_FILE: &str = "col_names.json";
pub const CATEGORIES_FILE: &str = "crime_categories.json";

/// Locations of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub columns: PathBuf,
    pub categories: PathBuf,
}

impl ArtifactPaths {
    /// The conventional file names inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            columns: dir.join(COLUMNS_FILE),
            categories: dir.join(CATEGORIES_FILE),
        }
    }
}

pub(crate) fn read_artifact(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Column list ──

/// Ordered feature-column names. Position `i` is slot `i` of the feature vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnList {
    names: Vec<String>,
}

impl ColumnList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(names))
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let columns = Self::from_json(&read_artifact(path)?)?;
        info!(path = %path.display(), count = columns.len(), "loaded column list");
        Ok(columns)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First slot whose column carries `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

// ── Category map ──

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryFile {
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

/// Class index → category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    by_index: BTreeMap<usize, String>,
}

impl CategoryMap {
    pub fn new(by_index: BTreeMap<usize, String>) -> Self {
        Self { by_index }
    }

    /// Accepts either a JSON array (index by position) or an object keyed by
    /// decimal index.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let by_index = match serde_json::from_str::<CategoryFile>(json)? {
            CategoryFile::List(names) => names.into_iter().enumerate().collect(),
            CategoryFile::Map(map) => {
                let mut by_index = BTreeMap::new();
                for (key, name) in map {
                    let index: usize = key.trim().parse().map_err(|_| {
                        ModelError::Artifact(format!("category key {key:?} is not an index"))
                    })?;
                    by_index.insert(index, name);
                }
                by_index
            }
        };
        Ok(Self { by_index })
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let categories = Self::from_json(&read_artifact(path)?)?;
        info!(path = %path.display(), count = categories.len(), "loaded category map");
        Ok(categories)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Category names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_index.values().map(String::as_str)
    }
}
