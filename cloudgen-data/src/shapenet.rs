//! Layout of the preprocessed ShapeNet point cloud dataset.
//!
//! ```text
//! <root>/<synset>/<model>.npz
//! <root>/splits/<synset>/<split>.txt
//! ```

use crate::{DataError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// ShapeNet categories with known synset ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Airplane,
    Car,
    Chair,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Airplane, Category::Car, Category::Chair];

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| DataError::UnknownCategory(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Airplane => "airplane",
            Category::Car => "car",
            Category::Chair => "chair",
        }
    }

    /// WordNet synset id used as the category's directory name.
    pub fn synset_id(self) -> &'static str {
        match self {
            Category::Airplane => "02691156",
            Category::Car => "02958343",
            Category::Chair => "03001627",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Paths inside a preprocessed ShapeNet root.
#[derive(Debug, Clone)]
pub struct ShapeNetLayout {
    root: PathBuf,
}

impl ShapeNetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn split_file(&self, category: Category, split: &str) -> PathBuf {
        self.root
            .join("splits")
            .join(category.synset_id())
            .join(format!("{split}.txt"))
    }

    pub fn model_path(&self, category: Category, model: &str) -> PathBuf {
        self.root
            .join(category.synset_id())
            .join(format!("{model}.npz"))
    }

    /// Model ids listed in a category split.
    pub fn models(&self, category: Category, split: &str) -> Result<Vec<String>> {
        read_split(self.split_file(category, split))
    }
}

/// Read a split file: one model id per line.
pub fn read_split(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let models: Vec<String> = contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    debug!("Read {} models from {}", models.len(), path.display());
    Ok(models)
}
