//! The persisted region table.

use std::collections::BTreeMap;
use std::path::Path;

use framefit_common::FramefitResult;
use framefit_device_model::PixelRect;
use serde::{Deserialize, Serialize};

/// Mapping of bezel filename to detected screen rectangle.
///
/// Serialized as pretty-printed JSON; the `BTreeMap` keeps keys sorted
/// so regenerated tables diff cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable {
    entries: BTreeMap<String, PixelRect>,
}

impl RegionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> FramefitResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> FramefitResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn get(&self, file_name: &str) -> Option<PixelRect> {
        self.entries.get(file_name).copied()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, rect: PixelRect) {
        self.entries.insert(file_name.into(), rect);
    }

    pub fn remove(&mut self, file_name: &str) -> Option<PixelRect> {
        self.entries.remove(file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.entries.contains_key(file_name)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose filename fails `keep`, returning how many were
    /// removed.
    pub fn retain_files(&mut self, keep: impl Fn(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|name, _| keep(name));
        before - self.entries.len()
    }
}
