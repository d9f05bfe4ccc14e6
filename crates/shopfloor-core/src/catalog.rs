//! Object catalog - what can be built and how big it is.

use serde::{Deserialize, Serialize};

use crate::components::{PrefabRef, Size2};
use crate::config::ConfigError;

/// One buildable object type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    /// Footprint at rotation 0
    pub base_size: Size2,
    /// Footprint for the rotation currently being previewed
    #[serde(skip)]
    pub current_size: Size2,
    pub prefab: PrefabRef,
}

impl CatalogEntry {
    pub fn new(id: i32, name: impl Into<String>, base_size: Size2, prefab: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            base_size,
            current_size: base_size,
            prefab: PrefabRef::new(prefab),
        }
    }

    /// Set `current_size` for a rotation: quarter turns swap width and length.
    pub fn apply_rotation(&mut self, rotation_degrees: i32) {
        self.current_size = self.base_size.rotated(rotation_degrees);
    }

    pub fn reset_size(&mut self) {
        self.current_size = self.base_size;
    }
}

/// All buildable object types, looked up by type code.
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    entries: Vec<CatalogEntry>,
}

impl ObjectCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self { entries };
        for entry in &mut catalog.entries {
            entry.reset_size();
        }
        catalog
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let catalog = Self::new(entries);
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.base_size.width <= 0 || entry.base_size.length <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "catalog entry {} ({}) has non-positive size",
                    entry.id, entry.name
                )));
            }
            if self.entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(ConfigError::Invalid(format!(
                    "catalog id {} is listed twice",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: i32) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut CatalogEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
