//! Save/Load functionality for persisting both grids and the shelf store
//!
//! A save is a `SaveRecord`: one `GridSave` per layer plus the shelving
//! bridge's snapshot. It is written as pretty JSON by default or as bincode
//! for compact snapshots. Records are stored verbatim, so unique ids are never
//! re-derived on load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::collaborators::ContainerBridge;
use crate::components::{Cell, PlacementRecord, ShelfSnapshot};
use crate::config::{BuildConfig, SaveFormat};
use crate::grid::{LayerId, Layers, OccupancyGrid};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// One placed object, keyed by its origin cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    pub anchor_cell: Cell,
    pub record: PlacementRecord,
}

/// Serializable form of one `OccupancyGrid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSave {
    /// `"floorData"` or `"furnitureData"`
    pub layer_id: String,
    pub width: i32,
    pub length: i32,
    pub entries: Vec<GridEntry>,
}

impl GridSave {
    pub fn from_grid(layer: LayerId, grid: &OccupancyGrid) -> Self {
        let entries = grid
            .placements()
            .map(|(_, record)| GridEntry {
                anchor_cell: record.origin().unwrap_or_default(),
                record: record.clone(),
            })
            .collect();
        Self {
            layer_id: layer.save_key().to_string(),
            width: grid.width(),
            length: grid.length(),
            entries,
        }
    }
}

/// Everything a session persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Save format version
    pub version: u32,
    pub grids: Vec<GridSave>,
    pub shelf_snapshot: ShelfSnapshot,
}

/// Result of importing a `SaveRecord`
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub layers: Layers,
    pub shelf_snapshot: ShelfSnapshot,
}

/// Capture both grids and the shelf store.
pub fn export_session(layers: &Layers, containers: &dyn ContainerBridge) -> SaveRecord {
    SaveRecord {
        version: SAVE_VERSION,
        grids: LayerId::ALL
            .iter()
            .map(|layer| GridSave::from_grid(*layer, layers.get(*layer)))
            .collect(),
        shelf_snapshot: containers.snapshot(),
    }
}

/// Rebuild both grids from a `SaveRecord`.
pub fn import_session(save: SaveRecord) -> Result<LoadedSession, SaveError> {
    if save.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save.version,
        });
    }

    let mut floor = None;
    let mut furniture = None;
    for grid_save in &save.grids {
        let Some(layer) = LayerId::from_save_key(&grid_save.layer_id) else {
            log::warn!("skipping unknown grid {:?} in save", grid_save.layer_id);
            continue;
        };
        let grid = grid_from_save(grid_save)?;
        match layer {
            LayerId::Floor => floor = Some(grid),
            LayerId::Furniture => furniture = Some(grid),
        }
    }

    let floor = floor.ok_or_else(|| SaveError::MissingLayer(LayerId::Floor.save_key().to_string()))?;
    let furniture = furniture
        .ok_or_else(|| SaveError::MissingLayer(LayerId::Furniture.save_key().to_string()))?;

    Ok(LoadedSession {
        layers: Layers { floor, furniture },
        shelf_snapshot: save.shelf_snapshot,
    })
}

/// Rebuild one grid. Older saves list a record once per covered cell; those
/// repeats collapse onto the record's origin.
pub fn grid_from_save(save: &GridSave) -> Result<OccupancyGrid, SaveError> {
    if save.width <= 0 || save.length <= 0 {
        return Err(SaveError::Corrupt(format!(
            "{} has size {}x{}",
            save.layer_id, save.width, save.length
        )));
    }

    let mut grid = OccupancyGrid::new(save.width, save.length);
    let mut seen: HashMap<Cell, &PlacementRecord> = HashMap::new();
    for entry in &save.entries {
        let Some(origin) = entry.record.origin() else {
            return Err(SaveError::Corrupt(format!(
                "{} has a record with no cells at {}",
                save.layer_id, entry.anchor_cell
            )));
        };
        if let Some(previous) = seen.get(&origin) {
            if **previous != entry.record {
                return Err(SaveError::Corrupt(format!(
                    "{} has two different records with origin {}",
                    save.layer_id, origin
                )));
            }
            continue;
        }
        grid.import_record(entry.record.clone())
            .map_err(|e| SaveError::Corrupt(format!("{}: {}", save.layer_id, e)))?;
        seen.insert(origin, &entry.record);
    }
    Ok(grid)
}

/// Save a session to a writer in the given format
pub fn save_session<W: Write>(writer: W, save: &SaveRecord, format: SaveFormat) -> Result<(), SaveError> {
    match format {
        SaveFormat::Json => serde_json::to_writer_pretty(writer, save)?,
        SaveFormat::Binary => bincode::serialize_into(writer, save)?,
    }
    Ok(())
}

/// Load a session from a reader in the given format
pub fn load_session<R: Read>(reader: R, format: SaveFormat) -> Result<LoadedSession, SaveError> {
    let save: SaveRecord = match format {
        SaveFormat::Json => serde_json::from_reader(reader)?,
        SaveFormat::Binary => bincode::deserialize_from(reader)?,
    };
    import_session(save)
}

pub fn save_to_path(path: impl AsRef<Path>, save: &SaveRecord, format: SaveFormat) -> Result<(), SaveError> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    save_session(&mut writer, save, format)?;
    writer.flush()?;
    Ok(())
}

/// Load `path`, or start from two empty grids when it does not exist yet.
pub fn load_or_default(path: impl AsRef<Path>, config: &BuildConfig) -> Result<LoadedSession, SaveError> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("No save file found at {}, starting empty", path.display());
        return Ok(LoadedSession {
            layers: Layers::new(config.grid_width, config.grid_length),
            shelf_snapshot: ShelfSnapshot::default(),
        });
    }
    let file = std::fs::File::open(path)?;
    let loaded = load_session(BufReader::new(file), config.save_format)?;
    log::info!(
        "Loaded {} placements from {}",
        loaded.layers.placement_count(),
        path.display()
    );
    Ok(loaded)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    MissingLayer(String),
    Corrupt(String),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::MissingLayer(key) => write!(f, "Save has no {} grid", key),
            SaveError::Corrupt(detail) => write!(f, "Corrupt save: {}", detail),
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ShelfStore;
    use crate::components::{ShelfData, Size2};

    fn populated() -> (Layers, ShelfStore) {
        let mut layers = Layers::new(10, 10);
        layers.floor.add(Cell::new(-5, -5), Size2::ONE, 0, 0).unwrap();
        layers.furniture.add(Cell::new(0, 0), Size2::new(2, 1), 1, 180).unwrap();
        layers.furniture.add(Cell::new(3, 2), Size2::new(1, 2), 2, 90).unwrap();
        let mut shelves = ShelfStore::new();
        shelves.rebuild("2_3_2", ShelfData::new().with_item(4, 1));
        (layers, shelves)
    }

    fn assert_same_lookups(a: &OccupancyGrid, b: &OccupancyGrid) {
        for x in -5..5 {
            for z in -5..5 {
                let cell = Cell::new(x, z);
                assert_eq!(a.origin_at(cell), b.origin_at(cell), "origin at {}", cell);
                assert_eq!(a.rotation_at(cell), b.rotation_at(cell), "rotation at {}", cell);
                assert_eq!(a.type_at(cell), b.type_at(cell), "type at {}", cell);
                assert_eq!(a.unique_id_at(cell), b.unique_id_at(cell), "id at {}", cell);
            }
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let (layers, shelves) = populated();
        let save = export_session(&layers, &shelves);

        let mut buffer = Vec::new();
        save_session(&mut buffer, &save, SaveFormat::Json).expect("Save failed");
        let loaded = load_session(&buffer[..], SaveFormat::Json).expect("Load failed");

        assert_same_lookups(&layers.floor, &loaded.layers.floor);
        assert_same_lookups(&layers.furniture, &loaded.layers.furniture);
        assert_eq!(loaded.layers.placement_count(), 3);

        let mut restored = ShelfStore::new();
        restored.restore(loaded.shelf_snapshot);
        assert_eq!(
            restored.lookup("2_3_2"),
            Some(ShelfData::new().with_item(4, 1))
        );
    }

    #[test]
    fn test_binary_roundtrip() {
        let (layers, shelves) = populated();
        let save = export_session(&layers, &shelves);

        let mut buffer = Vec::new();
        save_session(&mut buffer, &save, SaveFormat::Binary).expect("Save failed");
        let loaded = load_session(&buffer[..], SaveFormat::Binary).expect("Load failed");
        assert_same_lookups(&layers.furniture, &loaded.layers.furniture);
    }

    #[test]
    fn test_one_entry_per_record() {
        let (layers, shelves) = populated();
        let save = export_session(&layers, &shelves);
        let furniture = save
            .grids
            .iter()
            .find(|g| g.layer_id == "furnitureData")
            .unwrap();
        assert_eq!(furniture.entries.len(), 2);
        assert!(furniture
            .entries
            .iter()
            .all(|e| Some(e.anchor_cell) == e.record.origin()));
    }

    #[test]
    fn test_ids_are_not_rederived() {
        let mut layers = Layers::new(10, 10);
        let mut record = PlacementRecord::new(vec![Cell::new(1, 1)], 1, 0);
        record.unique_id = "legacy-id".to_string();
        layers.furniture.import_record(record).unwrap();

        let save = export_session(&layers, &ShelfStore::new());
        let loaded = import_session(save).unwrap();
        assert_eq!(loaded.layers.furniture.unique_id_at(Cell::new(1, 1)), Some("legacy-id"));
    }

    #[test]
    fn test_per_cell_entries_collapse() {
        let record = PlacementRecord::new(vec![Cell::new(0, 0), Cell::new(1, 0)], 1, 0);
        let save = GridSave {
            layer_id: "furnitureData".to_string(),
            width: 10,
            length: 10,
            entries: record
                .occupied_cells
                .iter()
                .map(|cell| GridEntry {
                    anchor_cell: *cell,
                    record: record.clone(),
                })
                .collect(),
        };
        let grid = grid_from_save(&save).unwrap();
        assert_eq!(grid.placement_count(), 1);
        assert_eq!(grid.origin_at(Cell::new(1, 0)), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_overlapping_records_are_corrupt() {
        let a = PlacementRecord::new(vec![Cell::new(0, 0), Cell::new(1, 0)], 1, 0);
        let b = PlacementRecord::new(vec![Cell::new(1, 0)], 2, 0);
        let save = GridSave {
            layer_id: "furnitureData".to_string(),
            width: 10,
            length: 10,
            entries: vec![
                GridEntry { anchor_cell: Cell::new(0, 0), record: a },
                GridEntry { anchor_cell: Cell::new(1, 0), record: b },
            ],
        };
        assert!(matches!(grid_from_save(&save), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn test_version_and_missing_layer() {
        let (layers, shelves) = populated();
        let mut save = export_session(&layers, &shelves);
        save.version = 99;
        assert!(matches!(
            import_session(save.clone()),
            Err(SaveError::VersionMismatch { expected: 1, found: 99 })
        ));

        save.version = SAVE_VERSION;
        save.grids.retain(|g| g.layer_id != "floorData");
        match import_session(save) {
            Err(SaveError::MissingLayer(key)) => assert_eq!(key, "floorData"),
            other => panic!("expected missing layer, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = BuildConfig {
            grid_width: 6,
            grid_length: 4,
            ..BuildConfig::default()
        };
        let path = std::env::temp_dir().join("shopfloor-definitely-missing-save.json");
        let loaded = load_or_default(&path, &config).unwrap();
        assert!(loaded.layers.floor.is_empty());
        assert_eq!(loaded.layers.furniture.width(), 6);
        assert_eq!(loaded.layers.furniture.length(), 4);
    }
}
