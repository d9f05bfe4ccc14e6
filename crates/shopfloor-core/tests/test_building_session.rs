//! Integration tests for whole building sessions driven through
//! `PlacementSystem`.
//!
//! Exercises: enter mode → hover → rotate → confirm → exit, then save/load.
//! Pure logic, no rendering.

use std::cell::RefCell;
use std::rc::Rc;

use shopfloor_core::persistence;
use shopfloor_core::prelude::*;
use shopfloor_core::states::BuildContext;

const CATALOG_JSON: &str = include_str!("../../../data/object_catalog.json");

const FLOOR: i32 = 0;
const COUNTER: i32 = 1;
const SHELF: i32 = 2;
const WIDE_SHELF: i32 = 3;
const PLANT: i32 = 5;

// ── Helpers ────────────────────────────────────────────────────────────

/// Shelf store that also records every call it receives.
#[derive(Clone, Default)]
struct RecordingShelves {
    store: Rc<RefCell<ShelfStore>>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl ContainerBridge for RecordingShelves {
    fn rebuild(&mut self, unique_id: &str, data: ShelfData) {
        self.calls.borrow_mut().push(format!("rebuild {}", unique_id));
        self.store.borrow_mut().rebuild(unique_id, data);
    }

    fn forget(&mut self, unique_id: &str) {
        self.calls.borrow_mut().push(format!("forget {}", unique_id));
        self.store.borrow_mut().forget(unique_id);
    }

    fn lookup(&self, unique_id: &str) -> Option<ShelfData> {
        self.store.borrow().lookup(unique_id)
    }

    fn snapshot(&self) -> ShelfSnapshot {
        self.store.borrow().snapshot()
    }

    fn restore(&mut self, snapshot: ShelfSnapshot) {
        self.store.borrow_mut().restore(snapshot);
    }
}

struct Session {
    system: PlacementSystem,
    preview: HeadlessPreview,
    shelves: RecordingShelves,
}

fn session() -> Session {
    session_with(BuildConfig::default())
}

fn session_with(config: BuildConfig) -> Session {
    let catalog = ObjectCatalog::from_json_str(CATALOG_JSON).expect("catalog parses");
    let preview = HeadlessPreview::new();
    let shelves = RecordingShelves::default();
    let ctx = BuildContext::new(&config, catalog)
        .with_preview(preview.clone())
        .with_containers(shelves.clone());
    Session {
        system: PlacementSystem::with_context(ctx, config.save_format),
        preview,
        shelves,
    }
}

fn place(system: &mut PlacementSystem, type_code: i32, cell: Cell) {
    system.enter_place(type_code).unwrap();
    system.hover(cell);
    assert!(system.confirm(cell).unwrap().is_some(), "placing {} at {}", type_code, cell);
    system.exit().unwrap();
}

fn snapshot(grid: &OccupancyGrid, cell: Cell) -> (Option<Cell>, Option<i32>, Option<i32>, Option<String>) {
    (
        grid.origin_at(cell),
        grid.rotation_at(cell),
        grid.type_at(cell),
        grid.unique_id_at(cell).map(str::to_string),
    )
}

// ── Placement ──────────────────────────────────────────────────────────

#[test]
fn out_of_bounds_placement_is_rejected() {
    let mut s = session();
    s.system.enter_place(WIDE_SHELF).unwrap();
    s.system.hover(Cell::new(4, 0));
    assert!(!s.preview.frame().valid);
    assert_eq!(s.system.confirm(Cell::new(4, 0)).unwrap(), None);
    assert!(s.system.layers().furniture.is_empty());
    assert!(s.shelves.calls.borrow().is_empty());
}

#[test]
fn rotated_footprint_follows_rotation_table() {
    let mut s = session();
    s.system.enter_place(WIDE_SHELF).unwrap();
    s.system.hover(Cell::new(0, 0));
    // Two counter-clockwise ticks: 0 -> 270 -> 180
    s.system.rotate(1);
    s.system.rotate(1);
    assert_eq!(s.system.rotation(), 180);
    s.system.confirm(Cell::new(0, 0)).unwrap();

    let grid = &s.system.layers().furniture;
    assert_eq!(grid.origin_at(Cell::new(-1, 0)), Some(Cell::new(0, 0)));
    assert!(!grid.is_occupied(Cell::new(1, 0)));
    assert_eq!(grid.rotation_at(Cell::new(0, 0)), Some(180));
}

#[test]
fn placing_a_shelf_notifies_once() {
    let mut s = session();
    place(&mut s.system, SHELF, Cell::new(1, 1));
    assert_eq!(*s.shelves.calls.borrow(), vec!["rebuild 2_1_1".to_string()]);
    assert_eq!(s.system.context().scene.container_count(), 1);
}

#[test]
fn hovering_the_same_cell_changes_nothing() {
    let mut s = session();
    place(&mut s.system, SHELF, Cell::new(0, 0));
    let calls_before = s.shelves.calls.borrow().len();

    s.system.enter_place(SHELF).unwrap();
    let updates_before = s.preview.frame().updates;
    for _ in 0..10 {
        s.system.hover(Cell::new(3, 3));
    }
    assert_eq!(s.preview.frame().updates, updates_before + 1);
    assert_eq!(s.system.layers().placement_count(), 1);
    assert_eq!(s.shelves.calls.borrow().len(), calls_before);
}

// ── Removal ────────────────────────────────────────────────────────────

#[test]
fn removal_on_half_unit_cells_destroys_the_right_instance() {
    let mut s = session_with(BuildConfig {
        cell_size: 0.5,
        ..BuildConfig::default()
    });
    place(&mut s.system, PLANT, Cell::new(1, 0));
    place(&mut s.system, PLANT, Cell::new(2, 0));

    s.system.enter_remove().unwrap();
    assert_eq!(s.system.confirm(Cell::new(2, 0)).unwrap(), Some(LayerId::Furniture));

    let ctx = s.system.context();
    let plant = PrefabRef::new("plant");
    assert_eq!(ctx.scene.instance_count(), 1);
    let survivor = ctx
        .scene
        .find_prefab_at(ctx.cell_to_world(Cell::new(1, 0)), &plant)
        .expect("plant at (1, 0) survives");
    assert_eq!(
        ctx.scene.transform(survivor).map(|t| t.position),
        Some(Vec3::new(0.5, 0.0, 0.0))
    );
    assert!(ctx.scene.find_at(ctx.cell_to_world(Cell::new(2, 0))).is_none());
}

#[test]
fn removal_takes_furniture_before_floor() {
    let mut s = session();
    place(&mut s.system, FLOOR, Cell::new(0, 0));
    place(&mut s.system, WIDE_SHELF, Cell::new(0, 0));

    s.system.enter_remove().unwrap();
    assert_eq!(s.system.confirm(Cell::new(1, 0)).unwrap(), Some(LayerId::Furniture));
    assert!(s.system.layers().floor.is_occupied(Cell::new(0, 0)));
    assert_eq!(s.system.context().scene.instance_count(), 1);
    assert_eq!(s.shelves.calls.borrow().last().map(String::as_str), Some("forget 3_0_0"));

    assert_eq!(s.system.confirm(Cell::new(0, 0)).unwrap(), Some(LayerId::Floor));
    assert_eq!(s.system.confirm(Cell::new(0, 0)).unwrap(), None);
    assert_eq!(s.system.context().scene.instance_count(), 0);
}

#[test]
fn removal_from_any_footprint_cell_frees_all() {
    let mut s = session();
    place(&mut s.system, 4, Cell::new(-2, -2));
    s.system.enter_remove().unwrap();
    s.system.confirm(Cell::new(-1, -1)).unwrap();
    let grid = &s.system.layers().furniture;
    assert!(grid.is_empty());
    assert!(grid.can_place(Cell::new(-2, -2), Size2::new(2, 2), 0));
}

// ── Editing ────────────────────────────────────────────────────────────

#[test]
fn edit_cancel_restores_the_object() {
    let mut s = session();
    s.system.enter_place(COUNTER).unwrap();
    s.system.hover(Cell::new(2, 2));
    s.system.rotate(-1);
    s.system.confirm(Cell::new(2, 2)).unwrap();
    s.system.exit().unwrap();
    let before: Vec<_> = [Cell::new(2, 2), Cell::new(2, 1)]
        .iter()
        .map(|c| snapshot(&s.system.layers().furniture, *c))
        .collect();

    s.system.enter_edit().unwrap();
    s.system.hover(Cell::new(2, 1));
    s.system.confirm(Cell::new(2, 1)).unwrap();
    assert!(s.system.layers().furniture.is_empty());

    // Somewhere invalid, then give up
    s.system.hover(Cell::new(4, 4));
    assert!(!s.preview.frame().valid);
    assert_eq!(s.system.exit().unwrap(), Some(LayerId::Furniture));

    let after: Vec<_> = [Cell::new(2, 2), Cell::new(2, 1)]
        .iter()
        .map(|c| snapshot(&s.system.layers().furniture, *c))
        .collect();
    assert_eq!(before, after);
    assert_eq!(s.system.context().scene.instance_count(), 1);
    assert!(!s.preview.is_visible());
}

#[test]
fn edit_move_keeps_shelf_contents() {
    let mut s = session();
    place(&mut s.system, SHELF, Cell::new(0, 0));
    s.system
        .context_mut()
        .containers
        .rebuild("2_0_0", ShelfData::new().with_item(3, 0).with_item(5, 1));
    s.shelves.calls.borrow_mut().clear();

    s.system.enter_edit().unwrap();
    s.system.confirm(Cell::new(0, 1)).unwrap();
    s.system.hover(Cell::new(-4, -4));
    s.system.confirm(Cell::new(-4, -4)).unwrap();
    assert_eq!(s.system.active_mode(), None);

    assert_eq!(
        *s.shelves.calls.borrow(),
        vec!["forget 2_0_0".to_string(), "rebuild 2_-4_-4".to_string()]
    );
    assert_eq!(
        s.shelves.lookup("2_-4_-4"),
        Some(ShelfData::new().with_item(3, 0).with_item(5, 1))
    );
    assert!(s.shelves.lookup("2_0_0").is_none());
}

#[test]
fn edit_cancel_keeps_a_loaded_shelf_id() {
    let mut layers = Layers::new(10, 10);
    let mut record = PlacementRecord::new(vec![Cell::new(2, 0), Cell::new(2, 1)], SHELF, 0);
    record.unique_id = "shelf-A".to_string();
    layers.furniture.import_record(record).unwrap();
    let mut store = ShelfStore::new();
    store.rebuild("shelf-A", ShelfData::new().with_item(4, 3));
    let mut buffer = Vec::new();
    persistence::save_session(&mut buffer, &persistence::export_session(&layers, &store), SaveFormat::Json)
        .unwrap();

    let mut s = session();
    s.system.load_from(&buffer[..], SaveFormat::Json).unwrap();
    s.shelves.calls.borrow_mut().clear();

    s.system.enter_edit().unwrap();
    s.system.confirm(Cell::new(2, 1)).unwrap();
    s.system.hover(Cell::new(4, 4));
    assert_eq!(s.system.exit().unwrap(), Some(LayerId::Furniture));

    let grid = &s.system.layers().furniture;
    assert_eq!(grid.unique_id_at(Cell::new(2, 0)), Some("shelf-A"));
    assert_eq!(grid.unique_id_at(Cell::new(2, 1)), Some("shelf-A"));
    assert_eq!(
        *s.shelves.calls.borrow(),
        vec!["forget shelf-A".to_string(), "rebuild shelf-A".to_string()]
    );
    assert_eq!(s.shelves.lookup("shelf-A"), Some(ShelfData::new().with_item(4, 3)));
    assert!(s.shelves.lookup("2_2_0").is_none());

    let ctx = s.system.context();
    let shelf = ctx
        .scene
        .find_prefab_at(ctx.cell_to_world(Cell::new(2, 0)), &PrefabRef::new("shelf"))
        .expect("shelf instance restored");
    assert_eq!(ctx.scene.binding(shelf).as_deref(), Some("shelf-A"));
    assert_eq!(ctx.scene.container_count(), 1);
}

#[test]
fn edit_on_empty_cell_does_nothing() {
    let mut s = session();
    s.system.enter_edit().unwrap();
    assert_eq!(s.system.confirm(Cell::new(0, 0)).unwrap(), None);
    assert_eq!(s.system.active_mode(), Some(ModeKind::Editing));
    assert_eq!(s.system.exit().unwrap(), None);
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn save_load_roundtrip_restores_grids_and_shelves() {
    let mut s = session();
    place(&mut s.system, FLOOR, Cell::new(-5, -5));
    place(&mut s.system, COUNTER, Cell::new(0, 0));
    place(&mut s.system, SHELF, Cell::new(3, 2));
    s.system
        .context_mut()
        .containers
        .rebuild("2_3_2", ShelfData::new().with_item(1, 2));

    for format in [SaveFormat::Json, SaveFormat::Binary] {
        let mut buffer = Vec::new();
        s.system.save_to(&mut buffer, format).expect("Save failed");

        let mut loaded = session();
        loaded.system.load_from(&buffer[..], format).expect("Load failed");

        for x in -5..5 {
            for z in -5..5 {
                let cell = Cell::new(x, z);
                for layer in LayerId::ALL {
                    assert_eq!(
                        snapshot(s.system.layers().get(layer), cell),
                        snapshot(loaded.system.layers().get(layer), cell),
                        "{} {} after {:?}",
                        layer,
                        cell,
                        format
                    );
                }
            }
        }
        assert_eq!(loaded.system.context().scene.instance_count(), 3);
        assert_eq!(
            loaded.shelves.lookup("2_3_2"),
            Some(ShelfData::new().with_item(1, 2))
        );
    }
}

#[test]
fn missing_save_file_starts_empty() {
    let mut s = session();
    place(&mut s.system, COUNTER, Cell::new(0, 0));
    let path = std::env::temp_dir().join("shopfloor-session-test-no-such-file.json");
    s.system.load_file_or_default(&path).unwrap();
    assert_eq!(s.system.layers().placement_count(), 0);
    assert_eq!(s.system.context().scene.instance_count(), 0);
}

#[test]
fn save_file_then_load_file() {
    let mut s = session();
    place(&mut s.system, WIDE_SHELF, Cell::new(1, -3));
    let path = std::env::temp_dir().join(format!("shopfloor-session-{}.json", std::process::id()));
    s.system.save_file(&path).unwrap();

    let mut loaded = session();
    loaded.system.load_file_or_default(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(
        loaded.system.layers().furniture.unique_id_at(Cell::new(2, -3)),
        Some("3_1_-3")
    );
    assert_eq!(loaded.system.context().scene.container_count(), 1);
}
