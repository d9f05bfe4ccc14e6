//! Contracts for the systems the engine drives but does not own: the
//! preview renderer and the shelving store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::components::{PrefabRef, ShelfData, ShelfEntry, ShelfSnapshot, Size2, Vec3};

/// Placement feedback surface (ghost object plus cell cursor).
pub trait PreviewSurface {
    /// Start showing a ghost of `prefab` with a cursor of `size` cells.
    fn show_placement(&mut self, prefab: &PrefabRef, size: Size2);
    /// Start showing a single-cell removal cursor.
    fn show_remove_cursor(&mut self);
    /// Move the preview and color it by validity.
    fn update(&mut self, position: Vec3, valid: bool);
    fn set_rotation(&mut self, rotation_degrees: i32);
    fn hide(&mut self);
}

/// Discards all feedback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPreview;

impl PreviewSurface for NullPreview {
    fn show_placement(&mut self, _prefab: &PrefabRef, _size: Size2) {}
    fn show_remove_cursor(&mut self) {}
    fn update(&mut self, _position: Vec3, _valid: bool) {}
    fn set_rotation(&mut self, _rotation_degrees: i32) {}
    fn hide(&mut self) {}
}

/// What a preview is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewMode {
    Hidden,
    Placement(PrefabRef),
    RemoveCursor,
}

/// Last state pushed to a `HeadlessPreview`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    pub mode: PreviewMode,
    pub cursor_size: Size2,
    pub position: Option<Vec3>,
    pub valid: bool,
    pub rotation_degrees: i32,
    pub updates: usize,
}

impl Default for PreviewFrame {
    fn default() -> Self {
        Self {
            mode: PreviewMode::Hidden,
            cursor_size: Size2::ONE,
            position: None,
            valid: false,
            rotation_degrees: 0,
            updates: 0,
        }
    }
}

/// Records preview calls instead of rendering them.
///
/// Clones share the same frame, so a caller can keep one clone to inspect
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPreview {
    frame: Rc<RefCell<PreviewFrame>>,
}

impl HeadlessPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> PreviewFrame {
        self.frame.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.frame.borrow().mode != PreviewMode::Hidden
    }
}

impl PreviewSurface for HeadlessPreview {
    fn show_placement(&mut self, prefab: &PrefabRef, size: Size2) {
        let mut frame = self.frame.borrow_mut();
        frame.mode = PreviewMode::Placement(prefab.clone());
        frame.cursor_size = size;
    }

    fn show_remove_cursor(&mut self) {
        let mut frame = self.frame.borrow_mut();
        frame.mode = PreviewMode::RemoveCursor;
        frame.cursor_size = Size2::ONE;
        frame.valid = false;
    }

    fn update(&mut self, position: Vec3, valid: bool) {
        let mut frame = self.frame.borrow_mut();
        frame.position = Some(position);
        frame.valid = valid;
        frame.updates += 1;
    }

    fn set_rotation(&mut self, rotation_degrees: i32) {
        self.frame.borrow_mut().rotation_degrees = rotation_degrees;
    }

    fn hide(&mut self) {
        let mut frame = self.frame.borrow_mut();
        frame.mode = PreviewMode::Hidden;
        frame.position = None;
    }
}

/// Bridge to the shelving system, keyed by placement unique id.
///
/// Called for container types only: on placement, removal and moves.
pub trait ContainerBridge {
    /// Bind (or re-bind) a shelf to `data`.
    fn rebuild(&mut self, unique_id: &str, data: ShelfData);
    /// Drop any stored data for a shelf that left the grid.
    fn forget(&mut self, unique_id: &str);
    fn lookup(&self, unique_id: &str) -> Option<ShelfData>;
    fn snapshot(&self) -> ShelfSnapshot;
    fn restore(&mut self, snapshot: ShelfSnapshot);
}

/// In-memory shelf store.
#[derive(Debug, Clone, Default)]
pub struct ShelfStore {
    shelves: HashMap<String, ShelfData>,
}

impl ShelfStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shelves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty()
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.shelves.contains_key(unique_id)
    }
}

impl ContainerBridge for ShelfStore {
    fn rebuild(&mut self, unique_id: &str, data: ShelfData) {
        self.shelves.insert(unique_id.to_string(), data);
    }

    fn forget(&mut self, unique_id: &str) {
        self.shelves.remove(unique_id);
    }

    fn lookup(&self, unique_id: &str) -> Option<ShelfData> {
        self.shelves.get(unique_id).cloned()
    }

    fn snapshot(&self) -> ShelfSnapshot {
        let mut entries: Vec<ShelfEntry> = self
            .shelves
            .iter()
            .map(|(id, data)| ShelfEntry {
                unique_id: id.clone(),
                data: data.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        ShelfSnapshot { entries }
    }

    fn restore(&mut self, snapshot: ShelfSnapshot) {
        self.shelves = snapshot
            .entries
            .into_iter()
            .map(|entry| (entry.unique_id, entry.data))
            .collect();
    }
}
