//! Selection and drag state machine.
//!
//! Two states: idle and dragging. A pointer-down over an identified element
//! starts a drag session; the action is disambiguated by modifier keys:
//!
//! | Modifier | Action |
//! |----------|-----------------------------------------|
//! | **Alt**  | Resize (width/height, floor 10 units)   |
//! | **Shift**| Duplicate (clone moves, original stays) |
//! | **Ctrl** | Toggle selection membership             |
//! | none     | Move                                    |
//!
//! Geometry snapshots are captured per selected element at drag start, and
//! every move applies the pointer delta against the snapshot rather than
//! accumulating increments.

use crate::input::Modifiers;
use lk_core::{Geometry, Ident, Placement, Stage};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Minimum width/height a resize drag can reach.
pub const RESIZE_FLOOR: f32 = 10.0;

/// What an active drag session does to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAction {
    Move,
    Resize,
    Duplicate,
}

/// Tracks the selection set and the in-progress drag session, if any.
#[derive(Debug, Default)]
pub struct DragController {
    /// Currently selected element uids, in selection order.
    pub selected: SmallVec<[Ident; 4]>,
    action: Option<DragAction>,
    /// Pointer position at drag start.
    anchor: (f32, f32),
    /// Per-element geometry captured at drag start.
    start_geometry: HashMap<Ident, Geometry>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.action.is_some()
    }

    pub fn action(&self) -> Option<DragAction> {
        self.action
    }

    pub fn is_selected(&self, uid: Ident) -> bool {
        self.selected.contains(&uid)
    }

    /// Drop the whole selection and any drag bookkeeping.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.action = None;
        self.start_geometry.clear();
    }

    /// Replace the selection wholesale (used after paste).
    pub fn select_all(&mut self, uids: impl IntoIterator<Item = Ident>) {
        self.selected.clear();
        self.selected.extend(uids);
    }

    /// Idle → dragging. Resolves selection rules and the drag action, then
    /// snapshots geometry. A miss (no identified element under the pointer)
    /// leaves everything untouched.
    pub fn pointer_down(
        &mut self,
        stage: &mut Stage,
        hit: Option<Ident>,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    ) {
        let Some(hit) = hit else { return };

        if modifiers.ctrl {
            // Toggle membership without clearing others.
            if let Some(pos) = self.selected.iter().position(|uid| *uid == hit) {
                self.selected.remove(pos);
            } else {
                self.selected.push(hit);
            }
        } else if !self.is_selected(hit) {
            // Click on an unselected element: singleton selection.
            self.selected.clear();
            self.selected.push(hit);
        }
        // Click on an already-selected element keeps the whole selection
        // for a group drag.

        self.action = Some(if modifiers.alt {
            DragAction::Resize
        } else if modifiers.shift {
            DragAction::Duplicate
        } else {
            DragAction::Move
        });
        self.anchor = (x, y);
        self.start_geometry.clear();

        // Snapshot first, then apply — duplication mutates the selection
        // while we walk it.
        let snapshot: Vec<Ident> = self.selected.iter().copied().collect();
        for uid in snapshot {
            let Some(geometry) = stage.element(uid).map(|el| el.geometry) else {
                continue;
            };
            self.start_geometry.insert(uid, geometry);

            if self.action == Some(DragAction::Duplicate) {
                match stage.clone_element(uid) {
                    Ok(clone) => {
                        // The clone takes the original's place in the
                        // selection and drags from the same snapshot; the
                        // original stays where it is.
                        if let Some(el) = stage.element_mut(clone) {
                            el.placement = Placement::Absolute;
                            el.geometry = geometry;
                        }
                        if let Some(pos) = self.selected.iter().position(|s| *s == uid) {
                            self.selected[pos] = clone;
                        }
                        self.start_geometry.remove(&uid);
                        self.start_geometry.insert(clone, geometry);
                    }
                    Err(err) => log::warn!("duplicate of {uid} failed: {err}"),
                }
            }
        }
    }

    /// Apply the pointer delta to every selected element.
    pub fn pointer_move(&mut self, stage: &mut Stage, x: f32, y: f32) {
        let Some(action) = self.action else { return };
        let dx = x - self.anchor.0;
        let dy = y - self.anchor.1;

        for uid in &self.selected {
            let Some(start) = self.start_geometry.get(uid) else {
                continue;
            };
            let Some(el) = stage.element_mut(*uid) else {
                continue;
            };
            match action {
                DragAction::Move | DragAction::Duplicate => {
                    el.placement = Placement::Absolute;
                    el.geometry.left = start.left + dx;
                    el.geometry.top = start.top + dy;
                }
                DragAction::Resize => {
                    el.geometry.width = (start.width + dx).max(RESIZE_FLOOR);
                    el.geometry.height = (start.height + dy).max(RESIZE_FLOOR);
                }
            }
        }
    }

    /// Dragging → idle. The selection survives; the session does not.
    pub fn pointer_up(&mut self) {
        self.action = None;
        self.start_geometry.clear();
    }
}
