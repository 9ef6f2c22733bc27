//! Allocation edit engine - Turns grid gestures into store writes.
//!
//! The grid's rows are (project, member) pairs and its columns are months.
//! Three input modes are supported:
//!
//! - **Click-cycle**: pointer down and up on one cell without leaving it steps
//!   the cell through `0 -> first -> second -> 0`. Any value other than 0 or
//!   `first` resets to 0.
//! - **Drag-paint**: pointer down fixes a paint value for the whole gesture
//!   (`paint_value` when the start cell is empty, otherwise 0). Every cell
//!   entered in the start row is written once. The start cell is painted only
//!   once the pointer actually leaves it.
//! - **Direct entry**: free text parsed as a non-negative integer, written
//!   without an upper clamp. Unparseable text is discarded.
//!
//! Gesture state is a single value owned by the engine, so only one drag can
//! be active at a time.

use crate::{
    core::{
        calendar::Month,
        store::{AllocationStore, StoreChange},
    },
    entities::AllocationKey,
};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Values the edit engine writes for clicks and drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRules {
    /// Values visited after 0 by successive clicks, before returning to 0
    pub click_cycle: [u32; 2],
    /// Value a drag paints when it starts on an empty cell
    pub paint_value: u32,
}

impl Default for EditRules {
    fn default() -> Self {
        Self {
            click_cycle: [100, 50],
            paint_value: 100,
        }
    }
}

impl EditRules {
    /// The value a click writes over `current`.
    #[must_use]
    pub const fn next_click_value(&self, current: u32) -> u32 {
        let [first, second] = self.click_cycle;
        if current == 0 {
            first
        } else if current == first {
            second
        } else {
            0
        }
    }

    /// The value a drag starting on `current` paints.
    #[must_use]
    pub const fn paint_value_for(&self, current: u32) -> u32 {
        if current == 0 { self.paint_value } else { 0 }
    }
}

/// An in-progress drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drag {
    /// Cell the pointer went down on
    pub start: AllocationKey,
    /// Value written to every touched cell
    pub paint_value: u32,
    /// Whether the pointer has left the start cell
    pub moved: bool,
    /// Months already written during this gesture
    pub painted: HashSet<Month>,
}

impl Drag {
    fn same_row(&self, cell: &AllocationKey) -> bool {
        self.start.project_id == cell.project_id && self.start.member_id == cell.member_id
    }
}

/// Gesture state of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GestureState {
    /// No pointer held
    #[default]
    Idle,
    /// Pointer held after going down on a cell
    Dragging(Drag),
}

/// Discrete input events delivered by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Pointer pressed on a cell
    PointerDown(AllocationKey),
    /// Pointer entered a cell while moving
    PointerEnter(AllocationKey),
    /// Pointer released over a cell
    PointerUp(AllocationKey),
    /// Pointer released anywhere, including outside the grid
    GlobalPointerUp,
    /// A cell was opened for text entry
    OpenEditor(AllocationKey),
}

/// Interprets gestures against an [`AllocationStore`].
#[derive(Debug, Clone, Default)]
pub struct EditEngine {
    rules: EditRules,
    state: GestureState,
}

impl EditEngine {
    /// Creates an idle engine using `rules`.
    #[must_use]
    pub fn new(rules: EditRules) -> Self {
        Self {
            rules,
            state: GestureState::Idle,
        }
    }

    /// Current gesture state.
    #[must_use]
    pub const fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether a drag gesture is active.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Rules in effect.
    #[must_use]
    pub const fn rules(&self) -> &EditRules {
        &self.rules
    }

    /// Dispatches a pointer or editor event. Returns the store changes applied.
    pub fn handle(&mut self, store: &mut AllocationStore, event: GestureEvent) -> Vec<StoreChange> {
        match event {
            GestureEvent::PointerDown(cell) => {
                self.pointer_down(store, cell);
                Vec::new()
            }
            GestureEvent::PointerEnter(cell) => self.pointer_enter(store, cell),
            GestureEvent::PointerUp(cell) => self.pointer_up(store, cell),
            GestureEvent::GlobalPointerUp => {
                self.global_pointer_up();
                Vec::new()
            }
            GestureEvent::OpenEditor(cell) => {
                self.open_editor(store, cell);
                Vec::new()
            }
        }
    }

    /// Starts a gesture on `cell`. Nothing is written yet.
    ///
    /// A gesture left open by a missed release is replaced.
    pub fn pointer_down(&mut self, store: &AllocationStore, cell: AllocationKey) {
        if self.is_dragging() {
            trace!("Pointer down while dragging, discarding stale gesture");
        }
        let current = store.percentage(cell.project_id, cell.member_id, cell.month);
        let paint_value = self.rules.paint_value_for(current);
        trace!(month = %cell.month, current, paint_value, "Gesture started");
        self.state = GestureState::Dragging(Drag {
            start: cell,
            paint_value,
            moved: false,
            painted: HashSet::new(),
        });
    }

    /// Paints `cell` if a drag is active in its row and it has not been painted
    /// during this gesture. The first move off the start cell paints the start
    /// cell first.
    pub fn pointer_enter(
        &mut self,
        store: &mut AllocationStore,
        cell: AllocationKey,
    ) -> Vec<StoreChange> {
        let GestureState::Dragging(drag) = &mut self.state else {
            return Vec::new();
        };
        if !drag.same_row(&cell) {
            trace!(month = %cell.month, "Ignoring cell outside drag row");
            return Vec::new();
        }
        if !drag.moved && cell == drag.start {
            return Vec::new();
        }

        let mut changes = Vec::new();
        if !drag.moved {
            drag.moved = true;
            drag.painted.insert(drag.start.month);
            changes.extend(paint(store, drag.start, drag.paint_value));
        }
        if drag.painted.insert(cell.month) {
            changes.extend(paint(store, cell, drag.paint_value));
        }
        changes
    }

    /// Ends the gesture. Without movement, releasing on the start cell is a
    /// click and cycles its value.
    pub fn pointer_up(
        &mut self,
        store: &mut AllocationStore,
        cell: AllocationKey,
    ) -> Vec<StoreChange> {
        let GestureState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        if drag.moved {
            trace!(painted = drag.painted.len(), "Drag finished");
            return Vec::new();
        }
        if cell != drag.start {
            trace!("Released away from start cell without movement");
            return Vec::new();
        }
        self.click(store, cell).into_iter().collect()
    }

    /// Closes any active gesture without writing. Cells already painted keep
    /// their values.
    pub fn global_pointer_up(&mut self) {
        if let GestureState::Dragging(drag) = std::mem::take(&mut self.state) {
            trace!(painted = drag.painted.len(), "Gesture closed by global release");
        }
    }

    /// Applies a click-cycle step to `cell` outside of any gesture.
    pub fn click(&self, store: &mut AllocationStore, cell: AllocationKey) -> Option<StoreChange> {
        let current = store.percentage(cell.project_id, cell.member_id, cell.month);
        let next = self.rules.next_click_value(current);
        debug!(month = %cell.month, current, next, "Click cycle");
        store.upsert(cell.project_id, cell.member_id, cell.month, next)
    }

    /// Opens `cell` for text entry, cancelling any drag. Returns the seed text:
    /// the current percentage, or blank when the cell is empty.
    pub fn open_editor(&mut self, store: &AllocationStore, cell: AllocationKey) -> String {
        self.global_pointer_up();
        match store.percentage(cell.project_id, cell.member_id, cell.month) {
            0 => String::new(),
            p => p.to_string(),
        }
    }

    /// Commits typed text for `cell`.
    ///
    /// Text that does not parse as a non-negative integer is discarded with no
    /// write. Parsed values are stored as-is, so entries above 100 are kept.
    ///
    /// # Arguments
    ///
    /// * `store` - Allocation store the entry is written to
    /// * `cell` - The (project, member, month) being edited
    /// * `text` - Raw editor text; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// The resulting [`StoreChange`], or `None` when the text was discarded or
    /// the cell already held that value.
    pub fn commit_entry(
        &mut self,
        store: &mut AllocationStore,
        cell: AllocationKey,
        text: &str,
    ) -> Option<StoreChange> {
        self.global_pointer_up();
        let Ok(value) = text.trim().parse::<u32>() else {
            debug!(month = %cell.month, input = text, "Discarding unparseable entry");
            return None;
        };
        store.upsert(cell.project_id, cell.member_id, cell.month, value)
    }

    /// Deletes all of a member's allocations on a project in one step.
    ///
    /// A drag active in that row is closed first.
    pub fn remove_member_from_project(
        &mut self,
        store: &mut AllocationStore,
        project_id: i64,
        member_id: i64,
    ) -> Vec<StoreChange> {
        if let GestureState::Dragging(drag) = &self.state
            && drag.start.project_id == project_id
            && drag.start.member_id == member_id
        {
            self.global_pointer_up();
        }
        store
            .remove_member_from_project(project_id, member_id)
            .into_iter()
            .map(StoreChange::Deleted)
            .collect()
    }
}

fn paint(store: &mut AllocationStore, cell: AllocationKey, value: u32) -> Option<StoreChange> {
    store.upsert(cell.project_id, cell.member_id, cell.month, value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{cell, month};

    fn engine() -> EditEngine {
        EditEngine::new(EditRules::default())
    }

    fn click_once(engine: &mut EditEngine, store: &mut AllocationStore, c: AllocationKey) {
        engine.pointer_down(store, c);
        engine.pointer_up(store, c);
    }

    #[test]
    fn test_click_cycle_visits_expected_values() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");

        let mut visited = Vec::new();
        for _ in 0..7 {
            click_once(&mut engine, &mut store, c);
            visited.push(store.percentage(1, 10, month("2024-04")));
        }
        assert_eq!(visited, vec![100, 50, 0, 100, 50, 0, 100]);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_click_on_foreign_value_resets_to_zero() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");
        store.upsert(1, 10, c.month, 73);

        click_once(&mut engine, &mut store, c);
        assert!(store.get(1, 10, c.month).is_none());
    }

    #[test]
    fn test_click_cycle_uses_configured_values() {
        let mut store = AllocationStore::new();
        let mut engine = EditEngine::new(EditRules {
            click_cycle: [80, 40],
            paint_value: 80,
        });
        let c = cell(1, 10, "2024-04");
        let mut visited = Vec::new();
        for _ in 0..3 {
            click_once(&mut engine, &mut store, c);
            visited.push(store.percentage(1, 10, c.month));
        }
        assert_eq!(visited, vec![80, 40, 0]);
    }

    #[test]
    fn test_drag_from_empty_paints_full_including_start() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let start = cell(1, 10, "2024-04");

        engine.pointer_down(&store, start);
        assert!(store.is_empty(), "pointer down alone must not write");

        let changes = engine.pointer_enter(&mut store, cell(1, 10, "2024-05"));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].key(), start, "start cell is painted first");

        engine.pointer_enter(&mut store, cell(1, 10, "2024-06"));
        engine.pointer_up(&mut store, cell(1, 10, "2024-06"));

        for m in ["2024-04", "2024-05", "2024-06"] {
            assert_eq!(store.percentage(1, 10, month(m)), 100);
        }
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_drag_from_filled_cell_clears_row() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        store.upsert(1, 10, month("2024-04"), 50);
        store.upsert(1, 10, month("2024-05"), 100);
        store.upsert(1, 10, month("2024-06"), 20);

        engine.pointer_down(&store, cell(1, 10, "2024-04"));
        engine.pointer_enter(&mut store, cell(1, 10, "2024-05"));
        engine.pointer_enter(&mut store, cell(1, 10, "2024-06"));
        engine.pointer_up(&mut store, cell(1, 10, "2024-06"));

        assert!(store.is_empty());
    }

    #[test]
    fn test_drag_reentry_writes_once() {
        let mut store = AllocationStore::new();
        let mut engine = engine();

        engine.pointer_down(&store, cell(1, 10, "2024-04"));
        assert_eq!(engine.pointer_enter(&mut store, cell(1, 10, "2024-05")).len(), 2);
        // Back over the start cell and the second cell: nothing new is written
        assert!(engine.pointer_enter(&mut store, cell(1, 10, "2024-04")).is_empty());
        assert!(engine.pointer_enter(&mut store, cell(1, 10, "2024-05")).is_empty());

        // Someone changes a painted cell mid-gesture; re-entry does not overwrite it
        store.upsert(1, 10, month("2024-05"), 30);
        assert!(engine.pointer_enter(&mut store, cell(1, 10, "2024-05")).is_empty());
        engine.pointer_up(&mut store, cell(1, 10, "2024-05"));

        assert_eq!(store.percentage(1, 10, month("2024-05")), 30);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_drag_never_leaves_start_row() {
        let mut store = AllocationStore::new();
        let mut engine = engine();

        engine.pointer_down(&store, cell(1, 10, "2024-04"));
        assert!(engine.pointer_enter(&mut store, cell(1, 11, "2024-04")).is_empty());
        assert!(engine.pointer_enter(&mut store, cell(2, 10, "2024-05")).is_empty());
        engine.pointer_enter(&mut store, cell(1, 10, "2024-05"));
        engine.pointer_up(&mut store, cell(1, 10, "2024-05"));

        assert_eq!(store.len(), 2);
        assert!(store.iter().all(|a| a.project_id == 1 && a.member_id == 10));
    }

    #[test]
    fn test_cross_row_wandering_still_counts_as_click() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let start = cell(1, 10, "2024-04");

        engine.pointer_down(&store, start);
        engine.pointer_enter(&mut store, cell(1, 11, "2024-04"));
        engine.pointer_enter(&mut store, start);
        engine.pointer_up(&mut store, start);

        assert_eq!(store.percentage(1, 10, start.month), 100);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_release_away_from_start_without_movement_writes_nothing() {
        let mut store = AllocationStore::new();
        let mut engine = engine();

        engine.pointer_down(&store, cell(1, 10, "2024-04"));
        assert!(engine.pointer_up(&mut store, cell(1, 11, "2024-04")).is_empty());
        assert!(store.is_empty());
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_global_release_closes_gesture() {
        let mut store = AllocationStore::new();
        let mut engine = engine();

        engine.pointer_down(&store, cell(1, 10, "2024-04"));
        engine.pointer_enter(&mut store, cell(1, 10, "2024-05"));
        engine.handle(&mut store, GestureEvent::GlobalPointerUp);
        assert!(!engine.is_dragging());

        // Later movement writes nothing
        assert!(engine.pointer_enter(&mut store, cell(1, 10, "2024-06")).is_empty());
        assert_eq!(store.len(), 2);

        // Idle release is harmless
        engine.global_pointer_up();
        assert_eq!(engine.state(), &GestureState::Idle);
    }

    #[test]
    fn test_new_gesture_gets_fresh_painted_set() {
        let mut store = AllocationStore::new();
        let mut engine = engine();

        engine.pointer_down(&store, cell(1, 10, "2024-04"));
        engine.pointer_enter(&mut store, cell(1, 10, "2024-05"));
        engine.pointer_up(&mut store, cell(1, 10, "2024-05"));

        // Second gesture starts on a filled cell and clears the same cells
        engine.pointer_down(&store, cell(1, 10, "2024-05"));
        let changes = engine.pointer_enter(&mut store, cell(1, 10, "2024-04"));
        engine.pointer_up(&mut store, cell(1, 10, "2024-04"));
        assert_eq!(changes.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_event_dispatch_matches_direct_calls() {
        let mut direct_store = AllocationStore::new();
        let mut direct = engine();
        direct.pointer_down(&direct_store, cell(1, 10, "2024-04"));
        direct.pointer_enter(&mut direct_store, cell(1, 10, "2024-05"));
        direct.pointer_up(&mut direct_store, cell(1, 10, "2024-05"));

        let mut event_store = AllocationStore::new();
        let mut evented = engine();
        for event in [
            GestureEvent::PointerDown(cell(1, 10, "2024-04")),
            GestureEvent::PointerEnter(cell(1, 10, "2024-05")),
            GestureEvent::PointerUp(cell(1, 10, "2024-05")),
        ] {
            evented.handle(&mut event_store, event);
        }

        let snapshot = |s: &AllocationStore| {
            s.all_for(|_| true)
                .into_iter()
                .map(|a| (a.key(), a.percentage))
                .collect::<Vec<_>>()
        };
        assert_eq!(snapshot(&direct_store), snapshot(&event_store));
    }

    #[test]
    fn test_typed_entry_matches_click_results() {
        let mut clicked = AllocationStore::new();
        let mut typed = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");

        click_once(&mut engine, &mut clicked, c);
        engine.commit_entry(&mut typed, c, "100");
        assert_eq!(
            clicked.percentage(1, 10, c.month),
            typed.percentage(1, 10, c.month)
        );

        click_once(&mut engine, &mut clicked, c);
        click_once(&mut engine, &mut clicked, c);
        engine.commit_entry(&mut typed, c, "0");
        assert!(clicked.is_empty());
        assert!(typed.is_empty());
    }

    #[test]
    fn test_open_editor_seeds_text_and_cancels_drag() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");

        assert_eq!(engine.open_editor(&store, c), "");
        store.upsert(1, 10, c.month, 75);

        engine.pointer_down(&store, cell(1, 10, "2024-05"));
        assert_eq!(engine.open_editor(&store, c), "75");
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_commit_entry_accepts_over_100() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");

        let change = engine.commit_entry(&mut store, c, " 150 ").unwrap();
        assert!(matches!(change, StoreChange::Created(ref a) if a.percentage == 150));
        assert_eq!(store.percentage(1, 10, c.month), 150);
    }

    #[test]
    fn test_commit_entry_discards_garbage() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");
        store.upsert(1, 10, c.month, 60);

        for text in ["abc", "", "  ", "-20", "12.5", "50%"] {
            assert!(engine.commit_entry(&mut store, c, text).is_none(), "input {text:?}");
            assert_eq!(store.percentage(1, 10, c.month), 60);
        }
    }

    #[test]
    fn test_commit_zero_deletes() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        let c = cell(1, 10, "2024-04");
        store.upsert(1, 10, c.month, 60);

        let change = engine.commit_entry(&mut store, c, "0").unwrap();
        assert!(matches!(change, StoreChange::Deleted(_)));
        assert!(store.get(1, 10, c.month).is_none());
    }

    #[test]
    fn test_remove_member_from_project_closes_row_drag() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        store.upsert(1, 10, month("2024-04"), 100);
        store.upsert(1, 10, month("2024-05"), 50);
        store.upsert(2, 10, month("2024-04"), 50);

        engine.pointer_down(&store, cell(1, 10, "2024-06"));
        let changes = engine.remove_member_from_project(&mut store, 1, 10);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| matches!(c, StoreChange::Deleted(_))));
        assert!(!engine.is_dragging());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_member_from_project_keeps_drag_in_other_row() {
        let mut store = AllocationStore::new();
        let mut engine = engine();
        store.upsert(1, 10, month("2024-04"), 100);

        engine.pointer_down(&store, cell(2, 10, "2024-04"));
        let changes = engine.remove_member_from_project(&mut store, 1, 10);
        assert_eq!(changes.len(), 1);
        assert!(engine.is_dragging());

        engine.pointer_enter(&mut store, cell(2, 10, "2024-05"));
        assert_eq!(store.percentage(2, 10, month("2024-04")), 100);
        assert_eq!(store.percentage(2, 10, month("2024-05")), 100);
    }
}
