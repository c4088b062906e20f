//! Working selection of POS for the next optimization.
//!
//! Every mutating call reports whether it actually changed the selection so
//! the planner can invalidate derived state exactly when needed.

use crate::model::{Pos, PosId, Priority, SelectedPos, clamp_visit_minutes};

/// Ordered set of selected POS, at most one entry per id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionStore {
    entries: Vec<SelectedPos>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectedPos] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &PosId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &PosId) -> Option<&SelectedPos> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Append `pos` with default duration and priority. No-op if present.
    pub fn add(&mut self, pos: &Pos) -> bool {
        if self.contains(&pos.id) {
            return false;
        }
        self.entries.push(SelectedPos::new(pos.clone()));
        true
    }

    pub fn remove(&mut self, id: &PosId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Set the visit duration, clamped to the accepted range.
    pub fn set_visit_duration(&mut self, id: &PosId, minutes: i32) -> bool {
        let minutes = clamp_visit_minutes(minutes);
        match self.entry_mut(id) {
            Some(entry) if entry.visit_duration != minutes => {
                entry.visit_duration = minutes;
                true
            }
            _ => false,
        }
    }

    pub fn set_priority(&mut self, id: &PosId, priority: Priority) -> bool {
        match self.entry_mut(id) {
            Some(entry) if entry.priority != priority => {
                entry.priority = priority;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    /// Replace the whole selection, dropping duplicate ids and clamping
    /// durations on the way in.
    pub fn replace(&mut self, entries: Vec<SelectedPos>) {
        self.entries.clear();
        for mut entry in entries {
            if self.contains(entry.id()) {
                continue;
            }
            entry.visit_duration = clamp_visit_minutes(entry.visit_duration.into());
            self.entries.push(entry);
        }
    }

    fn position(&self, id: &PosId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    fn entry_mut(&mut self, id: &PosId) -> Option<&mut SelectedPos> {
        self.entries.iter_mut().find(|entry| entry.id() == id)
    }
}
