//! Schedule selection used to narrow what gets projected.

use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleId;

/// Ordered set of selected schedule ids. Empty means "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    ids: Vec<ScheduleId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present.
    pub fn toggle(&mut self, id: ScheduleId) {
        match self.ids.iter().position(|selected| *selected == id) {
            Some(index) => {
                self.ids.remove(index);
            }
            None => self.ids.push(id),
        }
    }

    /// Replaces the selection with `ids`, dropping duplicates.
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ScheduleId>,
    {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[ScheduleId] {
        &self.ids
    }

    pub fn contains(&self, id: ScheduleId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ScheduleId> for SelectionState {
    fn from_iter<I: IntoIterator<Item = ScheduleId>>(iter: I) -> Self {
        let mut selection = Self::new();
        selection.select_all(iter);
        selection
    }
}
