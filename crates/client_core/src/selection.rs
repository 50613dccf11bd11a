use std::{collections::HashSet, hash::Hash};

/// Selected record ids. Membership survives page changes; "select all" only ever
/// covers the ids that are currently visible.
#[derive(Debug, Clone)]
pub struct SelectionState<Id> {
    selected: HashSet<Id>,
}

impl<Id> Default for SelectionState<Id> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }
}

impl<Id: Clone + Eq + Hash> SelectionState<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are not checked against any loaded page.
    pub fn toggle(&mut self, id: Id) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// `true` replaces the selection with exactly `visible`; `false` clears everything.
    pub fn select_all_visible<'a>(&mut self, visible: impl IntoIterator<Item = &'a Id>, checked: bool)
    where
        Id: 'a,
    {
        self.selected.clear();
        if checked {
            self.selected.extend(visible.into_iter().cloned());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.selected.iter()
    }

    pub fn is_all_visible_selected(&self, visible: &[Id]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    /// A non-empty proper subset of the visible ids is selected.
    pub fn is_some_visible_selected(&self, visible: &[Id]) -> bool {
        let hits = visible
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        hits > 0 && hits < visible.len()
    }

    /// Bulk delete/edit controls are enabled whenever anything is selected.
    pub fn bulk_actions_enabled(&self) -> bool {
        !self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionState::new();
        selection.toggle(3);
        assert!(selection.contains(&3));
        assert!(selection.bulk_actions_enabled());
        selection.toggle(3);
        assert!(!selection.contains(&3));
        assert!(!selection.bulk_actions_enabled());
    }

    #[test]
    fn select_all_then_deselect_one_is_indeterminate() {
        let visible = vec![1, 2, 3];
        let mut selection = SelectionState::new();
        selection.select_all_visible(&visible, true);
        assert!(selection.is_all_visible_selected(&visible));
        assert!(!selection.is_some_visible_selected(&visible));

        selection.toggle(2);
        assert!(!selection.is_all_visible_selected(&visible));
        assert!(selection.is_some_visible_selected(&visible));
    }

    #[test]
    fn select_all_replaces_off_page_selection() {
        let mut selection = SelectionState::new();
        selection.toggle(99);
        selection.select_all_visible(&[1, 2], true);
        assert_eq!(selection.len(), 2);
        assert!(!selection.contains(&99));

        selection.select_all_visible(&[1, 2], false);
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let mut selection = SelectionState::new();
        selection.toggle(1);
        assert!(!selection.is_all_visible_selected(&[]));
        assert!(!selection.is_some_visible_selected(&[]));
    }

    #[test]
    fn off_page_ids_do_not_count_towards_visible_state() {
        let mut selection = SelectionState::new();
        selection.toggle(40);
        let visible = [1, 2];
        assert!(!selection.is_some_visible_selected(&visible));
        assert!(!selection.is_all_visible_selected(&visible));
        assert!(selection.bulk_actions_enabled());
    }
}
