use shared::{
    domain::Record,
    error::QueryError,
    protocol::Page,
    query::{ListConfig, QueryState},
};

use crate::selection::SelectionState;

/// Rows `[page_index * page_size, page_index * page_size + page_size)` of `items`,
/// clamped to the slice. Pages past the end are empty.
pub fn paginate<R>(items: &[R], page_size: usize, page_index: usize) -> &[R] {
    let start = page_index.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// List controller over a collection that is already fully loaded, such as the uses of
/// an affiliate code. Paging is a synchronous slice; there is nothing to fetch and
/// nothing that can fail besides invalid page input.
#[derive(Debug, Clone)]
pub struct LocalListController<R: Record> {
    items: Vec<R>,
    config: ListConfig,
    query: QueryState,
    page: Page<R>,
    selection: SelectionState<R::Id>,
}

impl<R: Record + Clone> LocalListController<R> {
    pub fn new(items: Vec<R>, config: ListConfig) -> Self {
        let query = QueryState::new(&config);
        let mut controller = Self {
            items,
            config,
            query,
            page: Page::default(),
            selection: SelectionState::new(),
        };
        controller.refresh();
        controller
    }

    pub fn refresh(&mut self) -> &Page<R> {
        let rows = paginate(&self.items, self.query.page_size(), self.query.page_index());
        self.page = Page::new(rows.to_vec(), self.items.len() as u64);
        &self.page
    }

    pub fn set_page_index(&mut self, index: i64) -> Result<&Page<R>, QueryError> {
        self.query.set_page_index(index)?;
        Ok(self.refresh())
    }

    /// Returns to the first page, same as the remote controller.
    pub fn set_page_size(&mut self, size: i64) -> Result<&Page<R>, QueryError> {
        self.query.set_page_size(size)?;
        Ok(self.refresh())
    }

    pub fn page(&self) -> &Page<R> {
        &self.page
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn visible_ids(&self) -> Vec<R::Id> {
        self.page.items.iter().map(Record::record_id).collect()
    }

    pub fn toggle_selection(&mut self, id: R::Id) {
        self.selection.toggle(id);
    }

    pub fn select_all_visible(&mut self, checked: bool) {
        let visible = self.visible_ids();
        self.selection.select_all_visible(&visible, checked);
    }

    pub fn is_all_visible_selected(&self) -> bool {
        self.selection.is_all_visible_selected(&self.visible_ids())
    }

    pub fn is_some_visible_selected(&self) -> bool {
        self.selection.is_some_visible_selected(&self.visible_ids())
    }

    pub fn bulk_actions_enabled(&self) -> bool {
        self.selection.bulk_actions_enabled()
    }

    pub fn selection(&self) -> &SelectionState<R::Id> {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steam_ids(count: usize) -> Vec<String> {
        (0..count).map(|n| format!("7656119800000{n:04}")).collect()
    }

    #[test]
    fn third_page_of_twenty_three_has_three_rows() {
        let mut uses = LocalListController::new(steam_ids(23), ListConfig::affiliates());
        let page = uses.set_page_index(2).expect("page index");
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_count, 23);
        assert_eq!(page.items[0], steam_ids(23)[20]);
    }

    #[test]
    fn first_page_is_loaded_on_construction() {
        let uses = LocalListController::new(steam_ids(12), ListConfig::affiliates());
        assert_eq!(uses.page().items.len(), 10);
        assert_eq!(uses.page().total_count, 12);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let mut uses = LocalListController::new(steam_ids(5), ListConfig::affiliates());
        let page = uses.set_page_index(7).expect("no upper bound");
        assert!(page.is_empty());
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn page_size_change_returns_to_first_page() {
        let mut uses = LocalListController::new(steam_ids(30), ListConfig::affiliates());
        uses.set_page_index(2).expect("page index");
        let page = uses.set_page_size(25).expect("page size");
        assert_eq!(page.items.len(), 25);
        assert_eq!(uses.query().page_index(), 0);
    }

    #[test]
    fn invalid_page_input_keeps_current_page() {
        let mut uses = LocalListController::new(steam_ids(30), ListConfig::affiliates());
        uses.set_page_index(1).expect("page index");

        assert_eq!(
            uses.set_page_index(-2).expect_err("negative"),
            QueryError::OutOfRange { index: -2 }
        );
        assert_eq!(
            uses.set_page_size(0).expect_err("zero"),
            QueryError::InvalidPageSize { size: 0 }
        );
        assert_eq!(uses.query().page_index(), 1);
        assert_eq!(uses.page().items[0], steam_ids(30)[10]);
    }

    #[test]
    fn selection_survives_page_changes() {
        let ids = steam_ids(15);
        let mut uses = LocalListController::new(ids.clone(), ListConfig::affiliates());
        uses.toggle_selection(ids[0].clone());
        uses.set_page_index(1).expect("page index");
        uses.toggle_selection(ids[12].clone());

        assert!(uses.selection().contains(&ids[0]));
        assert!(uses.selection().contains(&ids[12]));
        assert!(uses.is_some_visible_selected());
        assert!(uses.bulk_actions_enabled());

        uses.select_all_visible(true);
        assert!(uses.is_all_visible_selected());
        assert_eq!(uses.selection().len(), 5);
    }

    #[test]
    fn paginate_clamps_to_bounds() {
        let rows = [1, 2, 3];
        assert_eq!(paginate(&rows, 2, 0), &[1, 2]);
        assert_eq!(paginate(&rows, 2, 1), &[3]);
        assert!(paginate(&rows, 2, 5).is_empty());
        assert!(paginate(&rows, usize::MAX, usize::MAX).is_empty());
    }
}
