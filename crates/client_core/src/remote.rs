use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::Record,
    error::QueryError,
    protocol::Page,
    query::{filter_tag_for_tab, parse_sort_value, ListConfig, QueryState, SortDirection},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::FetchError, selection::SelectionState, source::ListSource, FetchOutcome, FetchPhase,
    ListEvent,
};

/// List controller backed by a paginated remote collection.
///
/// Every query mutation bumps the fetch epoch and issues a new request without waiting
/// for the one in flight. A response is applied only if its epoch is still current and
/// the controller has not been torn down, so the visible page always matches the most
/// recently issued query.
pub struct RemoteListController<R: Record> {
    shared: Arc<Shared<R>>,
}

struct Shared<R: Record> {
    source: Arc<dyn ListSource<R>>,
    config: ListConfig,
    mounted: AtomicBool,
    state: Mutex<ListState<R>>,
    events: broadcast::Sender<ListEvent>,
}

struct ListState<R: Record> {
    query: QueryState,
    page: Page<R>,
    selection: SelectionState<R::Id>,
    epoch: u64,
    phase: FetchPhase,
}

/// Point-in-time view for the presentation layer.
#[derive(Debug, Clone)]
pub struct ListSnapshot<R: Record> {
    pub query: QueryState,
    pub page: Page<R>,
    pub selected: Vec<R::Id>,
    pub phase: FetchPhase,
    pub epoch: u64,
}

impl<R> RemoteListController<R>
where
    R: Record + Clone + Send + Sync + 'static,
{
    /// Does not fetch; call [`refresh`](Self::refresh) once the screen is shown.
    pub fn new(source: Arc<dyn ListSource<R>>, config: ListConfig) -> Self {
        let query = QueryState::new(&config);
        Self::new_with_query(source, config, query)
    }

    pub fn new_with_query(
        source: Arc<dyn ListSource<R>>,
        config: ListConfig,
        query: QueryState,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                mounted: AtomicBool::new(true),
                state: Mutex::new(ListState {
                    query,
                    page: Page::default(),
                    selection: SelectionState::new(),
                    epoch: 0,
                    phase: FetchPhase::Idle,
                }),
                events,
            }),
        }
    }

    pub fn config(&self) -> &ListConfig {
        &self.shared.config
    }

    /// Fetch outcomes (loaded pages and failures). Stale responses are never published.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.shared.events.subscribe()
    }

    /// Issues a fetch for the current query and returns without waiting for it.
    pub async fn refresh(&self) -> JoinHandle<FetchOutcome> {
        let mut state = self.shared.state.lock().await;
        self.issue(&mut state)
    }

    pub async fn set_search_text(&self, text: impl Into<String>) -> JoinHandle<FetchOutcome> {
        let mut state = self.shared.state.lock().await;
        state.query.set_search_text(text);
        self.issue(&mut state)
    }

    pub async fn set_sort(
        &self,
        key: &str,
        direction: SortDirection,
    ) -> Result<JoinHandle<FetchOutcome>, QueryError> {
        let mut state = self.shared.state.lock().await;
        state.query.set_sort(&self.shared.config, key, direction)?;
        Ok(self.issue(&mut state))
    }

    /// Sort by a `field|direction` select value such as `role|asc`.
    pub async fn set_sort_value(&self, value: &str) -> Result<JoinHandle<FetchOutcome>, QueryError> {
        let (key, direction) = parse_sort_value(value)?;
        self.set_sort(&key, direction).await
    }

    pub async fn set_filter_tag(&self, tag: Option<String>) -> JoinHandle<FetchOutcome> {
        let mut state = self.shared.state.lock().await;
        state.query.set_filter_tag(tag);
        self.issue(&mut state)
    }

    /// Switching tabs also drops the current selection.
    pub async fn select_tab(&self, value: &str) -> JoinHandle<FetchOutcome> {
        let mut state = self.shared.state.lock().await;
        state.selection.clear();
        state.query.set_filter_tag(filter_tag_for_tab(value));
        self.issue(&mut state)
    }

    pub async fn set_page_index(&self, index: i64) -> Result<JoinHandle<FetchOutcome>, QueryError> {
        let mut state = self.shared.state.lock().await;
        state.query.set_page_index(index)?;
        Ok(self.issue(&mut state))
    }

    pub async fn set_page_size(&self, size: i64) -> Result<JoinHandle<FetchOutcome>, QueryError> {
        let mut state = self.shared.state.lock().await;
        state.query.set_page_size(size)?;
        Ok(self.issue(&mut state))
    }

    pub async fn toggle_selection(&self, id: R::Id) {
        self.shared.state.lock().await.selection.toggle(id);
    }

    pub async fn select_all_visible(&self, checked: bool) {
        let mut state = self.shared.state.lock().await;
        let ListState {
            page, selection, ..
        } = &mut *state;
        let visible: Vec<R::Id> = page.items.iter().map(Record::record_id).collect();
        selection.select_all_visible(&visible, checked);
    }

    pub async fn is_all_visible_selected(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.selection.is_all_visible_selected(&state.visible_ids())
    }

    pub async fn is_some_visible_selected(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.selection.is_some_visible_selected(&state.visible_ids())
    }

    pub async fn bulk_actions_enabled(&self) -> bool {
        self.shared.state.lock().await.selection.bulk_actions_enabled()
    }

    pub async fn is_selected(&self, id: &R::Id) -> bool {
        self.shared.state.lock().await.selection.contains(id)
    }

    pub async fn selected_ids(&self) -> Vec<R::Id> {
        self.shared
            .state
            .lock()
            .await
            .selection
            .ids()
            .cloned()
            .collect()
    }

    pub async fn visible_ids(&self) -> Vec<R::Id> {
        self.shared.state.lock().await.visible_ids()
    }

    pub async fn page(&self) -> Page<R> {
        self.shared.state.lock().await.page.clone()
    }

    pub async fn query(&self) -> QueryState {
        self.shared.state.lock().await.query.clone()
    }

    pub async fn phase(&self) -> FetchPhase {
        self.shared.state.lock().await.phase
    }

    pub async fn epoch(&self) -> u64 {
        self.shared.state.lock().await.epoch
    }

    pub async fn snapshot(&self) -> ListSnapshot<R> {
        let state = self.shared.state.lock().await;
        ListSnapshot {
            query: state.query.clone(),
            page: state.page.clone(),
            selected: state.selection.ids().cloned().collect(),
            phase: state.phase,
            epoch: state.epoch,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.is_mounted()
    }

    /// Stops applying results of fetches that are still in flight. Also runs on drop.
    pub fn teardown(&self) {
        if self.shared.mounted.swap(false, Ordering::SeqCst) {
            info!("list controller torn down");
        }
    }

    fn issue(&self, state: &mut ListState<R>) -> JoinHandle<FetchOutcome> {
        if !self.shared.is_mounted() {
            return tokio::spawn(async { FetchOutcome::Detached });
        }

        state.epoch += 1;
        let epoch = state.epoch;
        state.phase = FetchPhase::Fetching { epoch };
        let request = state.query.to_request();
        debug!(
            epoch,
            page = request.page,
            per_page = request.per_page,
            "issuing list fetch"
        );

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = shared.source.fetch_page(&request).await;
            shared.settle(epoch, result).await
        })
    }
}

impl<R: Record> Drop for RemoteListController<R> {
    fn drop(&mut self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
    }
}

impl<R: Record> Shared<R> {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    async fn settle(&self, epoch: u64, result: Result<Page<R>, FetchError>) -> FetchOutcome {
        let mut state = self.state.lock().await;
        if !self.is_mounted() {
            debug!(epoch, "dropping fetch result for torn down list");
            return FetchOutcome::Detached;
        }
        if epoch != state.epoch {
            debug!(epoch, current = state.epoch, "discarding stale list page");
            return FetchOutcome::StaleDiscarded;
        }

        state.phase = FetchPhase::Idle;
        match result {
            Ok(page) => {
                let total_count = page.total_count;
                debug!(epoch, rows = page.items.len(), total_count, "list page loaded");
                state.page = page;
                let _ = self.events.send(ListEvent::PageLoaded { epoch, total_count });
                FetchOutcome::Settled
            }
            Err(err) => {
                warn!(epoch, "list fetch failed: {err}");
                let _ = self.events.send(ListEvent::FetchFailed {
                    epoch,
                    message: err.to_string(),
                });
                FetchOutcome::Failed
            }
        }
    }
}

impl<R: Record> ListState<R> {
    fn visible_ids(&self) -> Vec<R::Id> {
        self.page.items.iter().map(Record::record_id).collect()
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
