//! List-view controllers for the admin dashboard: query shaping, paginated fetches with
//! stale-response protection, and row-selection bookkeeping.

pub mod error;
pub mod local;
pub mod remote;
pub mod selection;
pub mod source;

pub use error::FetchError;
pub use local::{paginate, LocalListController};
pub use remote::{ListSnapshot, RemoteListController};
pub use selection::SelectionState;
pub use source::{AdminClient, HttpListSource, ListSource};

/// Published by [`RemoteListController`] after a current fetch resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    PageLoaded { epoch: u64, total_count: u64 },
    FetchFailed { epoch: u64, message: String },
}

/// How one fetch cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was replaced with the response.
    Settled,
    /// A newer fetch was issued first; the response was dropped.
    StaleDiscarded,
    /// Reported as [`ListEvent::FetchFailed`]; the previous page stays.
    Failed,
    /// The controller was torn down before the response arrived.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching {
        epoch: u64,
    },
}
