use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::aggregate::AggregateResult;
use crate::error::SourceError;

/// Lifecycle of a view.
///
/// `Uninitialized -> Loading -> Ready`, `Ready -> Loading` on every refresh,
/// `Loading -> Error` on a failed fetch. `Error` keeps the last good data and
/// is left by the next refresh. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViewState::Uninitialized => "uninitialized",
            ViewState::Loading => "loading",
            ViewState::Ready => "ready",
            ViewState::Error => "error",
        };
        f.write_str(label)
    }
}

/// Why the last refresh failed, as shown to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    NotSignedIn,
    Source(String),
}

impl From<&SourceError> for ViewError {
    fn from(error: &SourceError) -> Self {
        match error {
            SourceError::Unavailable(_) => ViewError::NotSignedIn,
            SourceError::Retrieval(detail) => ViewError::Source(detail.clone()),
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::NotSignedIn => f.write_str("not signed in"),
            ViewError::Source(detail) => write!(f, "{detail}"),
        }
    }
}

/// The most recent full record set, replaced wholesale.
#[derive(Debug)]
pub struct Snapshot<T> {
    records: Arc<Vec<T>>,
    retrieved_at: DateTime<Utc>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            retrieved_at: self.retrieved_at,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(records),
            retrieved_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What a screen renders: the filtered records and their totals.
#[derive(Debug)]
pub struct ViewValue<T> {
    pub state: ViewState,
    pub error: Option<ViewError>,
    pub records: Arc<Vec<T>>,
    pub aggregates: AggregateResult,
    pub retrieved_at: Option<DateTime<Utc>>,
    /// Bumped on every recomputation.
    pub revision: u64,
}

impl<T> Clone for ViewValue<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            error: self.error.clone(),
            records: Arc::clone(&self.records),
            aggregates: self.aggregates.clone(),
            retrieved_at: self.retrieved_at,
            revision: self.revision,
        }
    }
}

/// Pushed to subscribers in the order the view processed operations.
#[derive(Debug)]
pub enum ViewEvent<T> {
    /// A refresh started; the previous data stays valid.
    Loading,
    /// Filtered records or totals changed.
    Updated(ViewValue<T>),
    /// A refresh failed. Any data already published is still current.
    Failed(ViewError),
}

impl<T> Clone for ViewEvent<T> {
    fn clone(&self) -> Self {
        match self {
            ViewEvent::Loading => ViewEvent::Loading,
            ViewEvent::Updated(value) => ViewEvent::Updated(value.clone()),
            ViewEvent::Failed(error) => ViewEvent::Failed(error.clone()),
        }
    }
}

/// Handle for one issued refresh, ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(pub(crate) u64);

impl RefreshTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Failed(ViewError),
    /// A later refresh was issued first; this result was dropped.
    Superseded,
}
