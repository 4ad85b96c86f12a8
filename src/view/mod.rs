//! A live, filtered, totalled view over one tenant's records.
//!
//! A [`ReactiveView`] owns the latest [`Snapshot`] from its [`RecordSource`],
//! the screen's [`FilterSet`] and its aggregate specs. Any change to the
//! snapshot or the filters recomputes the filtered list and the totals from
//! the held snapshot and pushes a [`ViewEvent`] to every subscriber.
//!
//! All operations are serialized by one lock. `refresh` releases it while the
//! source is fetching, and each fetch carries a sequence number: a result is
//! applied only if no later refresh was issued in the meantime.

mod state;

pub use state::{RefreshOutcome, RefreshTicket, Snapshot, ViewError, ViewEvent, ViewState, ViewValue};

use parking_lot::Mutex;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregateResult, AggregateSpec, AggregationEngine};
use crate::error::SourceError;
use crate::filter::{FilterSet, Predicate};
use crate::source::{LiveFeed, RecordSource};

pub struct ReactiveView<T, S> {
    source: S,
    tenant: String,
    inner: Mutex<Inner<T>>,
    live: Mutex<Option<LiveFeed<T>>>,
}

struct Inner<T> {
    state: ViewState,
    error: Option<ViewError>,
    snapshot: Option<Snapshot<T>>,
    filters: FilterSet<T>,
    engine: AggregationEngine<T>,
    filtered: Arc<Vec<T>>,
    aggregates: AggregateResult,
    revision: u64,
    issued: u64,
    in_flight: bool,
    subscribers: Vec<Sender<ViewEvent<T>>>,
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn recompute(&mut self) {
        let filtered = match &self.snapshot {
            Some(snapshot) => self.filters.apply(snapshot.records()),
            None => Vec::new(),
        };
        self.aggregates = self.engine.compute(&filtered);
        self.filtered = Arc::new(filtered);
        self.revision += 1;
        debug!(
            revision = self.revision,
            matched = self.filtered.len(),
            total = self.snapshot.as_ref().map_or(0, Snapshot::len),
            filters = self.filters.len(),
            "recomputed view"
        );
    }

    fn value(&self) -> ViewValue<T> {
        ViewValue {
            state: self.state,
            error: self.error.clone(),
            records: Arc::clone(&self.filtered),
            aggregates: self.aggregates.clone(),
            retrieved_at: self.snapshot.as_ref().map(Snapshot::retrieved_at),
            revision: self.revision,
        }
    }

    fn publish(&mut self, event: ViewEvent<T>) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn publish_value(&mut self) {
        let value = self.value();
        self.publish(ViewEvent::Updated(value));
    }

    fn store(&mut self, records: Vec<T>) {
        self.snapshot = Some(Snapshot::new(records));
        if !self.in_flight {
            self.state = ViewState::Ready;
            self.error = None;
        }
        self.recompute();
        self.publish_value();
    }
}

impl<T, S> ReactiveView<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: RecordSource<T>,
{
    /// Bind a view to `source` for `tenant`. Nothing is fetched yet.
    pub fn new(
        source: S,
        tenant: impl Into<String>,
        filters: FilterSet<T>,
        specs: Vec<AggregateSpec<T>>,
    ) -> Self {
        let engine = AggregationEngine::new(specs);
        let aggregates = engine.compute(&[]);
        Self {
            source,
            tenant: tenant.into(),
            inner: Mutex::new(Inner {
                state: ViewState::Uninitialized,
                error: None,
                snapshot: None,
                filters,
                engine,
                filtered: Arc::new(Vec::new()),
                aggregates,
                revision: 0,
                issued: 0,
                in_flight: false,
                subscribers: Vec::new(),
            }),
            live: Mutex::new(None),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> ViewState {
        self.inner.lock().state
    }

    /// Synchronous read of what subscribers last saw.
    pub fn current_value(&self) -> ViewValue<T> {
        self.inner.lock().value()
    }

    pub fn snapshot(&self) -> Option<Snapshot<T>> {
        self.inner.lock().snapshot.clone()
    }

    pub fn filters(&self) -> FilterSet<T> {
        self.inner.lock().filters.clone()
    }

    /// Receive every future event. The current value is delivered first.
    pub fn subscribe(&self) -> Receiver<ViewEvent<T>> {
        let (tx, rx) = channel();
        let mut inner = self.inner.lock();
        if tx.send(ViewEvent::Updated(inner.value())).is_ok() {
            inner.subscribers.push(tx);
        }
        rx
    }

    /// Store a freshly delivered record set and republish.
    pub fn on_snapshot(&self, records: Vec<T>) {
        let mut inner = self.inner.lock();
        inner.store(records);
    }

    /// Set (`Some`) or clear (`None`) the filter under `key`, then recompute
    /// from the held snapshot. Never touches the source.
    pub fn update_filter(&self, key: &str, predicate: Option<Predicate<T>>) {
        let mut inner = self.inner.lock();
        match predicate {
            Some(predicate) => inner.filters.set(key, predicate),
            None => {
                inner.filters.clear(key);
            }
        }
        inner.recompute();
        inner.publish_value();
    }

    /// Replace the whole filter set at once.
    pub fn set_filters(&self, filters: FilterSet<T>) {
        let mut inner = self.inner.lock();
        inner.filters = filters;
        inner.recompute();
        inner.publish_value();
    }

    pub fn set_aggregates(&self, specs: Vec<AggregateSpec<T>>) {
        let mut inner = self.inner.lock();
        inner.engine = AggregationEngine::new(specs);
        inner.recompute();
        inner.publish_value();
    }

    /// Mark a refresh as issued. Any earlier outstanding refresh is
    /// superseded from this point on.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.in_flight = true;
        inner.state = ViewState::Loading;
        inner.error = None;
        inner.publish(ViewEvent::Loading);
        RefreshTicket(inner.issued)
    }

    /// Apply the result of the refresh identified by `ticket`.
    ///
    /// Results of superseded refreshes are dropped. A retrieval failure keeps
    /// the last good data. A lost session clears it even when a snapshot is
    /// held, so a signed-out tenant is never shown its previous records.
    pub fn complete_refresh(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<T>, SourceError>,
    ) -> RefreshOutcome {
        let mut inner = self.inner.lock();
        if ticket.0 != inner.issued {
            debug!(
                ticket = ticket.0,
                latest = inner.issued,
                "dropping result of superseded refresh"
            );
            return RefreshOutcome::Superseded;
        }
        inner.in_flight = false;

        match result {
            Ok(records) => {
                info!(
                    tenant = %self.tenant,
                    ticket = ticket.0,
                    records = records.len(),
                    "refresh applied"
                );
                inner.store(records);
                RefreshOutcome::Applied
            }
            Err(source_error) => {
                warn!(tenant = %self.tenant, error = %source_error, "refresh failed");
                let error = ViewError::from(&source_error);
                inner.state = ViewState::Error;
                inner.error = Some(error.clone());
                if source_error.is_unavailable() {
                    inner.snapshot = None;
                    inner.recompute();
                    inner.publish_value();
                }
                inner.publish(ViewEvent::Failed(error.clone()));
                RefreshOutcome::Failed(error)
            }
        }
    }

    /// Fetch a new snapshot and apply it, unless a later refresh overtakes
    /// this one. Blocks for as long as the source does.
    pub fn refresh(&self) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let result = self.source.fetch_all(&self.tenant);
        self.complete_refresh(ticket, result)
    }

    /// Start listening to the source's live feed. Returns `false` if the
    /// source has none, in which case callers keep using `refresh`.
    pub fn attach_live(&self) -> bool {
        match self.source.subscribe(&self.tenant) {
            Some(feed) => {
                *self.live.lock() = Some(feed);
                true
            }
            None => {
                debug!(tenant = %self.tenant, "source has no live feed");
                false
            }
        }
    }

    /// Apply every snapshot already waiting on the live feed, in order,
    /// without blocking. Returns how many were applied.
    pub fn drain_live(&self) -> usize {
        let pending = {
            let mut live = self.live.lock();
            let Some(feed) = live.as_ref() else {
                return 0;
            };
            let mut pending = Vec::new();
            let closed = loop {
                match feed.try_recv() {
                    Ok(records) => pending.push(records),
                    Err(TryRecvError::Empty) => break false,
                    Err(TryRecvError::Disconnected) => break true,
                }
            };
            if closed {
                debug!(tenant = %self.tenant, "live feed closed");
                *live = None;
            }
            pending
        };

        let applied = pending.len();
        for records in pending {
            self.on_snapshot(records);
        }
        applied
    }

    /// Apply live snapshots as they arrive until the feed closes. Meant to
    /// run on a dedicated thread.
    pub fn follow_live(&self) {
        let Some(feed) = self.live.lock().take() else {
            return;
        };
        while let Ok(records) = feed.recv() {
            self.on_snapshot(records);
        }
        debug!(tenant = %self.tenant, "live feed closed");
    }
}
