use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::mpsc::{channel, Sender};

use super::{require_tenant, scope_to_tenant, LiveFeed, RecordSource};
use crate::error::SourceError;
use crate::record::Record;

/// In-process record store with push support.
///
/// Every `replace` fans the new tenant-scoped snapshot out to live
/// subscribers. Tenants can be signed out and failures injected, which is
/// what tests and demos need from a backend.
pub struct MemorySource<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    records: Vec<T>,
    signed_out: HashSet<String>,
    failure: Option<String>,
    subscribers: Vec<(String, Sender<Vec<T>>)>,
}

impl<T: Record> MemorySource<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records,
                signed_out: HashSet::new(),
                failure: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Swap in a new record set and push it to subscribers.
    pub fn replace(&self, records: Vec<T>) {
        let mut inner = self.inner.lock();
        inner.records = records;
        let Inner {
            records,
            subscribers,
            ..
        } = &mut *inner;
        subscribers.retain(|(tenant, tx)| {
            tx.send(scope_to_tenant(records.iter().cloned(), tenant)).is_ok()
        });
    }

    pub fn sign_out(&self, tenant: &str) {
        self.inner.lock().signed_out.insert(tenant.to_string());
    }

    pub fn sign_in(&self, tenant: &str) {
        self.inner.lock().signed_out.remove(tenant);
    }

    /// Make every fetch fail with `detail` until cleared with `None`.
    pub fn set_failure(&self, detail: Option<&str>) {
        self.inner.lock().failure = detail.map(str::to_string);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl<T: Record> RecordSource<T> for MemorySource<T> {
    fn fetch_all(&self, tenant: &str) -> Result<Vec<T>, SourceError> {
        require_tenant(tenant)?;
        let inner = self.inner.lock();
        if inner.signed_out.contains(tenant) {
            return Err(SourceError::Unavailable(tenant.to_string()));
        }
        if let Some(detail) = &inner.failure {
            return Err(SourceError::Retrieval(detail.clone()));
        }
        Ok(scope_to_tenant(inner.records.iter().cloned(), tenant))
    }

    fn subscribe(&self, tenant: &str) -> Option<LiveFeed<T>> {
        let (tx, rx) = channel();
        self.inner.lock().subscribers.push((tenant.to_string(), tx));
        Some(rx)
    }
}
