mod file;
mod http;
mod memory;

pub use file::{DataFile, JsonFileSource};
pub use http::HttpSource;
pub use memory::MemorySource;

use serde::de::DeserializeOwned;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::error::SourceError;
use crate::record::{Bill, Customer, Product, Record};

/// Live sequence of full snapshots pushed by a source.
pub type LiveFeed<T> = Receiver<Vec<T>>;

/// Where a view gets its records from.
///
/// `fetch_all` may block. `subscribe` is optional; sources without push
/// support return `None` and callers fall back to `refresh`.
pub trait RecordSource<T>: Send + Sync {
    fn fetch_all(&self, tenant: &str) -> Result<Vec<T>, SourceError>;

    fn subscribe(&self, tenant: &str) -> Option<LiveFeed<T>> {
        let _ = tenant;
        None
    }
}

impl<T, S> RecordSource<T> for Arc<S>
where
    S: RecordSource<T> + ?Sized,
{
    fn fetch_all(&self, tenant: &str) -> Result<Vec<T>, SourceError> {
        (**self).fetch_all(tenant)
    }

    fn subscribe(&self, tenant: &str) -> Option<LiveFeed<T>> {
        (**self).subscribe(tenant)
    }
}

/// A record kind stored as a named collection in the data file and the
/// remote API.
pub trait Collection: Record + DeserializeOwned {
    const NAME: &'static str;

    fn take(data: DataFile) -> Vec<Self>;
}

impl Collection for Bill {
    const NAME: &'static str = "bills";

    fn take(data: DataFile) -> Vec<Self> {
        data.bills
    }
}

impl Collection for Customer {
    const NAME: &'static str = "customers";

    fn take(data: DataFile) -> Vec<Self> {
        data.customers
    }
}

impl Collection for Product {
    const NAME: &'static str = "products";

    fn take(data: DataFile) -> Vec<Self> {
        data.products
    }
}

/// Keep only live records owned by `tenant`, in their original order.
pub fn scope_to_tenant<T: Record>(records: impl IntoIterator<Item = T>, tenant: &str) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| record.tenant_id() == tenant && !record.is_deleted())
        .collect()
}

fn require_tenant(tenant: &str) -> Result<(), SourceError> {
    if tenant.trim().is_empty() {
        return Err(SourceError::Unavailable(tenant.to_string()));
    }
    Ok(())
}
