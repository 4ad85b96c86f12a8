use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{require_tenant, scope_to_tenant, Collection, RecordSource};
use crate::error::SourceError;
use crate::record::{Bill, Customer, Product};

/// On-disk export of a shop's collections.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DataFile {
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl DataFile {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SourceError::Retrieval(format!("reading {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| SourceError::Retrieval(format!("parsing {}: {e}", path.display())))
    }
}

/// Reads records from a JSON data file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Collection> RecordSource<T> for JsonFileSource {
    fn fetch_all(&self, tenant: &str) -> Result<Vec<T>, SourceError> {
        require_tenant(tenant)?;
        let data = DataFile::load(&self.path)?;
        let records = scope_to_tenant(T::take(data), tenant);
        tracing::debug!(
            collection = T::NAME,
            count = records.len(),
            path = %self.path.display(),
            "loaded records from file"
        );
        Ok(records)
    }
}
