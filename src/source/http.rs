use std::time::Duration;
use ureq::Agent;

use super::{require_tenant, scope_to_tenant, Collection, RecordSource};
use crate::error::SourceError;

/// Fetches `{base_url}/{collection}?owner={tenant}` as a JSON array.
pub struct HttpSource {
    agent: Agent,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }
}

impl<T: Collection> RecordSource<T> for HttpSource {
    fn fetch_all(&self, tenant: &str) -> Result<Vec<T>, SourceError> {
        require_tenant(tenant)?;
        let url = self.collection_url(T::NAME);

        let body = match self.agent.get(url.as_str()).query("owner", tenant).call() {
            Ok(mut response) => response
                .body_mut()
                .read_to_string()
                .map_err(|e| SourceError::Retrieval(format!("reading {url}: {e}")))?,
            Err(ureq::Error::StatusCode(401 | 403)) => {
                return Err(SourceError::Unavailable(tenant.to_string()));
            }
            Err(e) => return Err(SourceError::Retrieval(format!("GET {url}: {e}"))),
        };

        let records: Vec<T> = serde_json::from_str(&body)
            .map_err(|e| SourceError::Retrieval(format!("parsing {url}: {e}")))?;
        Ok(scope_to_tenant(records, tenant))
    }
}
