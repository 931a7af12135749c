//! JSON event feed -- the packaged EventSource shim.
//!
//! Fetches a JSON array of event records from a configured URL. Any transport
//! or decode failure yields `None`, which callers must distinguish from an
//! empty list.

use async_trait::async_trait;
use resetbell_core::{EventRecord, EventSource};

pub struct JsonFeedSource {
    client: reqwest::Client,
    url: String,
}

impl JsonFeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl EventSource for JsonFeedSource {
    async fn fetch_current_events(&self) -> Option<Vec<EventRecord>> {
        let resp = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "event feed request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "event feed returned an error status");
            return None;
        }
        match resp.json::<Vec<EventRecord>>().await {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(error = %e, "event feed returned malformed data");
                None
            }
        }
    }
}
