//! Single-shot HTTP fetch of the source payload.
use std::time::Duration;

use tracing::instrument::WithSubscriber;
use tracing::{debug, error, Dispatch};
use url::Url;

use crate::record::{Record, SourceItem};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("building http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("decoding payload: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    fn classify(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e)
        } else if e.is_decode() {
            FetchError::Decode(e)
        } else {
            FetchError::Request(e)
        }
    }
}

pub struct Fetcher {
    client: reqwest::Client,
    dispatch: Dispatch,
}

impl Fetcher {
    /// `timeout` bounds the whole request, body included.
    pub fn new(timeout: Duration, dispatch: Dispatch) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, dispatch })
    }

    /// Returns `None` on any failure; the cause is logged.
    pub async fn fetch(&self, url: &Url) -> Option<Vec<Record>> {
        async {
            match self.try_fetch(url).await {
                Ok(records) => {
                    debug!(url = %url, count = records.len(), "fetched records");
                    Some(records)
                }
                Err(e) => {
                    error!("Error fetching data: {e}");
                    None
                }
            }
        }
        .with_subscriber(self.dispatch.clone())
        .await
    }

    pub async fn try_fetch(&self, url: &Url) -> Result<Vec<Record>, FetchError> {
        debug!(url = %url, "HTTP GET start");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let items: Vec<SourceItem> = response.json().await.map_err(FetchError::classify)?;
        Ok(items.into_iter().map(Record::from).collect())
    }
}
