use std::future::Future;
use std::pin::Pin;

use larder_sites::{DataFetcher, SiteError};

/// [`DataFetcher`] over HTTPS. One attempt per call, no auth, no pagination.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataFetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = larder_sites::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| SiteError::DataUnavailable(format!("request to {url} failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SiteError::DataUnavailable(format!("{url} returned {status}")));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| SiteError::DataUnavailable(format!("reading {url} failed: {e}")))?;

            Ok(body.to_vec())
        })
    }
}
