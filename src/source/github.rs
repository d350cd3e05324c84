// GitHub contents API client: one GET per directory, no retry, no pagination.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::model::DirectoryEntry;
use super::traits::ContentsSource;
use crate::config::{BrowserConfig, GITHUB_ACCEPT};
use crate::error::ListingError;

/// Build the HTTP client shared by listing fetches and transfers.
pub fn build_http_client(config: &BrowserConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

    let builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers);
    // No client-wide timeout: listing requests set their own, downloads run unbounded.
    Ok(builder.build()?)
}

pub struct GitHubContentsClient {
    client: Client,
    endpoint: Url,
    timeout: Option<Duration>,
}

impl GitHubContentsClient {
    pub fn new(config: &BrowserConfig, client: Client) -> Result<Self> {
        let endpoint = Url::parse(&config.contents_endpoint)
            .map_err(|e| anyhow!("invalid contents endpoint: {}", e))?;
        if endpoint.cannot_be_a_base() {
            return Err(anyhow!(
                "contents endpoint cannot take a path: {}",
                config.contents_endpoint
            ));
        }
        let timeout = match config.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// `<endpoint>/<path>`, with each path segment percent-encoded.
    /// The empty path maps to the endpoint itself.
    pub fn contents_url(&self, path: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        url
    }
}

#[async_trait]
impl ContentsSource for GitHubContentsClient {
    async fn get_contents(&self, path: &str) -> Result<Vec<DirectoryEntry>, ListingError> {
        let url = self.contents_url(path);
        debug!("listing fetch path={:?} url={}", path, url);

        let mut req = self.client.get(url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ListingError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!("listing fetch failed path={:?} status={}", path, status.as_u16());
            return Err(ListingError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ListingError::Network(e.to_string()))?;
        let entries: Vec<DirectoryEntry> = serde_json::from_slice(&body)?;
        debug!("listing fetched path={:?} entries={}", path, entries.len());
        Ok(entries)
    }
}
