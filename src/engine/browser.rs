// Wires the listing source, navigator, presence store and transfer engine together.

use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use super::actions::{FileActions, Launcher};
use super::navigator::Navigator;
use super::presence::PresenceStore;
use super::stats::TransferStats;
use super::transfer::TransferEngine;
use crate::config::BrowserConfig;
use crate::source::github::{build_http_client, GitHubContentsClient};
use crate::source::traits::ContentsSource;

pub struct BrowserEngine {
    pub navigator: Navigator,
    pub transfer: TransferEngine,
    pub presence: Arc<PresenceStore>,
    pub stats: Arc<TransferStats>,
}

impl BrowserEngine {
    /// Build an engine that lists `config.contents_endpoint` over HTTP.
    pub fn from_config(config: &BrowserConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        let source = Arc::new(GitHubContentsClient::new(config, client.clone())?);
        info!(
            "browser engine endpoint={} download_dir={}",
            config.contents_endpoint,
            config.download_dir().display()
        );
        Ok(Self::with_source(config, source, client))
    }

    /// Build an engine over any listing source.
    pub fn with_source(config: &BrowserConfig, source: Arc<dyn ContentsSource>, client: Client) -> Self {
        let presence = Arc::new(PresenceStore::new(&config.download_root));
        let stats = Arc::new(TransferStats::new());
        Self {
            navigator: Navigator::new(source),
            transfer: TransferEngine::new(client, presence.clone(), stats.clone()),
            presence,
            stats,
        }
    }

    pub fn actions(&self, launcher: Arc<dyn Launcher>) -> FileActions {
        FileActions::new(self.presence.clone(), launcher)
    }

    /// Abandon outstanding listing work.
    pub fn close(&self) {
        self.navigator.close();
    }
}
