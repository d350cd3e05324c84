use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Contents endpoint of the repository browsed by default.
pub const DEFAULT_CONTENTS_ENDPOINT: &str =
    "https://api.github.com/repos/Torchman005/QLU-Test-Item-Files/contents";

/// Subdirectory of the download root that holds every cached file.
pub const DOWNLOAD_SUBDIR: &str = "tests";

/// GitHub rejects API requests that carry no User-Agent.
pub const DEFAULT_USER_AGENT: &str = "repo-browser-engine";

/// Media type requested from the contents API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Per-request timeout for listing fetches, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// MIME type assumed when a file name has no recognizable extension.
pub const FALLBACK_MIME: &str = "application/pdf";

/// Top-level configuration for the browser engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Base URL of the contents API; entry paths are appended to it.
    pub contents_endpoint: String,
    /// Public downloads directory. Files land in `<download_root>/tests`.
    pub download_root: PathBuf,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Listing request timeout in seconds. Zero disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            contents_endpoint: DEFAULT_CONTENTS_ENDPOINT.to_string(),
            download_root: PathBuf::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BrowserConfig {
    /// Build a config with defaults for everything but the download root.
    pub fn with_download_root(download_root: impl Into<PathBuf>) -> Self {
        Self {
            download_root: download_root.into(),
            ..Self::default()
        }
    }

    /// Parse a host-provided JSON config. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid browser config")
    }

    /// Directory holding cached files.
    pub fn download_dir(&self) -> PathBuf {
        self.download_root.join(DOWNLOAD_SUBDIR)
    }
}
