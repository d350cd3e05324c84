// Typed failures for listing fetches, transfers and file actions.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while fetching a directory listing.
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("malformed listing: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ListingError {
    fn from(e: serde_json::Error) -> Self {
        ListingError::Decode(e.to_string())
    }
}

/// Failure while copying a remote file to local storage.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while opening or sharing a cached file.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("app not installed: {0}")]
    NotInstalled(String),

    #[error("platform error: {0}")]
    Platform(String),
}
