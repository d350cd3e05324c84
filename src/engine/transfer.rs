// Streaming downloads from a remote URL into the download directory or a caller-chosen sink.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::presence::PresenceStore;
use super::stats::TransferStats;
use crate::error::TransferError;

/// Outcome of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Where the bytes landed, when the destination is a path.
    pub destination: Option<PathBuf>,
    pub bytes: u64,
    /// A file already sat at the destination and was overwritten.
    pub replaced_existing: bool,
}

pub struct TransferEngine {
    client: Client,
    presence: Arc<PresenceStore>,
    stats: Arc<TransferStats>,
}

impl TransferEngine {
    pub fn new(client: Client, presence: Arc<PresenceStore>, stats: Arc<TransferStats>) -> Self {
        Self {
            client,
            presence,
            stats,
        }
    }

    pub fn presence(&self) -> &Arc<PresenceStore> {
        &self.presence
    }

    pub fn stats(&self) -> &Arc<TransferStats> {
        &self.stats
    }

    /// Download `url` to `<download_root>/tests/<file_name>`.
    ///
    /// An existing file is truncated and replaced in place. There is no
    /// temp-file swap: a failure mid-copy leaves a truncated file behind.
    pub async fn download(&self, url: &str, file_name: &str) -> Result<TransferReport, TransferError> {
        validate_file_name(file_name)?;
        let dest = self.presence.path_for(file_name);
        let replaced_existing = self.presence.exists(file_name).await;

        let guard = self.stats.begin();
        let result = self.download_to(url, &dest).await;
        guard.finish(result.is_ok());

        match result {
            Ok(bytes) => {
                let revision = self.presence.bump_revision();
                info!(
                    "downloaded {} ({} bytes) -> {} revision={}",
                    file_name,
                    bytes,
                    dest.display(),
                    revision
                );
                Ok(TransferReport {
                    destination: Some(dest),
                    bytes,
                    replaced_existing,
                })
            }
            Err(e) => {
                warn!("download of {} from {} failed: {}", file_name, url, e);
                Err(e)
            }
        }
    }

    /// Download again, overwriting any cached copy. The report says whether
    /// a previous copy was replaced so the caller can warn about it.
    pub async fn redownload(&self, url: &str, file_name: &str) -> Result<TransferReport, TransferError> {
        if self.presence.exists(file_name).await {
            info!("{} already exists locally, overwriting", file_name);
        }
        self.download(url, file_name).await
    }

    /// Download `url` into an arbitrary local file chosen by the user.
    pub async fn save_to_path(&self, url: &str, path: &Path) -> Result<TransferReport, TransferError> {
        let replaced_existing = fs::try_exists(path).await.unwrap_or(false);

        let guard = self.stats.begin();
        let result = self.download_to(url, path).await;
        guard.finish(result.is_ok());

        let bytes = result.inspect_err(|e| warn!("save of {} to {} failed: {}", url, path.display(), e))?;
        Ok(TransferReport {
            destination: Some(path.to_path_buf()),
            bytes,
            replaced_existing,
        })
    }

    /// Stream `url` into any async writer, e.g. a platform content handle.
    pub async fn save_to_writer<W>(&self, url: &str, writer: &mut W) -> Result<TransferReport, TransferError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let guard = self.stats.begin();
        let result = self.stream_into(url, writer).await;
        guard.finish(result.is_ok());

        let bytes = result.inspect_err(|e| warn!("save of {} to writer failed: {}", url, e))?;
        Ok(TransferReport {
            destination: None,
            bytes,
            replaced_existing: false,
        })
    }

    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        // Connect before truncating so a dead link leaves the old copy intact.
        let resp = self.open(url).await?;
        let mut file = File::create(dest).await?;
        copy_body(resp, &mut file, &self.stats).await
    }

    async fn stream_into<W>(&self, url: &str, writer: &mut W) -> Result<u64, TransferError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let resp = self.open(url).await?;
        copy_body(resp, writer, &self.stats).await
    }

    async fn open(&self, url: &str) -> Result<reqwest::Response, TransferError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        let status = resp.status();
        debug!("transfer open url={} status={}", url, status.as_u16());
        if !status.is_success() {
            return Err(TransferError::Http {
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

async fn copy_body<W>(
    mut resp: reqwest::Response,
    writer: &mut W,
    stats: &TransferStats,
) -> Result<u64, TransferError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut written = 0u64;
    while let Some(chunk) = resp
        .chunk()
        .await
        .map_err(|e| TransferError::Network(e.to_string()))?
    {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
        stats.record_downloaded(chunk.len() as u64);
    }
    writer.flush().await?;
    Ok(written)
}

/// Cached files live in one flat directory; names must not leave it.
fn validate_file_name(file_name: &str) -> Result<(), TransferError> {
    let bad = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\\');
    if bad {
        return Err(TransferError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid file name: {:?}", file_name),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("exam.pdf").is_ok());
        assert!(validate_file_name("期末 试卷.docx").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("../escape.pdf").is_err());
        assert!(validate_file_name("a\\b.pdf").is_err());
    }
}
