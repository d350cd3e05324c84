// Transfer counters: bytes moved and active/completed/failed transfers.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferStatsSnapshot {
    pub downloaded_bytes: u64,
    pub active_transfers: u32,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Default)]
pub struct TransferStats {
    download_bytes_total: AtomicU64,
    active_transfers: AtomicU32,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl TransferStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_downloaded(&self, bytes: u64) {
        self.download_bytes_total.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Count a transfer as active until the guard is finished or dropped.
    /// A guard dropped without `finish` (the caller stopped awaiting the
    /// transfer) counts as a failure.
    pub fn begin(&self) -> TransferGuard<'_> {
        self.active_transfers.fetch_add(1, Ordering::Relaxed);
        TransferGuard {
            stats: self,
            finished: false,
        }
    }

    fn end(&self, success: bool) {
        self.active_transfers.fetch_sub(1, Ordering::Relaxed);
        if success {
            self.completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> TransferStatsSnapshot {
        TransferStatsSnapshot {
            downloaded_bytes: self.total_downloaded(),
            active_transfers: self.active_transfers.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn total_downloaded(&self) -> u64 {
        self.download_bytes_total.load(Ordering::Relaxed)
    }
}

pub struct TransferGuard<'a> {
    stats: &'a TransferStats,
    finished: bool,
}

impl TransferGuard<'_> {
    pub fn finish(mut self, success: bool) {
        self.finished = true;
        self.stats.end(success);
    }
}

impl Drop for TransferGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.stats.end(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let stats = TransferStats::new();
        stats.record_downloaded(1000);
        stats.record_downloaded(500);
        assert_eq!(stats.total_downloaded(), 1500);

        let ok = stats.begin();
        let bad = stats.begin();
        let _open = stats.begin();
        ok.finish(true);
        bad.finish(false);

        let snap = stats.snapshot();
        assert_eq!(snap.downloaded_bytes, 1500);
        assert_eq!(snap.active_transfers, 1);
        assert_eq!(snap.completed, 1);
        assert_eq!(snap.failed, 1);
    }

    #[test]
    fn test_dropped_guard_counts_as_failed() {
        let stats = TransferStats::new();
        drop(stats.begin());

        let snap = stats.snapshot();
        assert_eq!(snap.active_transfers, 0);
        assert_eq!(snap.completed, 0);
        assert_eq!(snap.failed, 1);
    }
}
