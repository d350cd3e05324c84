// Navigation controller: current path, back-stack and listing state over a ContentsSource.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::source::model::DirectoryEntry;
use crate::source::traits::ContentsSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    /// Path of the listing in `entries`. Empty string is the root.
    pub current_path: String,
    /// Back-stack of previously visited paths, most recent last.
    pub history: Vec<String>,
    /// Last successfully loaded listing, in remote order.
    pub entries: Vec<DirectoryEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub phase: LoadPhase,
    /// Stamp of the most recently issued load.
    pub generation: u64,
}

impl NavigationState {
    /// Whether a back action has somewhere to go.
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_dir())
    }

    pub fn files(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| !e.is_dir())
    }
}

/// How a load request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The listing was committed to state.
    Loaded,
    /// The fetch failed; the error is in state and the old entries stay.
    Failed,
    /// A newer load was issued first; this result was discarded.
    Superseded,
    /// The navigator was closed while the fetch was in flight.
    Abandoned,
    /// The entry was a file; nothing to load.
    Ignored,
}

/// How a load moves through the back-stack.
///
/// A descend pushes the path it leaves when issued, and a back pops when
/// issued, so a back pressed while a folder is still loading returns to the
/// page it left. A back whose load fails or is abandoned puts its path back.
#[derive(Debug, Clone)]
enum HistoryEdit {
    None,
    Descend,
    Back(String),
}

impl HistoryEdit {
    fn undo(&self, s: &mut NavigationState) {
        if let HistoryEdit::Back(previous) = self {
            s.history.push(previous.clone());
        }
    }
}

pub struct Navigator {
    source: Arc<dyn ContentsSource>,
    state: watch::Sender<NavigationState>,
    shutdown: CancellationToken,
}

impl Navigator {
    pub fn new(source: Arc<dyn ContentsSource>) -> Self {
        let (state, _) = watch::channel(NavigationState::default());
        Self {
            source,
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    /// Receive a fresh snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    /// Fetch `path` and make it the current listing.
    pub async fn load_contents(&self, path: &str) -> LoadOutcome {
        if self.shutdown.is_cancelled() {
            return LoadOutcome::Abandoned;
        }
        let generation = self.issue();
        self.run(path, generation, HistoryEdit::None).await
    }

    /// Descend into a directory entry. Files are ignored here; opening and
    /// downloading them goes through the transfer engine.
    pub async fn navigate_to(&self, entry: &DirectoryEntry) -> LoadOutcome {
        if !entry.is_dir() {
            debug!("navigate_to ignored for file {}", entry.path);
            return LoadOutcome::Ignored;
        }
        if self.shutdown.is_cancelled() {
            return LoadOutcome::Abandoned;
        }
        let mut generation = 0;
        self.state.send_modify(|s| {
            // A descend issued before the previous one committed leaves from
            // the same page; record it once.
            if s.current_path != entry.path && s.history.last() != Some(&s.current_path) {
                s.history.push(s.current_path.clone());
            }
            begin_load(s);
            generation = s.generation;
        });
        self.run(&entry.path, generation, HistoryEdit::Descend).await
    }

    /// Go back one level. Returns `false` when the history is empty so the
    /// caller can fall through to its default back behavior.
    pub async fn navigate_back(&self) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        let mut issued = None;
        self.state.send_if_modified(|s| {
            let Some(previous) = s.history.pop() else {
                return false;
            };
            begin_load(s);
            issued = Some((previous, s.generation));
            true
        });

        let Some((previous, generation)) = issued else {
            debug!("navigate_back with empty history");
            return false;
        };
        self.run(&previous, generation, HistoryEdit::Back(previous.clone()))
            .await;
        true
    }

    /// Reload the current path, leaving the history alone.
    pub async fn refresh(&self) -> LoadOutcome {
        let path = self.state.borrow().current_path.clone();
        self.load_contents(&path).await
    }

    /// Abandon in-flight loads and refuse new ones.
    pub fn close(&self) {
        self.shutdown.cancel();
        self.state.send_if_modified(|s| {
            if !s.loading {
                return false;
            }
            s.loading = false;
            s.phase = LoadPhase::Idle;
            true
        });
    }

    /// Stamp a new load; only the latest stamp may commit.
    fn issue(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            begin_load(s);
            generation = s.generation;
        });
        generation
    }

    async fn run(&self, path: &str, generation: u64, edit: HistoryEdit) -> LoadOutcome {
        let result = tokio::select! {
            result = self.source.get_contents(path) => result,
            _ = self.shutdown.cancelled() => {
                debug!("load {} generation={} abandoned", path, generation);
                self.state.send_if_modified(|s| {
                    if s.generation != generation {
                        return false;
                    }
                    edit.undo(s);
                    settle_history(s);
                    true
                });
                return LoadOutcome::Abandoned;
            }
        };

        let mut outcome = LoadOutcome::Superseded;
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }

            s.loading = false;
            match &result {
                Ok(entries) => {
                    s.entries = entries.clone();
                    s.current_path = path.to_string();
                    s.error = None;
                    s.phase = LoadPhase::Loaded;
                    outcome = LoadOutcome::Loaded;
                }
                Err(e) => {
                    s.error = Some(format!("Error: {}", e));
                    s.phase = LoadPhase::Error;
                    edit.undo(s);
                    outcome = LoadOutcome::Failed;
                }
            }
            settle_history(s);
            true
        });

        match (&outcome, &result) {
            (LoadOutcome::Loaded, Ok(entries)) => {
                info!("loaded {:?}: {} entries", path, entries.len());
            }
            (LoadOutcome::Failed, Err(e)) => {
                warn!("load {:?} failed: {}", path, e);
            }
            _ => {
                debug!("load {:?} generation={} superseded", path, generation);
            }
        }
        outcome
    }
}

/// Once the latest load settles, history must not end with the page on
/// screen. A descend that never landed leaves such an entry behind.
fn settle_history(s: &mut NavigationState) {
    if s.history.last() == Some(&s.current_path) {
        s.history.pop();
    }
}

fn begin_load(s: &mut NavigationState) {
    s.generation += 1;
    s.loading = true;
    s.error = None;
    s.phase = LoadPhase::Loading;
}
