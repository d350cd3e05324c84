use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::config::BrowserConfig;
use crate::detect::mime::mime_for;
use crate::engine::actions::{Launcher, ShareTarget};
use crate::engine::browser::BrowserEngine;
use crate::engine::navigator::NavigationState;
use crate::engine::stats::TransferStatsSnapshot;
use crate::error::ActionError;
use crate::source::model::{filter_entries, DirectoryEntry};

static ENGINE: RwLock<Option<Arc<BrowserEngine>>> = RwLock::new(None);

fn engine() -> Result<Arc<BrowserEngine>> {
    ENGINE
        .read()
        .clone()
        .ok_or_else(|| anyhow!("browser engine not initialized"))
}

/// One listing row as the UI renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
    pub download_url: Option<String>,
    pub web_url: String,
    /// A copy is cached locally, so the row offers open and share.
    pub downloaded: bool,
}

/// Render snapshot of the browser screen.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserState {
    pub current_path: String,
    pub entries: Vec<EntryView>,
    pub loading: bool,
    pub error: Option<String>,
    pub can_go_back: bool,
    /// Presence revision the `downloaded` flags were derived at.
    pub revision: u64,
}

/// Result of a download command, for toasts.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub success: bool,
    pub replaced_existing: bool,
    pub bytes: u64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchAction {
    ViewLocal,
    ViewRemote,
    Share,
    ShareChooser,
}

/// What the host should launch. The engine decides; the UI executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub action: LaunchAction,
    pub local_path: Option<String>,
    pub remote_url: Option<String>,
    pub mime: Option<String>,
    pub package: Option<String>,
}

/// Launcher that records the plan instead of launching, given the set of
/// packages the host reports as installed.
struct PlanLauncher {
    installed: Vec<String>,
    plan: Mutex<Option<LaunchPlan>>,
}

impl PlanLauncher {
    fn new(installed: Vec<String>) -> Self {
        Self {
            installed,
            plan: Mutex::new(None),
        }
    }

    fn record(&self, plan: LaunchPlan) {
        *self.plan.lock() = Some(plan);
    }

    fn take(&self) -> Option<LaunchPlan> {
        self.plan.lock().take()
    }
}

impl Launcher for PlanLauncher {
    fn view_local(&self, path: &Path, mime: &str) -> Result<(), ActionError> {
        self.record(LaunchPlan {
            action: LaunchAction::ViewLocal,
            local_path: Some(path.display().to_string()),
            remote_url: None,
            mime: Some(mime.to_string()),
            package: None,
        });
        Ok(())
    }

    fn view_remote(&self, url: &str) -> Result<(), ActionError> {
        self.record(LaunchPlan {
            action: LaunchAction::ViewRemote,
            local_path: None,
            remote_url: Some(url.to_string()),
            mime: None,
            package: None,
        });
        Ok(())
    }

    fn share(&self, path: &Path, mime: &str, package: Option<&str>) -> Result<(), ActionError> {
        if let Some(package) = package {
            if !self.installed.iter().any(|p| p == package) {
                return Err(ActionError::NotInstalled(package.to_string()));
            }
        }
        self.record(LaunchPlan {
            action: if package.is_some() {
                LaunchAction::Share
            } else {
                LaunchAction::ShareChooser
            },
            local_path: Some(path.display().to_string()),
            remote_url: None,
            mime: Some(mime.to_string()),
            package: package.map(str::to_string),
        });
        Ok(())
    }
}

fn entry_view(engine: &BrowserEngine, entry: &DirectoryEntry) -> EntryView {
    EntryView {
        name: entry.name.clone(),
        path: entry.path.clone(),
        size: entry.size,
        is_dir: entry.is_dir(),
        download_url: entry.raw_url.clone(),
        web_url: entry.web_url.clone(),
        downloaded: !entry.is_dir() && engine.presence.exists_sync(&entry.name),
    }
}

fn render(engine: &BrowserEngine, state: &NavigationState, query: &str) -> BrowserState {
    BrowserState {
        current_path: state.current_path.clone(),
        entries: filter_entries(&state.entries, query)
            .into_iter()
            .map(|e| entry_view(engine, e))
            .collect(),
        loading: state.loading,
        error: state.error.clone(),
        can_go_back: state.can_go_back(),
        revision: engine.presence.revision(),
    }
}

/// Rows stat the download directory; keep that off the async workers.
async fn render_current(engine: Arc<BrowserEngine>) -> Result<BrowserState> {
    let view = tokio::task::spawn_blocking(move || {
        let state = engine.navigator.state();
        render(&engine, &state, "")
    })
    .await?;
    Ok(view)
}

/// Initialize the engine from a JSON config and load the root listing.
/// Calling it again replaces the previous engine.
pub async fn init_browser(config_json: String) -> Result<BrowserState> {
    let config = BrowserConfig::from_json(&config_json)?;
    if config.download_root.as_os_str().is_empty() {
        return Err(anyhow!("download_root is required"));
    }
    let engine = Arc::new(BrowserEngine::from_config(&config)?);
    if let Some(old) = ENGINE.write().replace(engine.clone()) {
        old.close();
    }
    info!("browser engine initialized");

    engine.navigator.load_contents("").await;
    render_current(engine).await
}

/// Current render state, optionally narrowed by a search query.
#[flutter_rust_bridge::frb(sync)]
pub fn browser_state(query: String) -> Result<BrowserState> {
    let engine = engine()?;
    let state = engine.navigator.state();
    Ok(render(&engine, &state, &query))
}

pub async fn load_contents(path: String) -> Result<BrowserState> {
    let engine = engine()?;
    engine.navigator.load_contents(&path).await;
    render_current(engine).await
}

/// Open the entry at `path` from the current listing. Files are a no-op.
pub async fn navigate_to(path: String) -> Result<BrowserState> {
    let engine = engine()?;
    let entry = engine
        .navigator
        .state()
        .entries
        .into_iter()
        .find(|e| e.path == path)
        .ok_or_else(|| anyhow!("no entry {:?} in current listing", path))?;
    engine.navigator.navigate_to(&entry).await;
    render_current(engine).await
}

/// Returns `false` when there is nowhere to go back to, so the host can
/// apply its default back behavior.
pub async fn navigate_back() -> bool {
    match engine() {
        Ok(engine) => engine.navigator.navigate_back().await,
        Err(_) => false,
    }
}

pub async fn refresh() -> Result<BrowserState> {
    let engine = engine()?;
    engine.navigator.refresh().await;
    render_current(engine).await
}

#[flutter_rust_bridge::frb(sync)]
pub fn exists(file_name: String) -> bool {
    engine()
        .map(|e| e.presence.exists_sync(&file_name))
        .unwrap_or(false)
}

pub async fn download(url: String, file_name: String) -> bool {
    download_with_report(url, file_name).await.success
}

/// Download, overwriting any cached copy; `replaced_existing` lets the UI warn.
pub async fn redownload(url: String, file_name: String) -> DownloadResult {
    let engine = match engine() {
        Ok(engine) => engine,
        Err(e) => return failed(e.to_string()),
    };
    match engine.transfer.redownload(&url, &file_name).await {
        Ok(report) => DownloadResult {
            success: true,
            replaced_existing: report.replaced_existing,
            bytes: report.bytes,
            message: report
                .replaced_existing
                .then(|| format!("{} already existed and was replaced", file_name)),
        },
        Err(e) => failed(e.to_string()),
    }
}

pub async fn download_with_report(url: String, file_name: String) -> DownloadResult {
    let engine = match engine() {
        Ok(engine) => engine,
        Err(e) => return failed(e.to_string()),
    };
    match engine.transfer.download(&url, &file_name).await {
        Ok(report) => DownloadResult {
            success: true,
            replaced_existing: report.replaced_existing,
            bytes: report.bytes,
            message: None,
        },
        Err(e) => failed(e.to_string()),
    }
}

/// Save `url` to a user-chosen file outside the download directory.
pub async fn save_to_path(url: String, path: String) -> bool {
    let Ok(engine) = engine() else {
        return false;
    };
    engine
        .transfer
        .save_to_path(&url, &PathBuf::from(path))
        .await
        .is_ok()
}

/// Decide how to open `file_name`: the cached copy if present, else `remote_url`.
#[flutter_rust_bridge::frb(sync)]
pub fn open_local_or_remote(file_name: String, remote_url: String) -> Result<LaunchPlan> {
    let engine = engine()?;
    let launcher = Arc::new(PlanLauncher::new(Vec::new()));
    engine
        .actions(launcher.clone())
        .open_local_or_remote(&file_name, &remote_url)?;
    launcher
        .take()
        .ok_or_else(|| anyhow!("no launch planned for {}", file_name))
}

/// Decide how to share a cached file with `target`, given the packages the
/// host has installed. Falls back to the system chooser.
#[flutter_rust_bridge::frb(sync)]
pub fn share_to_target(
    file_name: String,
    target: ShareTarget,
    installed_packages: Vec<String>,
) -> Result<LaunchPlan> {
    let engine = engine()?;
    let launcher = Arc::new(PlanLauncher::new(installed_packages));
    engine
        .actions(launcher.clone())
        .share_to_target(&file_name, target)?;
    launcher
        .take()
        .ok_or_else(|| anyhow!("no share planned for {}", file_name))
}

#[flutter_rust_bridge::frb(sync)]
pub fn mime_type(file_name: String) -> String {
    mime_for(&file_name).to_string()
}

#[flutter_rust_bridge::frb(sync)]
pub fn presence_revision() -> u64 {
    engine().map(|e| e.presence.revision()).unwrap_or(0)
}

#[flutter_rust_bridge::frb(sync)]
pub fn transfer_stats() -> Result<TransferStatsSnapshot> {
    Ok(engine()?.stats.snapshot())
}

/// Shut down the engine and abandon outstanding listing work.
pub fn dispose() {
    if let Some(engine) = ENGINE.write().take() {
        engine.close();
        info!("browser engine disposed");
    }
}

fn failed(message: String) -> DownloadResult {
    warn!("download failed: {}", message);
    DownloadResult {
        success: false,
        replaced_existing: false,
        bytes: 0,
        message: Some(message),
    }
}
