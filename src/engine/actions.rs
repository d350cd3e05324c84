// Open and share commands over cached files, delegating to the platform launcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::presence::PresenceStore;
use crate::detect::mime::mime_for_file;
use crate::error::ActionError;

/// Platform seam for viewing and sharing files (intents, share sheets).
pub trait Launcher: Send + Sync {
    /// Open a local file in an external viewer.
    fn view_local(&self, path: &Path, mime: &str) -> Result<(), ActionError>;

    /// Open a remote URL, e.g. in the browser.
    fn view_remote(&self, url: &str) -> Result<(), ActionError>;

    /// Share a local file with `package`, or through the system chooser when
    /// `package` is `None`. Returns `ActionError::NotInstalled` when the
    /// target app is missing.
    fn share(&self, path: &Path, mime: &str, package: Option<&str>) -> Result<(), ActionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Qq,
    WeChat,
}

impl ShareTarget {
    pub fn package_name(self) -> &'static str {
        match self {
            ShareTarget::Qq => "com.tencent.mobileqq",
            ShareTarget::WeChat => "com.tencent.mm",
        }
    }
}

/// Where an open request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    Local(PathBuf),
    Remote(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Handed straight to the requested app.
    Targeted(ShareTarget),
    /// The app was missing; the system chooser was shown instead.
    Chooser,
}

pub struct FileActions {
    presence: Arc<PresenceStore>,
    launcher: Arc<dyn Launcher>,
}

impl FileActions {
    pub fn new(presence: Arc<PresenceStore>, launcher: Arc<dyn Launcher>) -> Self {
        Self { presence, launcher }
    }

    /// Open the cached copy if there is one, otherwise (or if the local
    /// viewer fails) open `remote_url`.
    pub fn open_local_or_remote(&self, file_name: &str, remote_url: &str) -> Result<OpenTarget, ActionError> {
        let path = self.presence.path_for(file_name);
        if self.presence.exists_sync(file_name) {
            let mime = mime_for_file(&path);
            match self.launcher.view_local(&path, mime) {
                Ok(()) => {
                    debug!("opened {} as {}", path.display(), mime);
                    return Ok(OpenTarget::Local(path));
                }
                Err(e) => warn!("cannot open {} locally, trying remote: {}", path.display(), e),
            }
        }

        if remote_url.is_empty() {
            return Err(ActionError::NotFound(path));
        }
        self.launcher.view_remote(remote_url)?;
        Ok(OpenTarget::Remote(remote_url.to_string()))
    }

    /// Share a cached file with `target`, falling back to the system chooser
    /// when that app is not installed.
    pub fn share_to_target(&self, file_name: &str, target: ShareTarget) -> Result<ShareOutcome, ActionError> {
        let path = self.presence.path_for(file_name);
        if !self.presence.exists_sync(file_name) {
            return Err(ActionError::NotFound(path));
        }
        let mime = mime_for_file(&path);

        match self.launcher.share(&path, mime, Some(target.package_name())) {
            Ok(()) => Ok(ShareOutcome::Targeted(target)),
            Err(ActionError::NotInstalled(package)) => {
                info!("{} not installed, using system chooser", package);
                self.launcher.share(&path, mime, None)?;
                Ok(ShareOutcome::Chooser)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingLauncher {
        installed: Vec<&'static str>,
        viewer_broken: bool,
        calls: Mutex<Vec<String>>,
    }

    impl Launcher for RecordingLauncher {
        fn view_local(&self, path: &Path, mime: &str) -> Result<(), ActionError> {
            if self.viewer_broken {
                return Err(ActionError::Platform("no viewer".into()));
            }
            self.calls.lock().push(format!("view_local {} {}", path.display(), mime));
            Ok(())
        }

        fn view_remote(&self, url: &str) -> Result<(), ActionError> {
            self.calls.lock().push(format!("view_remote {}", url));
            Ok(())
        }

        fn share(&self, _path: &Path, mime: &str, package: Option<&str>) -> Result<(), ActionError> {
            match package {
                Some(p) if !self.installed.contains(&p) => Err(ActionError::NotInstalled(p.to_string())),
                Some(p) => {
                    self.calls.lock().push(format!("share {} {}", p, mime));
                    Ok(())
                }
                None => {
                    self.calls.lock().push(format!("chooser {}", mime));
                    Ok(())
                }
            }
        }
    }

    fn setup(launcher: RecordingLauncher) -> (tempfile::TempDir, Arc<PresenceStore>, Arc<RecordingLauncher>, FileActions) {
        let root = tempfile::tempdir().unwrap();
        let presence = Arc::new(PresenceStore::new(root.path()));
        let launcher = Arc::new(launcher);
        let actions = FileActions::new(presence.clone(), launcher.clone());
        (root, presence, launcher, actions)
    }

    fn cache_file(presence: &PresenceStore, name: &str) {
        std::fs::create_dir_all(presence.dir()).unwrap();
        std::fs::write(presence.path_for(name), b"%PDF-1.4").unwrap();
    }

    #[test]
    fn test_open_prefers_local_copy() {
        let (_root, presence, launcher, actions) = setup(RecordingLauncher::default());
        cache_file(&presence, "exam.pdf");

        let target = actions.open_local_or_remote("exam.pdf", "http://x/exam.pdf").unwrap();
        assert_eq!(target, OpenTarget::Local(presence.path_for("exam.pdf")));
        assert!(launcher.calls.lock()[0].starts_with("view_local"));
    }

    #[test]
    fn test_open_falls_back_to_remote() {
        let (_root, _presence, launcher, actions) = setup(RecordingLauncher::default());
        let target = actions.open_local_or_remote("exam.pdf", "http://x/exam.pdf").unwrap();
        assert_eq!(target, OpenTarget::Remote("http://x/exam.pdf".into()));
        assert_eq!(*launcher.calls.lock(), vec!["view_remote http://x/exam.pdf".to_string()]);
    }

    #[test]
    fn test_open_falls_back_when_viewer_fails() {
        let (_root, presence, _launcher, actions) = setup(RecordingLauncher {
            viewer_broken: true,
            ..Default::default()
        });
        cache_file(&presence, "exam.pdf");
        let target = actions.open_local_or_remote("exam.pdf", "http://x/exam.pdf").unwrap();
        assert_eq!(target, OpenTarget::Remote("http://x/exam.pdf".into()));
    }

    #[test]
    fn test_open_without_local_or_remote_is_not_found() {
        let (_root, _presence, _launcher, actions) = setup(RecordingLauncher::default());
        assert!(matches!(
            actions.open_local_or_remote("exam.pdf", ""),
            Err(ActionError::NotFound(_))
        ));
    }

    #[test]
    fn test_share_missing_file_is_not_found() {
        let (_root, _presence, launcher, actions) = setup(RecordingLauncher::default());
        assert!(matches!(
            actions.share_to_target("exam.pdf", ShareTarget::Qq),
            Err(ActionError::NotFound(_))
        ));
        assert!(launcher.calls.lock().is_empty());
    }

    #[test]
    fn test_share_to_installed_app() {
        let (_root, presence, launcher, actions) = setup(RecordingLauncher {
            installed: vec!["com.tencent.mm"],
            ..Default::default()
        });
        cache_file(&presence, "exam.pdf");
        let outcome = actions.share_to_target("exam.pdf", ShareTarget::WeChat).unwrap();
        assert_eq!(outcome, ShareOutcome::Targeted(ShareTarget::WeChat));
        assert_eq!(*launcher.calls.lock(), vec!["share com.tencent.mm application/pdf".to_string()]);
    }

    #[test]
    fn test_share_falls_back_to_chooser() {
        let (_root, presence, launcher, actions) = setup(RecordingLauncher::default());
        cache_file(&presence, "exam.pdf");
        let outcome = actions.share_to_target("exam.pdf", ShareTarget::Qq).unwrap();
        assert_eq!(outcome, ShareOutcome::Chooser);
        assert_eq!(*launcher.calls.lock(), vec!["chooser application/pdf".to_string()]);
    }
}
