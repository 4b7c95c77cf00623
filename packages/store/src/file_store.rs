//! # Filesystem-backed session store
//!
//! [`FileStore`] is a [`SessionStore`] implementation that persists the
//! session as a TOML file, so a login survives process restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! └── session.toml       # access token, refresh token, cached profile
//! ```
//!
//! ## Surface namespaces
//!
//! Each application surface (the user portal, the admin panel) keeps its own
//! base directory via [`FileStore::scoped`], so logging in on one surface
//! never authenticates another. [`FileStore::delete_scoped`] removes one
//! surface's state without touching the rest.
//!
//! ## Platform data directories
//!
//! Use [`session_dir`] to obtain a platform-appropriate base:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/visagateway/` |
//! | Linux | `~/.local/share/visagateway/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\visagateway\` |

use std::path::{Path, PathBuf};

use crate::models::Session;
use crate::SessionStore;

const SESSION_FILE: &str = "session.toml";

/// Resolve the default base directory for session state.
pub fn session_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("visagateway")
}

/// Filesystem-backed SessionStore.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Store scoped to one application surface, e.g. `"portal"` or `"admin"`.
    pub fn scoped(base: &Path, surface: &str) -> Self {
        Self::new(base.join(surface))
    }

    /// Delete one surface's state directory (`<base>/<surface>/`).
    pub fn delete_scoped(base: &Path, surface: &str) {
        let _ = std::fs::remove_dir_all(base.join(surface));
    }

    fn session_path(&self) -> PathBuf {
        self.base.join(SESSION_FILE)
    }
}

impl SessionStore for FileStore {
    async fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(self.session_path()).ok()?;
        match toml::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("discarding unreadable session file: {e}");
                None
            }
        }
    }

    async fn save(&self, session: &Session) {
        let Ok(content) = toml::to_string_pretty(session) else {
            return;
        };
        let _ = std::fs::create_dir_all(&self.base);
        let _ = std::fs::write(self.session_path(), content);
    }

    async fn clear(&self) {
        let _ = std::fs::remove_file(self.session_path());
    }
}
