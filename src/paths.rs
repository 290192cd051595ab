//! Default locations of the tool configuration and saved documents.
//!
//! - **Portable mode**: a `.portable` marker next to the executable keeps
//!   everything in the executable's directory.
//! - **Installed mode** (default): the platform config directory
//!   (`%APPDATA%\Tweaker Config`, `~/.config/tweaker-config`, ...).
//!
//! Debug builds started from a directory containing `tweaker.yaml` use that
//! directory, which is what `cargo run` from the project root wants.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory name in installed mode
#[cfg(windows)]
const APP_NAME: &str = "Tweaker Config";
#[cfg(not(windows))]
const APP_NAME: &str = "tweaker-config";

const CONFIG_FILE: &str = "tweaker.yaml";
const DOCUMENT_FILE: &str = "tweaker.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Tool configuration (YAML)
    pub config: PathBuf,
    /// Where documents are saved when no path is given
    pub documents_dir: PathBuf,
    pub is_portable: bool,
}

impl AppPaths {
    /// Resolve paths for the current environment
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(debug_assertions)]
        {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if cwd.join(CONFIG_FILE).exists() {
                return Self::portable(&cwd);
            }
        }

        if exe_dir.join(".portable").exists() {
            return Self::portable(&exe_dir);
        }

        let base = dirs::config_dir().unwrap_or(exe_dir).join(APP_NAME);
        Self {
            config: base.join(CONFIG_FILE),
            documents_dir: base.join("documents"),
            is_portable: false,
        }
    }

    fn portable(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            documents_dir: dir.to_path_buf(),
            is_portable: true,
        }
    }

    /// Document path used when the user does not name one
    pub fn default_document(&self) -> PathBuf {
        self.documents_dir.join(DOCUMENT_FILE)
    }

    /// Resolve a user-supplied document path; bare file names land in `documents_dir`
    pub fn document(&self, name: Option<&Path>) -> PathBuf {
        match name {
            None => self.default_document(),
            Some(p) if p.components().count() == 1 && !p.is_absolute() => {
                self.documents_dir.join(p)
            }
            Some(p) => p.to_path_buf(),
        }
    }

    /// Whether `path` lands directly in `documents_dir`
    pub fn is_in_documents(&self, path: &Path) -> bool {
        path.parent() == Some(self.documents_dir.as_path())
    }

    /// Create the documents directory if needed
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if !self.documents_dir.exists() {
            debug!("Creating documents directory: {}", self.documents_dir.display());
            std::fs::create_dir_all(&self.documents_dir).with_context(|| {
                format!("Failed to create {}", self.documents_dir.display())
            })?;
        }
        Ok(())
    }
}
