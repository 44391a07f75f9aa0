//! Per-platform spawn rules, computed as a value instead of by rewriting
//! the process environment.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use tracing::warn;

use crate::config::PlatformConfig;

/// Operating-system families with distinct spawn rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// How the child process is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Replacement `PATH` for lookup and for the child. `None` inherits ours.
    pub search_path: Option<OsString>,
    /// Create the child outside the browser's job object (Windows), so
    /// closing the browser leaves the player running.
    pub detach_from_job: bool,
}

impl SpawnConfig {
    pub fn for_host(os: HostOs, inherited_path: Option<&OsStr>, config: &PlatformConfig) -> Self {
        match os {
            HostOs::Windows => Self {
                search_path: None,
                detach_from_job: true,
            },
            HostOs::MacOs => Self {
                search_path: prepend_dirs(&config.macos_search_dirs, inherited_path),
                detach_from_job: false,
            },
            HostOs::Other => Self::default(),
        }
    }
}

fn prepend_dirs(dirs: &[PathBuf], inherited: Option<&OsStr>) -> Option<OsString> {
    if dirs.is_empty() {
        return None;
    }
    let inherited_dirs = inherited.into_iter().flat_map(env::split_paths);
    match env::join_paths(dirs.iter().cloned().chain(inherited_dirs)) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "Cannot build search path, keeping the inherited one");
            None
        }
    }
}
