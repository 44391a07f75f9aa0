use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Top-level host configuration. Every field falls back to its default, so
/// a user file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub player: PlayerConfig,
    pub stream_helper: StreamHelperConfig,
    pub probe: ProbeConfig,
    pub platform: PlatformConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player executable, looked up on the search path at spawn time.
    pub executable: String,
    /// Flag that stops the player from taking over a terminal.
    pub no_ui_flag: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            executable: "mpv".into(),
            no_ui_flag: "--no-terminal".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamHelperConfig {
    /// Helper that fetches live streams and pipes them into the player.
    pub executable: String,
    /// Stream quality argument given to the helper.
    pub quality: String,
    /// Hosts (and their subdomains) whose pages may be live broadcasts.
    pub live_hosts: Vec<String>,
}

impl Default for StreamHelperConfig {
    fn default() -> Self {
        Self {
            executable: "streamlink".into(),
            quality: "best".into(),
            live_hosts: vec!["youtube.com".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
    /// Upper bound on how much of the page body is read.
    pub max_body_bytes: u64,
    pub user_agent: String,
    /// Skips the cookie-consent interstitial.
    pub consent_cookie: String,
    /// Text that marks a page as a live broadcast.
    pub live_marker: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub system_proxy: bool,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_body_bytes: 500_000,
            user_agent: "Mozilla/5.0".into(),
            consent_cookie: "CONSENT=YES+1".into(),
            live_marker: r#""isLive":true"#.into(),
            system_proxy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Prepended to `PATH` on macOS, where native-messaging hosts do not
    /// inherit the login shell's search path.
    pub macos_search_dirs: Vec<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            macos_search_dirs: vec!["/opt/homebrew/bin".into(), "/usr/local/bin".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Also write logs to a file in the data directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "playbridge=info".into(),
            file: false,
        }
    }
}

impl BridgeConfig {
    /// Load config from `explicit` if given, else from the user config
    /// file if it exists, else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, BridgeError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::from_file(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, BridgeError> {
        toml::from_str(toml_str).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory for the optional log file.
    pub fn log_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "playbridge")
    }
}
