//! Daemon installation discovery.
//!
//! The daemon is usable when its executable is on `PATH` and its config file
//! names a synchronized folder (`dir`) and a credential file (`auth`) that
//! both exist:
//!
//! ```text
//! proxy="no"
//! auth="/home/user/.config/yandex-disk/passwd"
//! dir="/home/user/Yandex.Disk"
//! ```
//!
//! As in the rest of the workspace, functions ending in `_at` take their
//! environment (search path, home directory) explicitly for tests.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{io_err, SetupError};

/// Name of the daemon executable.
pub const DAEMON_EXE: &str = "yandex-disk";

/// Config file location relative to the home directory.
pub const DEFAULT_CONFIG: &str = ".config/yandex-disk/config.cfg";

/// A validated daemon installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSetup {
    pub exe: PathBuf,
    pub config: PathBuf,
    /// Folder kept in sync by the daemon.
    pub sync_dir: PathBuf,
    pub auth: PathBuf,
}

/// Parsed `key="value"` daemon config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonConfig {
    entries: BTreeMap<String, String>,
}

impl DaemonConfig {
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), unquote(value.trim()).to_string()))
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Synchronized folder (`dir`).
    pub fn sync_dir(&self) -> Option<PathBuf> {
        self.path_entry("dir")
    }

    /// Credential file (`auth`).
    pub fn auth(&self) -> Option<PathBuf> {
        self.path_entry("auth")
    }

    fn path_entry(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// `<home>/.config/yandex-disk/config.cfg` — pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(DEFAULT_CONFIG)
}

/// `default_config_path_at` using `dirs::home_dir()`.
pub fn default_config_path() -> Result<PathBuf, SetupError> {
    dirs::home_dir()
        .map(|home| default_config_path_at(&home))
        .ok_or(SetupError::HomeNotFound)
}

/// Validate the daemon installation described by `config`, searching the
/// process `PATH` for the executable.
pub fn check_daemon(config: &Path) -> Result<DaemonSetup, SetupError> {
    check_daemon_at(config, std::env::var_os("PATH").as_deref())
}

/// Validate the daemon installation with an explicit executable search path.
pub fn check_daemon_at(config: &Path, search_path: Option<&OsStr>) -> Result<DaemonSetup, SetupError> {
    let exe = find_executable(DAEMON_EXE, search_path)?;
    let parsed = DaemonConfig::load(config)?;

    let not_configured = |reason: String| SetupError::NotConfigured {
        config: config.to_path_buf(),
        reason,
    };
    let sync_dir = parsed
        .sync_dir()
        .ok_or_else(|| not_configured("no `dir` entry".to_string()))?;
    let auth = parsed
        .auth()
        .ok_or_else(|| not_configured("no `auth` entry".to_string()))?;
    for (what, path) in [("synchronized folder", &sync_dir), ("auth file", &auth)] {
        if !path.exists() {
            return Err(not_configured(format!("{what} {} does not exist", path.display())));
        }
    }

    Ok(DaemonSetup {
        exe,
        config: config.to_path_buf(),
        sync_dir,
        auth,
    })
}

/// Resolve `name` against the directories of `search_path`.
pub fn find_executable(name: &str, search_path: Option<&OsStr>) -> Result<PathBuf, SetupError> {
    let not_installed = || SetupError::NotInstalled {
        exe: name.to_string(),
    };
    let search_path: OsString = search_path.map(OsStr::to_os_string).ok_or_else(not_installed)?;
    std::env::split_paths(&search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(not_installed)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
