//! Command boundary to the `yandex-disk` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use ydmon_core::DaemonSetup;

use crate::error::{io_err, MonitorError};

/// Language the status query is run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// Empty environment, so the daemon prints the English keys the parser knows.
    Neutral,
    /// The caller's environment, for showing the output to a person.
    User,
}

/// Operations the monitor needs from the sync daemon.
///
/// Implementations are called from the caller's thread (start/stop/output)
/// and from the blocking pool (sampling), so they must be `Send + Sync`.
pub trait Daemon: Send + Sync + 'static {
    /// Raw status text. Any failure to run the query yields an empty string,
    /// which means "not running".
    fn status(&self, locale: Locale) -> String;

    /// Start the daemon, returning its console output.
    fn start(&self) -> Result<String, MonitorError>;

    /// Stop the daemon, returning its console output.
    fn stop(&self) -> Result<String, MonitorError>;
}

/// The real daemon, driven through its CLI.
#[derive(Debug, Clone)]
pub struct YandexDisk {
    exe: PathBuf,
    config: PathBuf,
}

impl YandexDisk {
    pub fn new(exe: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            config: config.into(),
        }
    }

    pub fn from_setup(setup: &DaemonSetup) -> Self {
        Self::new(&setup.exe, &setup.config)
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    fn command(&self, action: &str) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg(action).arg("-c").arg(&self.config);
        cmd
    }

    fn run(&self, action: &str) -> Result<String, MonitorError> {
        let output = self
            .command(action)
            .output()
            .map_err(|e| io_err(&self.exe, e))?;
        if !output.status.success() {
            return Err(MonitorError::Command {
                command: format!("{} {action}", self.exe.display()),
                detail: failure_detail(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Daemon for YandexDisk {
    fn status(&self, locale: Locale) -> String {
        let mut cmd = self.command("status");
        if locale == Locale::Neutral {
            cmd.env_clear();
        }
        match cmd.output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Ok(output) => {
                tracing::debug!(detail = %failure_detail(&output), "daemon status query failed");
                String::new()
            }
            Err(err) => {
                tracing::debug!(exe = %self.exe.display(), error = %err, "daemon status query failed");
                String::new()
            }
        }
    }

    fn start(&self) -> Result<String, MonitorError> {
        self.run("start")
    }

    fn stop(&self) -> Result<String, MonitorError> {
        self.run("stop")
    }
}

fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        format!("{} ({stderr})", output.status)
    }
}

/// Start the daemon unless it already reports a status.
///
/// Returns `true` when a start command was issued.
pub fn ensure_started(daemon: &dyn Daemon) -> Result<bool, MonitorError> {
    if !daemon.status(Locale::User).is_empty() {
        tracing::debug!("daemon already started");
        return Ok(false);
    }
    let out = daemon.start()?;
    tracing::debug!(output = %out.trim_end(), "daemon start");
    Ok(true)
}

/// Stop the daemon unless it already reports nothing.
///
/// Returns `true` when a stop command was issued.
pub fn ensure_stopped(daemon: &dyn Daemon) -> Result<bool, MonitorError> {
    if daemon.status(Locale::User).is_empty() {
        tracing::debug!("daemon already stopped");
        return Ok(false);
    }
    let out = daemon.stop()?;
    tracing::debug!(output = %out.trim_end(), "daemon stop");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Toggle {
        status: Mutex<String>,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl Daemon for Toggle {
        fn status(&self, _locale: Locale) -> String {
            self.status.lock().unwrap().clone()
        }

        fn start(&self) -> Result<String, MonitorError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.status.lock().unwrap() = "Synchronization core status: idle\n".to_string();
            Ok("Starting daemon process...Done\n".to_string())
        }

        fn stop(&self) -> Result<String, MonitorError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.status.lock().unwrap().clear();
            Ok("Daemon stopped.\n".to_string())
        }
    }

    #[test]
    fn start_is_skipped_when_running() {
        let daemon = Toggle::default();
        assert!(ensure_started(&daemon).expect("first start"));
        assert!(!ensure_started(&daemon).expect("second start"));
        assert_eq!(daemon.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_is_skipped_when_stopped() {
        let daemon = Toggle::default();
        assert!(!ensure_stopped(&daemon).expect("stop while stopped"));
        ensure_started(&daemon).expect("start");
        assert!(ensure_stopped(&daemon).expect("stop"));
        assert_eq!(daemon.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_executable_reads_as_not_running() {
        let daemon = YandexDisk::new("/nonexistent/yandex-disk", "/nonexistent/config.cfg");
        assert_eq!(daemon.status(Locale::Neutral), "");
        assert_eq!(daemon.status(Locale::User), "");
    }

    #[test]
    fn missing_executable_fails_start_with_path() {
        let daemon = YandexDisk::new("/nonexistent/yandex-disk", "/nonexistent/config.cfg");
        let err = daemon.start().unwrap_err();
        assert!(matches!(err, MonitorError::Io { .. }), "got: {err}");
        assert!(err.to_string().contains("/nonexistent/yandex-disk"));
    }
}
