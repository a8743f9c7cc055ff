use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use ydmon_core::{check_daemon, Snapshot};

use crate::daemon::{ensure_started, ensure_stopped, Daemon, Locale, YandexDisk};
use crate::error::MonitorError;
use crate::paths::{activity_log_path, BUSY_INTERVAL, FIRST_TICK, POLL_CEILING, TIME_UNIT};
use crate::schedule::PollSchedule;
use crate::watch::{ActivityWatch, WatchEvents};

/// Receiving end of the change stream. Holds at most one undelivered snapshot;
/// the event loop waits for the consumer before publishing the next one.
pub type Changes = mpsc::Receiver<Snapshot>;

type ShutdownRequest = oneshot::Sender<()>;

/// Timing of the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Length of one polling interval unit.
    pub time_unit: Duration,
    /// Delay before the first sample.
    pub first_tick: Duration,
    /// Interval, in units, while the daemon is busy.
    pub busy_interval: u32,
    /// Interval, in units, at which the poll timer stops being rearmed.
    pub ceiling: u32,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            time_unit: TIME_UNIT,
            first_tick: FIRST_TICK,
            busy_interval: BUSY_INTERVAL,
            ceiling: POLL_CEILING,
        }
    }
}

/// Handle to a running status monitor for one daemon.
///
/// Created inside a tokio runtime; the event loop runs as a task on that
/// runtime until [`Monitor::close`] is called, the `Monitor` is dropped, or
/// the activity-log watch reports an error. In every case the [`Changes`]
/// stream ends.
pub struct Monitor {
    sync_dir: PathBuf,
    daemon: Arc<dyn Daemon>,
    watch: Arc<ActivityWatch>,
    shutdown_tx: Option<mpsc::Sender<ShutdownRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Validate the daemon installation described by `config` and start monitoring it.
    pub fn new(config: &Path) -> Result<(Self, Changes), MonitorError> {
        let setup = check_daemon(config)?;
        tracing::debug!(exe = %setup.exe.display(), "yandex-disk executable");
        let daemon = Arc::new(YandexDisk::from_setup(&setup));
        Self::with_daemon(setup.sync_dir, daemon, MonitorOptions::default())
    }

    /// Start monitoring `daemon`, whose synchronized folder is `sync_dir`.
    pub fn with_daemon(
        sync_dir: PathBuf,
        daemon: Arc<dyn Daemon>,
        options: MonitorOptions,
    ) -> Result<(Self, Changes), MonitorError> {
        let runtime = Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;
        let (watch, events) = ActivityWatch::new(activity_log_path(&sync_dir))?;
        let (monitor, changes) = spawn(&runtime, sync_dir, daemon, Arc::new(watch), events, options);
        // Fails while the daemon has never run here; start() tries again.
        monitor.watch.activate();
        tracing::debug!(path = %monitor.sync_dir.display(), "monitor created");
        Ok((monitor, changes))
    }

    /// Synchronized folder of the monitored daemon.
    pub fn sync_dir(&self) -> &Path {
        &self.sync_dir
    }

    /// Whether the activity-log watch is attached.
    pub fn is_watching(&self) -> bool {
        self.watch.is_active()
    }

    /// Whether the event loop is still running.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Start the daemon if it is not running, then try to attach the
    /// activity-log watch. Blocks the calling thread while the command runs.
    pub fn start(&self) -> Result<(), MonitorError> {
        ensure_started(self.daemon.as_ref())?;
        self.watch.activate();
        Ok(())
    }

    /// Stop the daemon if it is running. Blocks the calling thread while the
    /// command runs.
    pub fn stop(&self) -> Result<(), MonitorError> {
        ensure_stopped(self.daemon.as_ref())?;
        Ok(())
    }

    /// Raw status text in the user's locale, queried directly from the daemon.
    pub fn output(&self) -> String {
        self.daemon.status(Locale::User)
    }

    /// Stop the event loop and wait until it has exited.
    ///
    /// On return the [`Changes`] stream is closed and the watch is released.
    /// Calling it again does nothing.
    pub async fn close(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let (ack_tx, ack_rx) = oneshot::channel();
            if shutdown_tx.send(ack_tx).await.is_ok() {
                let _ = ack_rx.await;
            }
        }
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                tracing::warn!(error = %err, "event loop task failed");
            }
        }
        self.watch.release();
    }
}

fn spawn(
    runtime: &Handle,
    sync_dir: PathBuf,
    daemon: Arc<dyn Daemon>,
    watch: Arc<ActivityWatch>,
    events: WatchEvents,
    options: MonitorOptions,
) -> (Monitor, Changes) {
    let (changes_tx, changes_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let event_loop = EventLoop {
        daemon: Arc::clone(&daemon),
        watch: Arc::clone(&watch),
        events,
        shutdown_rx,
        changes_tx,
        options,
    };
    let worker = runtime.spawn(event_loop.run());
    let monitor = Monitor {
        sync_dir,
        daemon,
        watch,
        shutdown_tx: Some(shutdown_tx),
        worker: Some(worker),
    };
    (monitor, changes_rx)
}

struct EventLoop {
    daemon: Arc<dyn Daemon>,
    watch: Arc<ActivityWatch>,
    events: WatchEvents,
    shutdown_rx: mpsc::Receiver<ShutdownRequest>,
    changes_tx: mpsc::Sender<Snapshot>,
    options: MonitorOptions,
}

impl EventLoop {
    async fn run(mut self) {
        tracing::debug!("event loop started");
        let mut snapshot = Snapshot::new();
        let mut schedule = PollSchedule::new(self.options.busy_interval, self.options.ceiling);
        let tick = tokio::time::sleep(self.options.first_tick);
        tokio::pin!(tick);
        let mut tick_armed = true;
        let mut events_open = true;
        // Log activity seen while a publish was pending.
        let mut activity_pending = false;

        let ack = 'run: loop {
            if activity_pending {
                activity_pending = false;
                schedule.on_activity();
            } else {
                tokio::select! {
                    request = self.shutdown_rx.recv() => break 'run request,
                    event = self.events.recv(), if events_open => match event {
                        Some(Ok(event)) => {
                            tracing::debug!(kind = ?event.kind, "activity log event");
                            schedule.on_activity();
                        }
                        Some(Err(err)) => {
                            tracing::error!(error = %err, "activity log watch failed");
                            break 'run None;
                        }
                        None => {
                            events_open = false;
                            continue;
                        }
                    },
                    () = &mut tick, if tick_armed => {
                        tick_armed = false;
                        tracing::debug!(interval = schedule.interval(), "poll timer");
                        schedule.on_tick(snapshot.is_busy());
                    }
                }
            }
            // One sample covers every event already queued.
            match self.discard_queued_events() {
                Ok(true) => schedule.on_activity(),
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(error = %err, "activity log watch failed");
                    break 'run None;
                }
            }

            if let Some(units) = schedule.next_delay() {
                let delay = self.options.time_unit.saturating_mul(units);
                let deadline = Instant::now().checked_add(delay);
                tick_armed = deadline.is_some();
                if let Some(deadline) = deadline {
                    tick.as_mut().reset(deadline);
                } else {
                    tracing::warn!(units, "poll interval out of range, timer left off");
                }
            }

            let text = self.sample().await;
            if !snapshot.update(&text) {
                continue;
            }
            tracing::debug!(
                previous = %snapshot.previous_status,
                status = %snapshot.status,
                space = !snapshot.total_space.is_empty(),
                recent = snapshot.recent_items.len(),
                error = !snapshot.error_message.is_empty(),
                "status changed",
            );
            let publish = self.changes_tx.send(snapshot.clone());
            tokio::pin!(publish);
            loop {
                tokio::select! {
                    sent = &mut publish => {
                        if sent.is_err() {
                            tracing::debug!("change receiver dropped");
                        }
                        break;
                    }
                    request = self.shutdown_rx.recv() => break 'run request,
                    event = self.events.recv(), if events_open => match event {
                        Some(Ok(_)) => activity_pending = true,
                        Some(Err(err)) => {
                            tracing::error!(error = %err, "activity log watch failed");
                            break 'run None;
                        }
                        None => events_open = false,
                    },
                }
            }
        };

        self.watch.release();
        drop(self.changes_tx);
        tracing::debug!("event loop exited");
        if let Some(ack) = ack {
            let _ = ack.send(());
        }
    }

    /// Drop log events that are already queued and report whether there were
    /// any. Fails on a queued watch error.
    fn discard_queued_events(&mut self) -> notify::Result<bool> {
        let mut any = false;
        while let Ok(event) = self.events.try_recv() {
            event?;
            any = true;
        }
        Ok(any)
    }

    async fn sample(&self) -> String {
        let daemon = Arc::clone(&self.daemon);
        match tokio::task::spawn_blocking(move || daemon.status(Locale::Neutral)).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "status query task failed");
                String::new()
            }
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global tracing subscriber, writing to stderr. `RUST_LOG`
/// overrides the default `info` filter. Does nothing if one is already set.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
