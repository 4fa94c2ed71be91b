use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ecocharge_core::TelemetrySnapshot;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::ApiClient;

/// Default polling period of the operator dashboard.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(2);

/// One running polling loop and its stop plumbing.
#[derive(Debug)]
struct PollRun {
    stopped: Arc<AtomicBool>,
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// Keeps the operator's view of grid telemetry eventually consistent.
///
/// A fixed-period loop issues one independent `dashboard_stats` call per
/// tick; the first fires immediately. Each call runs in its own task, so
/// a hung or slow request stalls only that attempt while the interval
/// keeps firing. A successful poll replaces the latest snapshot
/// wholesale; a failed poll logs a warning and leaves it untouched, so
/// the next tick self-corrects without backoff. `stop()` never aborts an
/// in-flight request: its response resolves and is discarded without
/// touching the latest snapshot.
#[derive(Debug)]
pub struct TelemetryPoller {
    api: ApiClient,
    period: Duration,
    latest: Arc<RwLock<Option<TelemetrySnapshot>>>,
    run: Option<PollRun>,
}

impl TelemetryPoller {
    pub fn new(api: ApiClient) -> Self {
        TelemetryPoller::with_period(api, DEFAULT_POLL_PERIOD)
    }

    pub fn with_period(api: ApiClient, period: Duration) -> Self {
        // A zero period would panic inside the polling task; fall back
        // to the default instead of dying silently.
        let period = if period.is_zero() {
            tracing::warn!(
                "Zero polling period requested, falling back to {:?}",
                DEFAULT_POLL_PERIOD
            );
            DEFAULT_POLL_PERIOD
        } else {
            period
        };

        TelemetryPoller {
            api,
            period,
            latest: Arc::new(RwLock::new(None)),
            run: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// The most recently fetched snapshot, if any poll has succeeded.
    pub fn latest(&self) -> Option<TelemetrySnapshot> {
        self.latest.read().expect("snapshot lock poisoned").clone()
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| !run.handle.is_finished())
    }

    /// Begin polling. A no-op while a loop is already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let stopped = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(Notify::new());
        let api = self.api.clone();
        let latest = self.latest.clone();
        let period = self.period;

        let handle = tokio::spawn({
            let stopped = stopped.clone();
            let stop = stop.clone();
            async move {
                let mut interval = tokio::time::interval(period);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = stop.notified() => break,
                    }
                    if stopped.load(Ordering::SeqCst) {
                        break;
                    }
                    // Each tick's request runs in its own task so a hung
                    // call stalls only that attempt, never future ticks
                    let api = api.clone();
                    let latest = latest.clone();
                    let stopped = stopped.clone();
                    tokio::spawn(async move {
                        match api.dashboard_stats().await {
                            Ok(snapshot) => {
                                // Stale-response guard: a poll that resolves
                                // after stop() must not touch the snapshot
                                if stopped.load(Ordering::SeqCst) {
                                    return;
                                }
                                *latest.write().expect("snapshot lock poisoned") = Some(snapshot);
                            }
                            Err(error) => {
                                tracing::warn!("Telemetry poll failed: {}", error);
                            }
                        }
                    });
                }
            }
        });

        tracing::info!("Telemetry polling started, period {:?}", period);
        self.run = Some(PollRun {
            stopped,
            stop,
            handle,
        });
    }

    /// Stop polling. Safe to call repeatedly; wakes a sleeping loop
    /// promptly and lets an in-flight request resolve unobserved.
    pub fn stop(&mut self) {
        if let Some(run) = &self.run {
            run.stopped.store(true, Ordering::SeqCst);
            run.stop.notify_one();
        }
    }
}

impl Drop for TelemetryPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
