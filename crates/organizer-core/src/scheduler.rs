use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Completed,
    Failed,
    Panicked,
    /// Another pass was in flight; this trigger was dropped.
    Skipped,
}

struct SchedulerState {
    running: AtomicBool,
    stopped: AtomicBool,
}

/// Fires a job on a fixed interval, at most one at a time. Triggers that
/// arrive while a job is running are dropped, never queued.
#[derive(Clone)]
pub struct RunScheduler {
    interval: Duration,
    state: Arc<SchedulerState>,
}

/// Clears the running flag however the job ends, including by panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RunScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Arc::new(SchedulerState {
                running: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.state.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }

    /// Run `job` now unless a run is already in flight.
    pub fn trigger<F, T, E>(&self, job: F) -> TriggerOutcome
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        if self
            .state
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("A pass is already running, skipping this trigger");
            return TriggerOutcome::Skipped;
        }
        let _guard = RunningGuard(&self.state.running);

        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(_)) => TriggerOutcome::Completed,
            Ok(Err(e)) => {
                error!("Pass failed: {}", e);
                TriggerOutcome::Failed
            }
            Err(_) => {
                error!("Pass panicked");
                TriggerOutcome::Panicked
            }
        }
    }

    /// Run `job` immediately, then trigger it on its own thread every
    /// interval until [`stop`](Self::stop) is called. Blocks the caller, and
    /// does not return while a scheduled pass is still in flight.
    pub fn run<F, T, E>(&self, job: F)
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: 'static,
        E: Display + 'static,
    {
        let job = Arc::new(job);
        self.trigger(|| job());

        let mut in_flight: Option<JoinHandle<TriggerOutcome>> = None;
        let mut next_tick = Instant::now() + self.interval;
        loop {
            while !self.is_stopped() {
                let now = Instant::now();
                if now >= next_tick {
                    break;
                }
                thread::sleep(SLEEP_SLICE.min(next_tick - now));
            }
            if self.is_stopped() {
                if let Some(handle) = in_flight.take() {
                    info!("Waiting for the running pass to finish");
                    join_tick(handle);
                }
                info!("Scheduler stopped");
                return;
            }
            next_tick += self.interval;

            if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
                warn!("A pass is already running, skipping this tick");
                continue;
            }
            if let Some(handle) = in_flight.take() {
                join_tick(handle);
            }

            info!("Running scheduled organization task...");
            let scheduler = self.clone();
            let job = Arc::clone(&job);
            in_flight = Some(thread::spawn(move || scheduler.trigger(|| job())));
        }
    }
}

fn join_tick(handle: JoinHandle<TriggerOutcome>) {
    // trigger catches panics from the job, so this only fails on a bug here.
    if handle.join().is_err() {
        error!("Scheduler tick thread panicked");
    }
}
