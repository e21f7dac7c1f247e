//! Fixed-period, single-worker, non-overlapping scheduler.
//!
//! A timer thread fires at a fixed rate after an initial delay and hands
//! each firing to one worker thread that runs the control cycle.
//!
//! ```text
//!              fire (Idle)            cycle returns
//!   ┌──────┐ ─────────────▶ ┌─────────┐ ─────────────▶ ┌──────┐
//!   │ Idle │                │ Running │                │ Idle │
//!   └──────┘                └─────────┘                └──────┘
//!      │                       │  fire (Running) → dropped
//!      │ shutdown              │ shutdown: in-flight cycle finishes
//!      ▼                       ▼
//!   ┌─────────┐
//!   │ Stopped │   terminal, no new cycle is started
//!   └─────────┘
//! ```
//!
//! A firing that lands while a cycle is still running is dropped, not
//! queued, so a slow cycle never causes a burst of catch-up cycles.
//! A cycle that panics is logged and counted as executed; only
//! [`Scheduler::shutdown`] ends the schedule.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, error, info, warn};

// ═══════════════════════════════════════════════════════════════
//  State machine
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// What the timer should do with a firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fire {
    /// Start a cycle.
    Run,
    /// Previous cycle still running; firing discarded.
    Dropped,
    /// Scheduler is stopped; the timer should exit.
    Stopped,
}

/// Firing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub fired: u64,
    pub executed: u64,
    pub dropped: u64,
}

/// Pure scheduler state machine, driven by the timer and worker threads
/// (or directly by tests with simulated time).
#[derive(Debug)]
pub struct SchedulerCore {
    state: SchedulerState,
    stats: SchedulerStats,
}

impl SchedulerCore {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            stats: SchedulerStats::default(),
        }
    }

    /// The timer fired.
    pub fn on_fire(&mut self) -> Fire {
        match self.state {
            SchedulerState::Stopped => Fire::Stopped,
            SchedulerState::Running => {
                self.stats.fired += 1;
                self.stats.dropped += 1;
                Fire::Dropped
            }
            SchedulerState::Idle => {
                self.stats.fired += 1;
                self.state = SchedulerState::Running;
                Fire::Run
            }
        }
    }

    /// The worker returned from a cycle.
    pub fn on_cycle_finished(&mut self) {
        self.stats.executed += 1;
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Idle;
        }
    }

    /// Enter the terminal state.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}

impl Default for SchedulerCore {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Threaded runtime
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Run,
    Stop,
}

struct Shared {
    core: Mutex<SchedulerCore>,
    /// Wakes the timer early on shutdown.
    stop_cv: Condvar,
    /// Timer → worker hand-off.  Holds at most one pending wake.
    wake: Signal<CriticalSectionRawMutex, Wake>,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a running scheduler.
pub struct Scheduler {
    shared: Arc<Shared>,
    timer: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Start the timer and worker threads.  `job` runs on the worker,
    /// first after `initial_delay`, then every `period`.
    pub fn start<F>(period: Duration, initial_delay: Duration, job: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            core: Mutex::new(SchedulerCore::new()),
            stop_cv: Condvar::new(),
            wake: Signal::new(),
        });

        info!(
            "Scheduler: period {:?}, initial delay {:?}",
            period, initial_delay
        );

        let worker = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("control".into())
                .spawn(move || worker_loop(&shared, job))?
        };
        let timer = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("control-timer".into())
                .spawn(move || timer_loop(&shared, period, initial_delay))
        };
        let timer = match timer {
            Ok(t) => t,
            Err(e) => {
                shared.lock().stop();
                shared.wake.signal(Wake::Stop);
                let _ = worker.join();
                return Err(e);
            }
        };

        Ok(Self {
            shared,
            timer: Some(timer),
            worker: Some(worker),
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.lock().state()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.lock().stats()
    }

    /// Stop scheduling.  An in-flight cycle is allowed to finish; returns
    /// once both threads have exited.
    pub fn shutdown(mut self) -> SchedulerStats {
        self.stop_and_join();
        self.stats()
    }

    fn stop_and_join(&mut self) {
        self.shared.lock().stop();
        self.shared.stop_cv.notify_all();
        self.shared.wake.signal(Wake::Stop);
        for handle in [self.timer.take(), self.worker.take()].into_iter().flatten() {
            if handle.join().is_err() {
                warn!("Scheduler: a thread panicked during shutdown");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.timer.is_some() || self.worker.is_some() {
            self.stop_and_join();
        }
    }
}

fn worker_loop<F: FnMut()>(shared: &Shared, mut job: F) {
    loop {
        match futures_lite::future::block_on(shared.wake.wait()) {
            Wake::Run => {
                if std::panic::catch_unwind(AssertUnwindSafe(&mut job)).is_err() {
                    error!("Scheduler: control cycle panicked, next tick runs as usual");
                }
                shared.lock().on_cycle_finished();
            }
            Wake::Stop => break,
        }
    }
    debug!("Scheduler: worker exited");
}

fn timer_loop(shared: &Shared, period: Duration, initial_delay: Duration) {
    let mut deadline = Instant::now() + initial_delay;
    let mut core = shared.lock();
    loop {
        // Sleep until the deadline, waking early on shutdown.
        loop {
            if core.state() == SchedulerState::Stopped {
                debug!("Scheduler: timer exited");
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            core = shared
                .stop_cv
                .wait_timeout(core, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        match core.on_fire() {
            Fire::Run => shared.wake.signal(Wake::Run),
            Fire::Dropped => info!("Scheduler: previous cycle still running, tick dropped"),
            Fire::Stopped => return,
        }
        deadline += period;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
