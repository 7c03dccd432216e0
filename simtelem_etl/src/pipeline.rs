//! Shared state threaded through one ETL run.
//!
//! One [`Shared`] is constructed once at startup and handed (via `Arc`) to
//! the orchestrator thread, every Extract/Transform/Enrich worker, and the
//! dashboard — a single object passed by shared ownership rather than a web
//! of cyclic worker↔index references.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use simtelem_enrich::SlowService;
use simtelem_state::{DashboardState, HighwayRegistry, VehicleIndex, publish::PublishBuffers};

/// Everything the ETL pipeline and the dashboard need to share.
pub struct Shared {
    pub vehicle_index: VehicleIndex,
    pub highways: HighwayRegistry,
    pub buffers: PublishBuffers,
    pub enrichment: SlowService,
    /// Navigation/filter state plus the `should_draw`/`should_exit` flags,
    /// all behind one lock.
    pub dashboard: Mutex<DashboardState>,
    /// Condition variable paired with `dashboard`: the orchestrator and the
    /// dashboard's redraw loop both wait/notify on this.
    pub draw_signal: Condvar,
    /// Lock-free shutdown flag workers poll only at stage boundaries — an
    /// in-flight stage always runs to completion. Mirrors
    /// `dashboard.should_exit` but avoids taking the dashboard lock from the
    /// hot Extract/Transform loop.
    should_exit: AtomicBool,
    /// True while a batch runner thread is between Extract and the end of
    /// Enrich. The orchestrator only starts a new batch when this is false,
    /// creating a total order over batches.
    etl_running: AtomicBool,
    pub num_workers: usize,
}

impl Shared {
    pub fn new(num_workers: usize, initial_map_size: usize, queue_size: usize, nap_time: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            vehicle_index: VehicleIndex::with_capacity(initial_map_size),
            highways: HighwayRegistry::new(),
            buffers: PublishBuffers::new(num_workers),
            enrichment: SlowService::new(queue_size, nap_time),
            dashboard: Mutex::new(DashboardState::new()),
            draw_signal: Condvar::new(),
            should_exit: AtomicBool::new(false),
            etl_running: AtomicBool::new(false),
            num_workers,
        })
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Acquire)
    }

    /// Atomically transitions from idle to running; returns `true` if this
    /// call performed that transition (i.e. the caller may start a batch).
    pub fn try_start_etl(&self) -> bool {
        self.etl_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn finish_etl(&self) {
        self.etl_running.store(false, Ordering::Release);
    }

    /// Requests shutdown and wakes the dashboard's redraw wait.
    pub fn request_shutdown(&self) {
        self.should_exit.store(true, Ordering::Release);
        let mut dash = self.dashboard.lock();
        dash.should_exit = true;
        dash.should_draw = true;
        self.draw_signal.notify_all();
    }

    /// Marks a fresh publish and wakes the dashboard to redraw.
    pub fn signal_draw(&self) {
        self.dashboard.lock().should_draw = true;
        self.draw_signal.notify_all();
    }
}
