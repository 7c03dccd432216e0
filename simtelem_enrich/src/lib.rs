//! Bounded-queue external vehicle enrichment service.
//!
//! `SlowService` models a slow external owner/model/year lookup: callers
//! are served strictly in arrival order, one at a time, and a caller that
//! arrives while the queue is already at capacity is turned away
//! immediately rather than being made to wait. The "lookup" itself is a
//! synthetic random draw over small embedded word lists, gated behind an
//! artificial delay to stand in for the real (unspecified) external call.
//!
//! # Why `query` returns the record directly
//!
//! A `query_vehicle(plate) -> bool` plus separate unsynchronized
//! `get_name()`/`get_model()`/`get_year()` getters the caller reads
//! immediately afterward is tempting but racy in general — nothing ties the
//! getters to the specific lookup that just completed. [`SlowService::query`]
//! instead returns the looked-up [`EnrichmentRecord`] directly, closing that
//! race without changing the observable bounded-FIFO-or-reject behavior.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use rand::Rng;

use simtelem_common::PlateKey;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

const MODELS: &[&str] = &[
    "Sedan LX", "Hatchback GT", "Pickup SR", "Wagon Touring", "Coupe RS", "Crossover XLE",
    "Roadster Type-S", "Minivan EX", "SUV Limited", "Compact Base",
];

const MIN_YEAR: u16 = 2000;
const YEAR_SPAN: u16 = 23;

/// Synthetic owner/model/year lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub name: String,
    pub model: String,
    pub year: u16,
}

#[derive(Debug)]
struct ServiceState {
    /// Number of callers currently admitted and waiting their turn.
    pending: usize,
    /// Monotonic ticket counter; the next caller to admit gets this value.
    next_ticket: u64,
    /// Ticket number currently allowed to run its lookup.
    serving: u64,
}

/// Bounded FIFO enrichment service. Cheap to construct; the word lists are
/// `'static` so no I/O happens at construction, matching the "no I/O beyond
/// the one-time dictionary load" contract (the embedding *is* that load,
/// resolved at compile time).
pub struct SlowService {
    max_queue_size: usize,
    nap_time: Duration,
    state: Mutex<ServiceState>,
    turn: Condvar,
}

impl SlowService {
    pub fn new(max_queue_size: usize, nap_time: Duration) -> Self {
        Self {
            max_queue_size,
            nap_time,
            state: Mutex::new(ServiceState {
                pending: 0,
                next_ticket: 0,
                serving: 0,
            }),
            turn: Condvar::new(),
        }
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    /// Admits `plate` to the queue and blocks until it is this caller's
    /// turn, performs exactly one synthetic lookup, then returns the
    /// result. Returns `None` immediately, without blocking, if the queue
    /// is already at `max_queue_size`.
    pub fn query(&self, plate: PlateKey) -> Option<EnrichmentRecord> {
        let ticket = {
            let mut state = self.state.lock();
            if state.pending >= self.max_queue_size {
                tracing::debug!(%plate, "enrichment queue saturated, dropping request");
                return None;
            }
            state.pending += 1;
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            ticket
        };

        {
            let mut state = self.state.lock();
            self.turn.wait_while(&mut state, |state| state.serving != ticket);
        }

        std::thread::sleep(self.nap_time);
        let record = self.draw_record();

        {
            let mut state = self.state.lock();
            state.pending -= 1;
            state.serving += 1;
        }
        self.turn.notify_all();

        tracing::debug!(%plate, name = %record.name, year = record.year, "enrichment completed");
        Some(record)
    }

    fn draw_record(&self) -> EnrichmentRecord {
        let mut rng = rand::thread_rng();
        EnrichmentRecord {
            name: format!(
                "{} {}",
                FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
                LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())],
            ),
            model: MODELS[rng.gen_range(0..MODELS.len())].to_string(),
            year: MIN_YEAR + rng.gen_range(0..YEAR_SPAN),
        }
    }
}
