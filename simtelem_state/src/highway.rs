//! Highway registry: the set of highways seen so far, and the per-highway
//! cycle/time bookkeeping needed to translate a cycle number into elapsed
//! wall-clock time for the dashboard.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Static identity of a highway as reported by the transport.
#[derive(Debug, Clone)]
pub struct Highway {
    pub name: String,
    /// Total lane count across both directions. Used to fold a
    /// `(lane, direction)` pair from the wire format into a single lane
    /// index: `lane + direction * (lanes / 2)`.
    pub lanes: u32,
    /// Posted speed limit, set from the first cycle observed for this
    /// highway. Later cycles are assumed to report the same limit.
    pub speed_limit: f64,
}

/// Per-highway cycle/time history, appended to as cycle batches arrive.
#[derive(Debug, Clone, Default)]
pub struct HighwayData {
    pub cycles: Vec<u64>,
    pub times: Vec<f64>,
    /// Last measured ingest-to-dashboard latency: wall-clock seconds at the
    /// draw that first rendered the most recent cycle, minus that cycle's
    /// own timestamp.
    pub time_elapsed: f64,
    /// Set whenever a new cycle arrives, cleared by the first latency
    /// measurement taken after it, so `time_elapsed` reflects one draw per
    /// cycle rather than growing on every redraw between batches.
    latency_pending: bool,
}

impl HighwayData {
    pub fn record_cycle(&mut self, cycle: u64, timestamp: f64) {
        if let Some(&last) = self.cycles.last() {
            if cycle > last + 1 {
                tracing::warn!(
                    highway_cycles_skipped = cycle - last - 1,
                    "ingest fell behind: cycle gap detected"
                );
            }
        }
        self.cycles.push(cycle);
        self.times.push(timestamp);
        self.latency_pending = true;
    }

    /// Measures ingest-to-dashboard latency against `now` (wall-clock
    /// seconds) if a cycle has arrived since the last measurement, storing
    /// it into `time_elapsed`; otherwise just returns the cached value.
    fn measure_latency(&mut self, now: f64) -> f64 {
        if self.latency_pending {
            if let Some(&last) = self.times.last() {
                self.time_elapsed = (now - last).max(0.0);
            }
            self.latency_pending = false;
        }
        self.time_elapsed
    }
}

/// Registry mapping highway name to a stable index, with the per-highway
/// data living alongside it.
///
/// Only the orchestrator ever inserts a new highway; the dashboard and ETL
/// stages only read, so a single `RwLock` over the small outer `Vec` is
/// enough contention-wise.
pub struct HighwayRegistry {
    inner: RwLock<HighwayRegistryInner>,
}

struct HighwayRegistryInner {
    highways: Vec<(Highway, HighwayData)>,
    by_name: HashMap<String, usize>,
}

impl HighwayRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HighwayRegistryInner {
                highways: Vec::new(),
                by_name: HashMap::new(),
            }),
        }
    }

    /// Returns the stable index for `name`, registering it with `lanes` and
    /// `speed_limit` if this is the first time it has been seen.
    pub fn resolve_or_insert(&self, name: &str, lanes: u32, speed_limit: f64) -> usize {
        if let Some(&idx) = self.inner.read().by_name.get(name) {
            return idx;
        }
        let mut inner = self.inner.write();
        if let Some(&idx) = inner.by_name.get(name) {
            return idx;
        }
        let idx = inner.highways.len();
        inner.highways.push((
            Highway {
                name: name.to_string(),
                lanes,
                speed_limit,
            },
            HighwayData::default(),
        ));
        inner.by_name.insert(name.to_string(), idx);
        idx
    }

    pub fn speed_limit(&self, index: usize) -> f64 {
        self.inner.read().highways[index].0.speed_limit
    }

    pub fn name(&self, index: usize) -> String {
        self.inner.read().highways[index].0.name.clone()
    }

    /// Clones the cycle-number history recorded so far for `index`. Used by
    /// Transform to compute the time-axis deltas in [`crate::vehicle`]-level
    /// kinematics without holding the registry lock across the computation.
    pub fn cycles_snapshot(&self, index: usize) -> Vec<u64> {
        self.inner.read().highways[index].1.cycles.clone()
    }

    pub fn record_cycle(&self, index: usize, cycle: u64, timestamp: f64) {
        self.inner.write().highways[index].1.record_cycle(cycle, timestamp);
    }

    /// Measures (on the first call after a new cycle) or returns the cached
    /// ingest-to-dashboard latency for `index`. Safe to call once per
    /// displayed row every redraw — only the call that lands after a new
    /// cycle actually recomputes it.
    pub fn measure_latency(&self, index: usize, now: f64) -> f64 {
        self.inner.write().highways[index].1.measure_latency(now)
    }

    pub fn len(&self) -> usize {
        self.inner.read().highways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HighwayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_same_name_to_same_index() {
        let reg = HighwayRegistry::new();
        let a = reg.resolve_or_insert("I-95", 8, 20.0);
        let b = reg.resolve_or_insert("I-95", 8, 20.0);
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn distinct_names_get_distinct_indices() {
        let reg = HighwayRegistry::new();
        let a = reg.resolve_or_insert("I-95", 8, 20.0);
        let b = reg.resolve_or_insert("US-1", 4, 15.0);
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn latency_is_measured_once_per_cycle_then_cached() {
        let reg = HighwayRegistry::new();
        let idx = reg.resolve_or_insert("I-95", 8, 20.0);
        reg.record_cycle(idx, 0, 10.0);
        assert_eq!(reg.measure_latency(idx, 10.5), 0.5);
        // A redraw with no new cycle returns the cached measurement, not a
        // fresh (now - 10.0) computation.
        assert_eq!(reg.measure_latency(idx, 999.0), 0.5);

        reg.record_cycle(idx, 1, 11.0);
        assert_eq!(reg.measure_latency(idx, 11.2), 0.2);
    }

    #[test]
    fn latency_never_goes_negative_when_draw_precedes_cycle_clock() {
        let reg = HighwayRegistry::new();
        let idx = reg.resolve_or_insert("I-95", 8, 20.0);
        reg.record_cycle(idx, 0, 10.0);
        assert_eq!(reg.measure_latency(idx, 9.0), 0.0);
    }
}
