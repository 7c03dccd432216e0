//! Index-space partitioning over a batch's concatenated `RawVehicle` lists.
//!
//! Extract and Transform both address vehicles by a single global index into
//! the concatenation of every pending cycle's vehicle list; this module is
//! the prefix-sum bookkeeping that lets a worker translate "my slice is
//! `[start, end)`" into "cycle 2, vehicle 14" without rescanning.

use simtelem_transport::SimulationCycle;

/// Prefix sums over a batch's per-cycle vehicle counts.
pub struct PartitionPlan {
    /// `offsets[i]` is the global index of cycle `i`'s first vehicle;
    /// `offsets[len]` is the total vehicle count across the whole batch.
    offsets: Vec<usize>,
}

impl PartitionPlan {
    pub fn new(batch: &[SimulationCycle]) -> Self {
        let mut offsets = Vec::with_capacity(batch.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for cycle in batch {
            total += cycle.vehicles.len();
            offsets.push(total);
        }
        Self { offsets }
    }

    pub fn total(&self) -> usize {
        *self.offsets.last().unwrap_or(&0)
    }

    /// The half-open `[start, end)` global-index range thread `worker` owns
    /// out of `num_workers`. Integer division remainder is absorbed by the
    /// last worker.
    pub fn range_for_worker(&self, worker: usize, num_workers: usize) -> (usize, usize) {
        let total = self.total();
        if num_workers == 0 {
            return (0, 0);
        }
        let chunk = total / num_workers;
        let start = worker * chunk;
        let end = if worker + 1 == num_workers { total } else { start + chunk };
        (start, end)
    }

    /// Translates a global index into `(cycle_index, vehicle_index)`.
    pub fn locate(&self, global_index: usize) -> (usize, usize) {
        // `offsets` is strictly non-decreasing and has one more entry than
        // there are cycles; partition_point finds the first offset strictly
        // greater than `global_index`, i.e. the owning cycle.
        let cycle_index = self.offsets.partition_point(|&o| o <= global_index) - 1;
        let vehicle_index = global_index - self.offsets[cycle_index];
        (cycle_index, vehicle_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtelem_common::PlateKey;
    use simtelem_transport::{HighwayDescriptor, RawVehicle};

    fn cycle_with(n: usize) -> SimulationCycle {
        SimulationCycle {
            highway: HighwayDescriptor {
                name: "H1".to_string(),
                lanes: 4,
                speed_limit: 20.0,
            },
            cycle: 1,
            timestamp: 0.0,
            vehicles: (0..n)
                .map(|i| RawVehicle {
                    plate: PlateKey::from_str_exact(&format!("P{i:06}")),
                    lane: 0,
                    direction: 0,
                    distance: i as i64,
                })
                .collect(),
        }
    }

    #[test]
    fn total_sums_all_cycles() {
        let batch = vec![cycle_with(3), cycle_with(5)];
        let plan = PartitionPlan::new(&batch);
        assert_eq!(plan.total(), 8);
    }

    #[test]
    fn locate_resolves_cycle_and_vehicle_index() {
        let batch = vec![cycle_with(3), cycle_with(5)];
        let plan = PartitionPlan::new(&batch);
        assert_eq!(plan.locate(0), (0, 0));
        assert_eq!(plan.locate(2), (0, 2));
        assert_eq!(plan.locate(3), (1, 0));
        assert_eq!(plan.locate(7), (1, 4));
    }

    #[test]
    fn last_worker_absorbs_remainder() {
        let batch = vec![cycle_with(10)];
        let plan = PartitionPlan::new(&batch);
        // 10 vehicles over 3 workers: chunk=3, ranges (0,3) (3,6) (6,10).
        assert_eq!(plan.range_for_worker(0, 3), (0, 3));
        assert_eq!(plan.range_for_worker(1, 3), (3, 6));
        assert_eq!(plan.range_for_worker(2, 3), (6, 10));
    }

    #[test]
    fn partition_covers_universe_exactly_once() {
        let batch = vec![cycle_with(7), cycle_with(4)];
        let plan = PartitionPlan::new(&batch);
        let num_workers = 3;
        let mut covered = vec![false; plan.total()];
        for w in 0..num_workers {
            let (start, end) = plan.range_for_worker(w, num_workers);
            for i in start..end {
                assert!(!covered[i], "index {i} covered twice");
                covered[i] = true;
            }
        }
        assert!(covered.into_iter().all(|c| c), "every index must be covered");
    }
}
