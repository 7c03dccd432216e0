//! Extract stage: grows the vehicle index and records this batch's
//! positions, via a two-phase barrier that resizes the index exactly once.

use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};

use simtelem_state::Position;
use simtelem_transport::SimulationCycle;

use crate::partition::PartitionPlan;
use crate::pipeline::Shared;

pub struct ExtractStage;

impl ExtractStage {
    /// Runs Extract to completion for `batch` across `shared.num_workers`
    /// threads. On return, every `RawVehicle` in the batch has been
    /// reflected into `shared.vehicle_index` and each worker's
    /// `PublishBuffers` slot holds the plates it touched, ready for
    /// Transform.
    pub fn run(batch: &[SimulationCycle], shared: &Shared) {
        let plan = PartitionPlan::new(batch);
        let num_workers = shared.num_workers;
        let new_plates_total = AtomicUsize::new(0);
        // Two waits: the first elects a leader (via `is_leader()`) once
        // every worker has finished counting; the second holds every
        // worker — leader included — until the leader's single `reserve`
        // call has returned, ensuring the index resizes only while no
        // worker executes the Extract body).
        let barrier = Barrier::new(num_workers);

        std::thread::scope(|scope| {
            for worker in 0..num_workers {
                let plan = &plan;
                let barrier = &barrier;
                let new_plates_total = &new_plates_total;
                scope.spawn(move || {
                    let (start, end) = plan.range_for_worker(worker, num_workers);

                    // Phase A: count plates this worker hasn't seen before.
                    let mut local_new = 0usize;
                    for global in start..end {
                        let (cycle_idx, vehicle_idx) = plan.locate(global);
                        let plate = batch[cycle_idx].vehicles[vehicle_idx].plate;
                        if !shared.vehicle_index.contains(&plate) {
                            local_new += 1;
                        }
                    }
                    new_plates_total.fetch_add(local_new, Ordering::Relaxed);

                    let result = barrier.wait();
                    if result.is_leader() {
                        let additional = new_plates_total.load(Ordering::Relaxed);
                        shared.vehicle_index.reserve(additional);
                        tracing::debug!(additional, "vehicle index reserved ahead of insert phase");
                    }
                    barrier.wait();

                    // Phase B: insert/update and record this batch's touches.
                    shared.buffers.with_worker(worker, |buf| buf.reset());
                    for global in start..end {
                        let (cycle_idx, vehicle_idx) = plan.locate(global);
                        let cycle = &batch[cycle_idx];
                        let raw = &cycle.vehicles[vehicle_idx];

                        let highway_idx = shared.highways.resolve_or_insert(
                            &cycle.highway.name,
                            cycle.highway.lanes,
                            cycle.highway.speed_limit,
                        );
                        let half = cycle.highway.lanes / 2;
                        let lane = raw.lane + raw.direction as u32 * half;
                        let pos = Position {
                            lane: lane as i64,
                            distance: raw.distance,
                            cycle: cycle.cycle,
                        };

                        shared.vehicle_index.get_or_insert_with(raw.plate, highway_idx, pos, |data, inserted| {
                            if !inserted {
                                data.positions.push(pos);
                            }
                            data.vehicle.highway_index = highway_idx;
                            data.vehicle.last_pos = pos;
                        });

                        shared.buffers.with_worker(worker, |buf| buf.modified.push(raw.plate));
                    }
                });
            }
        });
    }
}
