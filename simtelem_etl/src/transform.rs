//! Transform stage: derives kinematics and risk for every plate Extract
//! touched this batch, and rolls up the three filter counts.

use std::sync::atomic::{AtomicUsize, Ordering};

use simtelem_common::consts::COLLISION_RISK_THRESHOLD;
use simtelem_state::VehicleFilter;

use crate::kinematics;
use crate::pipeline::Shared;

pub struct TransformStage;

impl TransformStage {
    /// Runs Transform across `shared.num_workers` threads, each consuming
    /// its own worker's `modified` list from Extract. Returns the
    /// `{all, collision_risk, above_speed_limit}` counts for this batch.
    pub fn run(shared: &Shared) -> [usize; VehicleFilter::COUNT] {
        let all = AtomicUsize::new(0);
        let collision = AtomicUsize::new(0);
        let speeding = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for worker in 0..shared.num_workers {
                let all = &all;
                let collision = &collision;
                let speeding = &speeding;
                scope.spawn(move || {
                    let plates = shared.buffers.with_worker(worker, |buf| buf.modified.clone());
                    let mut local_collision = 0usize;
                    let mut local_speeding = 0usize;

                    for plate in &plates {
                        shared.vehicle_index.with_vehicle(plate, |data| {
                            let highway_idx = data.vehicle.highway_index;
                            let speed_limit = shared.highways.speed_limit(highway_idx);
                            let cycles = shared.highways.cycles_snapshot(highway_idx);
                            let prev_speed = data.vehicle.speed;

                            let derived = kinematics::compute(&data.positions, &cycles, speed_limit, prev_speed);

                            data.vehicle.speed = derived.speed;
                            data.vehicle.acceleration = derived.acceleration;
                            data.vehicle.risk = derived.risk;

                            let collision_risk = derived.risk >= COLLISION_RISK_THRESHOLD;
                            let above_limit = derived.speed > speed_limit;
                            data.vehicle.flags = [true, collision_risk, above_limit];

                            if collision_risk {
                                local_collision += 1;
                            }
                            if above_limit {
                                local_speeding += 1;
                            }
                        });
                    }

                    all.fetch_add(plates.len(), Ordering::Relaxed);
                    collision.fetch_add(local_collision, Ordering::Relaxed);
                    speeding.fetch_add(local_speeding, Ordering::Relaxed);
                });
            }
        });

        [all.load(Ordering::Relaxed), collision.load(Ordering::Relaxed), speeding.load(Ordering::Relaxed)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtelem_common::PlateKey;
    use simtelem_state::Position;
    use std::time::Duration;

    fn shared(num_workers: usize) -> std::sync::Arc<Shared> {
        Shared::new(num_workers, 64, 4, Duration::from_micros(1))
    }

    fn seed_vehicle(shared: &Shared, worker: usize, plate: &str, positions: &[(i64, u64)], highway_idx: usize) {
        let plate = PlateKey::from_str_exact(plate);
        for &(distance, cycle) in positions {
            let pos = Position { lane: 0, distance, cycle };
            shared
                .vehicle_index
                .get_or_insert_with(plate, highway_idx, pos, |data, inserted| {
                    if !inserted {
                        data.positions.push(pos);
                    }
                    data.vehicle.last_pos = pos;
                    data.vehicle.highway_index = highway_idx;
                });
            shared.highways.record_cycle(highway_idx, cycle, cycle as f64);
        }
        shared.buffers.with_worker(worker, |buf| buf.modified.push(plate));
    }

    #[test]
    fn counts_reflect_flags_of_touched_vehicles() {
        let shared = shared(2);
        let h = shared.highways.resolve_or_insert("H1", 4, 20.0);
        // Four cycles producing speed=30, above the 20 limit.
        seed_vehicle(&shared, 0, "SPEEDER", &[(0, 1), (30, 2), (60, 3), (90, 4)], h);
        // A single-sample vehicle: insufficient data, flags only ALL.
        seed_vehicle(&shared, 1, "NEWCAR0", &[(0, 1)], h);

        let counts = TransformStage::run(&shared);
        assert_eq!(counts[VehicleFilter::All.index()], 2);
        assert_eq!(counts[VehicleFilter::AboveSpeedLimit.index()], 1);

        let speeder = shared.vehicle_index.get(&PlateKey::from_str_exact("SPEEDER")).unwrap();
        assert!(speeder.vehicle.speed > 20.0);
        assert!(speeder.vehicle.matches(VehicleFilter::AboveSpeedLimit));

        let newcar = shared.vehicle_index.get(&PlateKey::from_str_exact("NEWCAR0")).unwrap();
        assert_eq!(newcar.vehicle.speed, -1.0);
        assert!(!newcar.vehicle.matches(VehicleFilter::AboveSpeedLimit));
    }
}
