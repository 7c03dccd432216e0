//! Enrich stage: fills in owner/model/year for unenriched vehicles in the
//! just-published batch.
//!
//! Runs after [`crate::extract::ExtractStage::run`]/
//! [`crate::transform::TransformStage::run`] and after the orchestrator has
//! called `shared.buffers.publish_all()`, so each worker here iterates its
//! `processed` list rather than `modified`.

use crate::pipeline::Shared;

pub struct EnrichStage;

impl EnrichStage {
    /// Runs Enrich across `shared.num_workers` threads. Vehicles whose
    /// `year` is still unset are retried every batch that touches them;
    /// `SlowService::query` itself supplies the headroom guard by returning
    /// `None` under saturation instead of blocking.
    pub fn run(shared: &Shared) {
        std::thread::scope(|scope| {
            for worker in 0..shared.num_workers {
                scope.spawn(move || {
                    let plates = shared.buffers.processed_snapshot(worker);
                    for plate in plates {
                        let needs_enrichment = shared
                            .vehicle_index
                            .with_vehicle(&plate, |data| !data.vehicle.is_enriched())
                            .unwrap_or(false);
                        if !needs_enrichment {
                            continue;
                        }

                        let Some(record) = shared.enrichment.query(plate) else {
                            continue;
                        };

                        shared.vehicle_index.with_vehicle(&plate, |data| {
                            data.vehicle.name = Some(record.name);
                            data.vehicle.model = Some(record.model);
                            data.vehicle.year = Some(record.year);
                        });
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtelem_common::PlateKey;
    use simtelem_state::Position;
    use std::time::Duration;

    fn shared(num_workers: usize, queue_size: usize) -> std::sync::Arc<Shared> {
        Shared::new(num_workers, 64, queue_size, Duration::from_micros(50))
    }

    fn publish_one(shared: &Shared, worker: usize, plate: &str) {
        let plate = PlateKey::from_str_exact(plate);
        shared.vehicle_index.get_or_insert_with(plate, 0, Position { lane: 0, distance: 0, cycle: 1 }, |_, _| {});
        shared.buffers.with_worker(worker, |buf| buf.modified.push(plate));
        shared.buffers.publish_all();
    }

    #[test]
    fn enriches_unenriched_vehicle() {
        let shared = shared(2, 8);
        publish_one(&shared, 0, "AAA0001");

        EnrichStage::run(&shared);

        let data = shared.vehicle_index.get(&PlateKey::from_str_exact("AAA0001")).unwrap();
        assert!(data.vehicle.is_enriched());
        assert!(data.vehicle.year.is_some());
    }

    #[test]
    fn already_enriched_vehicle_is_not_requeried() {
        let shared = shared(1, 1);
        let plate = PlateKey::from_str_exact("AAA0001");
        shared.vehicle_index.get_or_insert_with(plate, 0, Position { lane: 0, distance: 0, cycle: 1 }, |data, _| {
            data.vehicle.name = Some("Already Enriched".to_string());
            data.vehicle.model = Some("Model".to_string());
            data.vehicle.year = Some(2020);
        });
        shared.buffers.with_worker(0, |buf| buf.modified.push(plate));
        shared.buffers.publish_all();

        EnrichStage::run(&shared);

        let data = shared.vehicle_index.get(&plate).unwrap();
        assert_eq!(data.vehicle.name.as_deref(), Some("Already Enriched"));
    }

    #[test]
    fn saturated_queue_leaves_vehicle_unenriched() {
        // queue_size=0: every query is rejected immediately.
        let shared = shared(1, 0);
        publish_one(&shared, 0, "AAA0001");

        EnrichStage::run(&shared);

        let data = shared.vehicle_index.get(&PlateKey::from_str_exact("AAA0001")).unwrap();
        assert!(!data.vehicle.is_enriched());
    }
}
