//! End-to-end Extract → Transform → Enrich run against an in-memory
//! [`CycleSource`], exercising the full per-batch control flow without a
//! real transport.

use std::collections::VecDeque;
use std::time::Duration;

use simtelem_common::PlateKey;
use simtelem_etl::{EnrichStage, ExtractStage, Shared, TransformStage};
use simtelem_state::VehicleFilter;
use simtelem_transport::{CycleSource, EngineResult, HighwayDescriptor, RawVehicle, SimulationCycle};

struct VecSource {
    queue: VecDeque<SimulationCycle>,
}

impl CycleSource for VecSource {
    fn recv_timeout(&mut self, _timeout: Duration) -> EngineResult<Option<SimulationCycle>> {
        Ok(self.queue.pop_front())
    }
}

fn cycle(highway: &str, n: u64, entries: &[(&str, i64)]) -> SimulationCycle {
    SimulationCycle {
        highway: HighwayDescriptor {
            name: highway.to_string(),
            lanes: 4,
            speed_limit: 20.0,
        },
        cycle: n,
        timestamp: n as f64,
        vehicles: entries
            .iter()
            .map(|&(plate, distance)| RawVehicle {
                plate: PlateKey::from_str_exact(plate),
                lane: 0,
                direction: 0,
                distance,
            })
            .collect(),
    }
}

fn run_batch(shared: &Shared, batch: &[SimulationCycle]) -> [usize; VehicleFilter::COUNT] {
    ExtractStage::run(batch, shared);
    let counts = TransformStage::run(shared);
    shared.buffers.publish_all();
    EnrichStage::run(shared);
    counts
}

#[test]
fn four_cycle_run_produces_speed_accel_risk_and_enrichment() {
    let shared = Shared::new(2, 64, 8, Duration::from_millis(1));
    let plate = PlateKey::from_str_exact("AAA0001");

    // Four consecutive single-vehicle batches so positions accumulate the
    // way a live ingest loop would deliver them one cycle at a time.
    let mut counts = [0usize; VehicleFilter::COUNT];
    for (n, distance) in [(1u64, 0i64), (2, 15), (3, 35), (4, 60)] {
        let batch = vec![cycle("I-95", n, &[("AAA0001", distance)])];
        counts = run_batch(&shared, &batch);
    }

    assert_eq!(counts[VehicleFilter::All.index()], 1);

    let data = shared.vehicle_index.get(&plate).unwrap();
    assert_eq!(data.positions.len(), 4);
    assert!(data.vehicle.speed > 0.0, "speed should be derived after 4 samples");
    assert!(data.vehicle.risk >= 0.0, "risk should be derived after 4 samples");
    assert!(data.vehicle.is_enriched(), "enrich stage should have filled owner fields");
}

#[test]
fn orchestrator_drives_multiple_highways_through_a_vec_source() {
    use simtelem_etl::IngestOrchestrator;
    use std::sync::Arc;

    let shared = Shared::new(2, 64, 8, Duration::from_micros(1));
    let mut source = VecSource {
        queue: VecDeque::from(vec![
            cycle("I-95", 1, &[("AAA0001", 0)]),
            cycle("US-1", 1, &[("BBB0002", 0)]),
        ]),
    };

    let handle = {
        let shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            let mut orchestrator = IngestOrchestrator::new();
            orchestrator.run(&mut source, &shared);
        })
    };

    std::thread::sleep(Duration::from_millis(200));
    shared.request_shutdown();
    handle.join().unwrap();

    assert_eq!(shared.highways.len(), 2);
    assert!(shared.vehicle_index.contains(&PlateKey::from_str_exact("AAA0001")));
    assert!(shared.vehicle_index.contains(&PlateKey::from_str_exact("BBB0002")));
}
