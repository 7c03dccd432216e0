//! The ingest orchestrator: the single actor that accepts
//! [`SimulationCycle`] records from a transport, coalesces them per
//! highway, and launches an ETL run whenever none is already active.

use std::sync::Arc;
use std::time::Duration;

use simtelem_common::consts::TRANSPORT_TIMEOUT_MS;
use simtelem_state::VehicleFilter;
use simtelem_transport::{CycleSource, SimulationCycle};

use crate::enrich::EnrichStage;
use crate::extract::ExtractStage;
use crate::pipeline::Shared;
use crate::transform::TransformStage;

/// Runs the orchestrator's receive loop to completion (i.e. until
/// `shared.should_exit()`), polling `transport` with a bounded timeout so
/// shutdown is observed promptly — this poll is the only blocking wait in
/// the hot loop.
pub struct IngestOrchestrator {
    to_process: Vec<SimulationCycle>,
}

impl IngestOrchestrator {
    pub fn new() -> Self {
        Self { to_process: Vec::new() }
    }

    pub fn run(&mut self, transport: &mut dyn CycleSource, shared: &Arc<Shared>) {
        let timeout = Duration::from_millis(TRANSPORT_TIMEOUT_MS);
        loop {
            if shared.should_exit() {
                break;
            }

            if !self.to_process.is_empty() && shared.try_start_etl() {
                let batch = std::mem::take(&mut self.to_process);
                self.spawn_batch(batch, Arc::clone(shared));
            }

            match transport.recv_timeout(timeout) {
                Ok(Some(cycle)) => self.admit(cycle, shared),
                Ok(None) => {} // plain timeout, loop and re-check should_exit
                Err(err) => {
                    tracing::warn!(error = %err, "transport error, continuing");
                }
            }
        }
    }

    /// Resolves/records the cycle's highway bookkeeping and coalesces it
    /// into `to_process` — the freshest snapshot for a highway supersedes
    /// any older one already queued.
    fn admit(&mut self, cycle: SimulationCycle, shared: &Shared) {
        let highway_idx = shared.highways.resolve_or_insert(
            &cycle.highway.name,
            cycle.highway.lanes,
            cycle.highway.speed_limit,
        );
        shared.highways.record_cycle(highway_idx, cycle.cycle, cycle.timestamp);

        if let Some(existing) = self.to_process.iter_mut().find(|c| c.highway.name == cycle.highway.name) {
            *existing = cycle;
        } else {
            self.to_process.push(cycle);
        }
    }

    /// Spawns the detached batch runner thread that carries one ETL run
    /// (Extract → Transform → publish → Enrich → publish) to completion.
    fn spawn_batch(&self, batch: Vec<SimulationCycle>, shared: Arc<Shared>) {
        std::thread::spawn(move || {
            tracing::info!(cycles = batch.len(), "starting ETL batch");

            ExtractStage::run(&batch, &shared);
            let counts = TransformStage::run(&shared);

            shared.buffers.publish_all();
            {
                let mut dash = shared.dashboard.lock();
                let counts_map = [
                    counts[VehicleFilter::All.index()],
                    counts[VehicleFilter::CollisionRisk.index()],
                    counts[VehicleFilter::AboveSpeedLimit.index()],
                ];
                dash.on_publish(counts_map, &shared.buffers, &shared.vehicle_index);
            }
            shared.draw_signal.notify_all();

            EnrichStage::run(&shared);
            shared.signal_draw();

            shared.finish_etl();
            tracing::info!("ETL batch complete");
        });
    }
}

impl Default for IngestOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtelem_common::PlateKey;
    use simtelem_transport::{EngineResult, HighwayDescriptor, RawVehicle};
    use std::collections::VecDeque;
    use std::time::Duration as StdDuration;

    struct StubSource {
        cycles: VecDeque<SimulationCycle>,
    }

    impl CycleSource for StubSource {
        fn recv_timeout(&mut self, timeout: StdDuration) -> EngineResult<Option<SimulationCycle>> {
            if let Some(c) = self.cycles.pop_front() {
                Ok(Some(c))
            } else {
                std::thread::sleep(timeout.min(StdDuration::from_millis(5)));
                Ok(None)
            }
        }
    }

    fn cycle(highway: &str, n: u64, plate: &str) -> SimulationCycle {
        SimulationCycle {
            highway: HighwayDescriptor {
                name: highway.to_string(),
                lanes: 4,
                speed_limit: 20.0,
            },
            cycle: n,
            timestamp: n as f64,
            vehicles: vec![RawVehicle {
                plate: PlateKey::from_str_exact(plate),
                lane: 0,
                direction: 0,
                distance: n as i64 * 10,
            }],
        }
    }

    #[test]
    fn single_cycle_produces_a_published_vehicle() {
        let shared = Shared::new(2, 64, 4, StdDuration::from_micros(1));
        let mut source = StubSource {
            cycles: VecDeque::from(vec![cycle("H1", 1, "AAA0001")]),
        };
        let should_stop = Arc::clone(&shared);

        // Run the orchestrator on its own thread, stopping it once the one
        // queued cycle has clearly had time to flow through a batch.
        let handle = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let mut orchestrator = IngestOrchestrator::new();
                orchestrator.run(&mut source, &shared);
            })
        };

        std::thread::sleep(StdDuration::from_millis(200));
        should_stop.request_shutdown();
        handle.join().unwrap();

        let data = shared.vehicle_index.get(&PlateKey::from_str_exact("AAA0001"));
        assert!(data.is_some(), "vehicle should have been extracted by the batch runner");
    }

    #[test]
    fn coalesces_consecutive_cycles_for_same_highway() {
        let mut orchestrator = IngestOrchestrator::new();
        let shared = Shared::new(1, 64, 4, StdDuration::from_micros(1));
        orchestrator.admit(cycle("H1", 5, "AAA0001"), &shared);
        orchestrator.admit(cycle("H1", 6, "AAA0001"), &shared);
        assert_eq!(orchestrator.to_process.len(), 1, "only the freshest cycle is queued");
        assert_eq!(orchestrator.to_process[0].cycle, 6);
    }
}
