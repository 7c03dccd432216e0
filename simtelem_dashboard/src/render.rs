//! Renders the published snapshot to the terminal.
//!
//! Reads only `PublishBuffers`/`VehicleIndex`/`HighwayRegistry` — never the
//! ETL mutex — so a redraw never blocks an in-flight Extract/Transform pass.

use std::io::{Write, stdout};
use std::time::{SystemTime, UNIX_EPOCH};

use simtelem_common::EngineResult;
use simtelem_state::{DashboardState, HighwayRegistry, VehicleIndex};
use simtelem_state::publish::PublishBuffers;

use crate::terminal::CrosstermBackend;

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Draws one frame: a header with the active filter and counts, then one
/// line per published vehicle, with the cursor-selected entry marked.
pub fn draw(backend: &mut CrosstermBackend, state: &DashboardState, buffers: &PublishBuffers, index: &VehicleIndex, highways: &HighwayRegistry) -> EngineResult<()> {
    backend.clear_and_home()?;
    let mut out = stdout();
    let now = now_secs();

    writeln!(
        out,
        "simtelem dashboard  filter={}  count={}  selected={}\r",
        state.vehicle_filter.label(),
        state.num_vehicles[state.vehicle_filter.index()],
        state.absolute_value,
    )?;
    writeln!(out, "{:-<72}\r", "")?;

    for worker in 0..buffers.num_workers() {
        for slot in 0..buffers.processed_len(worker) {
            let Some(plate) = buffers.processed_at(worker, slot) else { continue };
            let Some(data) = index.get(&plate) else { continue };
            if !data.vehicle.matches(state.vehicle_filter) {
                continue;
            }
            let is_selected = state.cursor.worker == worker && state.cursor.slot == slot;
            let marker = if is_selected { '>' } else { ' ' };
            let owner = data.vehicle.name.as_deref().unwrap_or("(unenriched)");
            let highway = highways.name(data.vehicle.highway_index);
            let latency = highways.measure_latency(data.vehicle.highway_index, now);
            writeln!(
                out,
                "{marker} {plate} {highway:<8} speed={:>6.1} accel={:>6.2} risk={:>5.2} lat={:>5.2}s owner={owner}\r",
                data.vehicle.speed, data.vehicle.acceleration, data.vehicle.risk, latency,
            )?;
        }
    }

    out.flush()?;
    Ok(())
}
