//! The transport-agnostic `SimulationCycle` wire record.
//!
//! Both reference transports (file-drop, RPC-stream) parse their native
//! encoding into this same logical shape before handing it to
//! [`crate::CycleSource::recv_timeout`]'s caller — the ingest orchestrator
//! never sees a transport-specific type.

use serde::{Deserialize, Serialize};

use simtelem_common::PlateKey;

/// Static identity of a highway as reported by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighwayDescriptor {
    pub name: String,
    /// Total lane count across both directions (must be even).
    pub lanes: u32,
    pub speed_limit: f64,
}

/// One vehicle's raw observation within a cycle, before lane/direction
/// folding or history reconciliation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawVehicle {
    pub plate: PlateKey,
    /// Physical lane index, `0..lanes/2`.
    pub lane: u32,
    /// `0` or `1`; folded with `lane` into a single canonical lane index
    /// by the Extract stage.
    pub direction: u8,
    pub distance: i64,
}

/// One discrete simulator tick for one highway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationCycle {
    pub highway: HighwayDescriptor,
    pub cycle: u64,
    pub timestamp: f64,
    pub vehicles: Vec<RawVehicle>,
}
