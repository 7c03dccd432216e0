//! Transport-agnostic `SimulationCycle` wire record, plus the two reference
//! transports that satisfy the engine's ingest interface.
//!
//! - [`cycle`] - [`SimulationCycle`], [`HighwayDescriptor`], [`RawVehicle`]
//! - [`source`] - the [`CycleSource`] trait every transport implements
//! - [`file`] - the file-drop transport (rotating `<n>.csv`/`<n>.tmp`)
//! - [`rpc`] - the RPC-stream transport (line-delimited JSON over TCP)

pub mod cycle;
pub mod file;
pub mod rpc;
pub mod source;

pub use cycle::{HighwayDescriptor, RawVehicle, SimulationCycle};
pub use file::FileDropTransport;
pub use rpc::RpcTransport;
pub use simtelem_common::EngineResult;
pub use source::CycleSource;
