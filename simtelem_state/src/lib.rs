//! Shared mutable ETL state.
//!
//! - [`vehicle`] - [`Position`], [`Vehicle`], [`VehicleData`], [`VehicleFilter`]
//! - [`index`] - [`VehicleIndex`], the sharded concurrent plate → data map
//! - [`highway`] - [`HighwayRegistry`], per-highway cycle/time bookkeeping
//! - [`publish`] - per-worker scratch buffers threaded through Extract/Transform/Enrich
//! - [`dashboard`] - [`DashboardState`], the navigation/filter state machine

pub mod dashboard;
pub mod highway;
pub mod index;
pub mod publish;
pub mod vehicle;

pub use dashboard::DashboardState;
pub use highway::{Highway, HighwayData, HighwayRegistry};
pub use index::VehicleIndex;
pub use publish::WorkerBuffer;
pub use vehicle::{Position, Vehicle, VehicleData, VehicleFilter};
