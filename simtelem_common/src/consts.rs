//! Workspace-wide constants.

/// Minimum worker thread count accepted by the ingest orchestrator. Below
/// this the pipeline cannot reserve its three fixed roles (dashboard input
/// reader, dashboard renderer, orchestrator) alongside at least two Extract
/// workers.
pub const MIN_THREADS: usize = 5;

/// Default bounded capacity of the `SlowService` enrichment queue.
pub const DEFAULT_QUEUE_SIZE: usize = 64;

/// Default blocking timeout, in milliseconds, a transport poll waits before
/// yielding control back to the orchestrator loop to check for shutdown.
pub const TRANSPORT_TIMEOUT_MS: u64 = 500;

/// Default number of rotating `<n>.csv`/`<n>.tmp` slots used by the
/// file-drop transport.
pub const N_FILES: usize = 5;

/// Default initial bucket count reserved in a freshly constructed vehicle
/// index.
pub const DEFAULT_MAP_SIZE: usize = 4096;

/// Risk threshold at or above which a vehicle is flagged as a collision
/// risk.
pub const COLLISION_RISK_THRESHOLD: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_threads_leaves_room_for_fixed_roles() {
        assert!(MIN_THREADS >= 5);
    }

    #[test]
    fn queue_size_and_map_size_are_non_zero() {
        assert!(DEFAULT_QUEUE_SIZE > 0);
        assert!(DEFAULT_MAP_SIZE > 0);
    }
}
