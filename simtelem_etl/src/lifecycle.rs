//! Shutdown/lifecycle helpers.
//!
//! `Shared::request_shutdown` is the single `quit()` path every trigger —
//! the dashboard's `'q'` key, `ctrlc`, and the optional server timeout below
//! — converges on: one shutdown path, cooperative, bounded.

use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::Shared;

/// Spawns a thread that calls [`Shared::request_shutdown`] after `timeout`
/// unless shutdown has already been requested. A `timeout` of zero means
/// "run until `'q'`" — no thread is spawned.
pub fn spawn_timeout_shutdown(shared: Arc<Shared>, timeout: Duration) -> Option<std::thread::JoinHandle<()>> {
    if timeout.is_zero() {
        return None;
    }
    Some(std::thread::spawn(move || {
        let poll = Duration::from_millis(200);
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if shared.should_exit() {
                return;
            }
            std::thread::sleep(poll.min(deadline.saturating_duration_since(std::time::Instant::now())));
        }
        if !shared.should_exit() {
            tracing::info!(?timeout, "server timeout reached, requesting shutdown");
            shared.request_shutdown();
        }
    }))
}
