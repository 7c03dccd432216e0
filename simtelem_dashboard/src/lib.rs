//! Terminal dashboard: crossterm renderer, input reader, and the redraw
//! loop that ties them to [`DashboardState`](simtelem_state::DashboardState).
//!
//! - [`terminal`] - [`terminal::CrosstermBackend`]/[`terminal::TerminalGuard`]
//! - [`input`] - the blocking keyboard-input loop
//! - [`render`] - one redraw pass over the published snapshot

pub mod input;
pub mod render;
pub mod terminal;

use parking_lot::{Condvar, Mutex};

use simtelem_common::EngineResult;
use simtelem_state::{DashboardState, HighwayRegistry, VehicleIndex};
use simtelem_state::publish::PublishBuffers;

use input::InputContext;
use terminal::CrosstermBackend;

/// Everything the dashboard needs borrowed from the engine's shared state.
/// Deliberately independent of `simtelem_etl::Shared` — the dashboard crate
/// only reads state, never starts an ETL batch, so it borrows the specific
/// pieces it needs rather than depending on the whole pipeline crate.
pub struct DashboardDeps<'a> {
    pub index: &'a VehicleIndex,
    pub highways: &'a HighwayRegistry,
    pub buffers: &'a PublishBuffers,
    pub state: &'a Mutex<DashboardState>,
    pub draw_signal: &'a Condvar,
}

/// Runs the dashboard to completion: enters the alternate screen, spawns
/// the input-reader thread, and redraws on the calling thread every time
/// `should_draw` is set, until `should_exit` returns true.
pub fn run(deps: &DashboardDeps, should_exit: impl Fn() -> bool + Sync, request_shutdown: impl Fn() + Sync) -> EngineResult<()> {
    let mut backend = CrosstermBackend::new();
    let _guard = backend.enter_guard()?;

    std::thread::scope(|scope| {
        let input_ctx = InputContext {
            index: deps.index,
            buffers: deps.buffers,
            state: deps.state,
            draw_signal: deps.draw_signal,
        };
        scope.spawn(|| input::run_input_loop(&input_ctx, &should_exit, &request_shutdown));

        redraw_loop(deps, &mut backend, &should_exit);
    });

    Ok(())
}

fn redraw_loop(deps: &DashboardDeps, backend: &mut CrosstermBackend, should_exit: &impl Fn() -> bool) {
    loop {
        {
            let mut state = deps.state.lock();
            if !state.should_draw {
                deps.draw_signal.wait_for(&mut state, std::time::Duration::from_millis(200));
            }
            if should_exit() {
                return;
            }
            if !state.should_draw {
                continue;
            }
            state.should_draw = false;
        }

        let state = deps.state.lock().clone();
        if let Err(err) = render::draw(backend, &state, deps.buffers, deps.index, deps.highways) {
            tracing::warn!(error = %err, "dashboard redraw failed");
        }

        if should_exit() {
            return;
        }
    }
}
