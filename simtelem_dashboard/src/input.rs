//! Keyboard input reader: maps terminal key events to
//! [`DashboardState`](simtelem_state::DashboardState) transitions.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use simtelem_state::{DashboardState, VehicleFilter, VehicleIndex};
use simtelem_state::publish::PublishBuffers;

/// How long one `event::poll` call blocks before the loop re-checks
/// `should_exit` — keyboard input is the only other suspension point
/// besides the draw-signal wait.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct InputContext<'a> {
    pub index: &'a VehicleIndex,
    pub buffers: &'a PublishBuffers,
    pub state: &'a parking_lot::Mutex<DashboardState>,
    pub draw_signal: &'a parking_lot::Condvar,
}

/// Runs the blocking input loop until `should_exit` returns true. Each
/// recognized key that changes state wakes the redraw loop exactly once.
pub fn run_input_loop(ctx: &InputContext, should_exit: impl Fn() -> bool, request_shutdown: impl Fn()) {
    loop {
        if should_exit() {
            return;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "input poll failed, continuing");
                continue;
            }
        }
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "input read failed, continuing");
                continue;
            }
        };
        let Event::Key(key) = event else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(key.code, ctx) {
            KeyOutcome::Quit => {
                request_shutdown();
                return;
            }
            KeyOutcome::Changed => {
                let mut state = ctx.state.lock();
                state.should_draw = true;
                drop(state);
                ctx.draw_signal.notify_all();
            }
            KeyOutcome::Unchanged => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Changed,
    Unchanged,
    Quit,
}

/// Dispatches one recognized key to its `DashboardState` transition. Pulled
/// out of `run_input_loop` so the mapping can be exercised without a real
/// terminal.
fn handle_key(code: KeyCode, ctx: &InputContext) -> KeyOutcome {
    let changed = match code {
        KeyCode::Left => ctx.state.lock().find_previous(ctx.buffers, ctx.index),
        KeyCode::Right => ctx.state.lock().find_next(ctx.buffers, ctx.index),
        KeyCode::Char('t') => ctx.state.lock().set_filter(VehicleFilter::All, ctx.buffers, ctx.index),
        KeyCode::Char('r') => ctx.state.lock().set_filter(VehicleFilter::CollisionRisk, ctx.buffers, ctx.index),
        KeyCode::Char('v') => ctx.state.lock().set_filter(VehicleFilter::AboveSpeedLimit, ctx.buffers, ctx.index),
        KeyCode::Char('q') => return KeyOutcome::Quit,
        _ => false,
    };
    if changed { KeyOutcome::Changed } else { KeyOutcome::Unchanged }
}
