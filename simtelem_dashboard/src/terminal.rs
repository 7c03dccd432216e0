//! Raw-mode/alternate-screen terminal backend, adopted from
//! `freddiehaddad-oxidized/crates/core-terminal`'s `CrosstermBackend`/
//! `TerminalGuard` split so that `LeaveAlternateScreen`/`disable_raw_mode`
//! run even if a later step panics.

use std::io::{Write, stdout};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};

use simtelem_common::{EngineError, EngineResult};

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard: entering the alternate screen on construction, leaving it
/// (and restoring cooked mode) on drop, regardless of how the caller exits.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter_guard(&mut self) -> EngineResult<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard { backend: self })
    }

    fn enter(&mut self) -> EngineResult<()> {
        if !self.entered {
            enable_raw_mode().map_err(EngineError::Io)?;
            execute!(stdout(), EnterAlternateScreen, Hide).map_err(EngineError::Io)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> EngineResult<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show).map_err(EngineError::Io)?;
            disable_raw_mode().map_err(EngineError::Io)?;
            self.entered = false;
        }
        Ok(())
    }

    /// Clears the screen and moves the cursor home, for one redraw pass.
    pub fn clear_and_home(&mut self) -> EngineResult<()> {
        execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0)).map_err(EngineError::Io)?;
        stdout().flush().map_err(EngineError::Io)?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}
