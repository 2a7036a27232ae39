use std::io;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::debug;

/// Raw mode, alternate screen and hidden cursor for the queue view. The
/// terminal is restored on drop if `leave` was never reached.
pub(super) struct TuiSession {
    restored: bool,
}

impl TuiSession {
    pub(super) fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let session = Self { restored: false };
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("failed to switch to the queue screen")?;
        Ok(session)
    }

    pub(super) fn leave(mut self) -> Result<()> {
        self.restored = true;
        restore_terminal()
    }
}

fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)
        .context("failed to leave the queue screen")?;
    disable_raw_mode().context("failed to disable raw mode")
}

impl Drop for TuiSession {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = restore_terminal() {
            debug!("terminal restore on drop failed: {err:#}");
        }
    }
}
