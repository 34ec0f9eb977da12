//! Scoped hand-over of the terminal to external programs.
//!
//! While a [`Suspension`] is alive the surface is out of raw mode and off the
//! alternate screen, and draws from the update task are dropped. Dropping the
//! guard always gives the terminal back, whatever happened inside the scope.

use std::io;
use std::path::Path;
use std::process::ExitStatus;

use tracing::{info, warn};

use crate::ui::gate::RenderGate;
use crate::ui::surface::Surface;
use crate::utils::shell;

pub struct Suspension<'a, S: Surface> {
    gate: &'a RenderGate<S>,
}

impl<'a, S: Surface> Suspension<'a, S> {
    pub fn enter(gate: &'a RenderGate<S>) -> io::Result<Self> {
        gate.lock().suspend()?;
        Ok(Self { gate })
    }

    /// Run a shell command with the terminal attached.
    pub fn call(&self, command_line: &str) -> io::Result<ExitStatus> {
        info!(command = %command_line, "Running external command");
        let status = shell::run(command_line)?;
        if !status.success() {
            warn!(command = %command_line, %status, "External command failed");
        }
        Ok(status)
    }

    /// Open `path` with the configured viewer command.
    pub fn open_file(&self, open_cmd: &str, path: &Path) -> io::Result<ExitStatus> {
        let path = path.to_string_lossy();
        self.call(&format!("{open_cmd} {}", shell::quote(&path)))
    }
}

impl<S: Surface> Drop for Suspension<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.gate.lock().resume() {
            warn!(error = %err, "Failed to restore terminal after external command");
        }
    }
}
