use std::io::{self, Stdout};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;

pub type TermBackend = CrosstermBackend<Stdout>;

pub fn setup_terminal() -> io::Result<Terminal<TermBackend>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;

    Terminal::new(CrosstermBackend::new(stdout)).inspect_err(|_| {
        let _ = disable_raw_mode();
    })
}

pub fn restore_terminal(terminal: &mut Terminal<TermBackend>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()
}

/// Give the terminal back to the shell for an external program.
pub fn leave_tui(terminal: &mut Terminal<TermBackend>) -> io::Result<()> {
    restore_terminal(terminal)
}

/// Take the terminal again after an external program exits.
pub fn enter_tui(terminal: &mut Terminal<TermBackend>) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen, Hide)?;
    terminal.clear()
}
