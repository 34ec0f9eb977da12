//! Turning raw key presses into `(repeat, chord)` pairs.
//!
//! A numeric prefix sets the repeat factor (`5j`); chords like `dd` or `sp`
//! are buffered until they are complete or can no longer match.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Multi-key sequences understood by the input modes.
pub const CHORDS: &[&str] = &["dd", "gg", "sd", "sp", "sa", "sv", "bp"];

/// Name a key the way chords are spelled: `j`, `G`, `^N`, `^J` (enter).
pub fn key_name(key: &KeyEvent) -> Option<String> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(format!("^{}", c.to_ascii_uppercase()))
        }
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Enter => Some("^J".to_string()),
        KeyCode::Backspace => Some("^H".to_string()),
        KeyCode::Tab => Some("^I".to_string()),
        KeyCode::Down => Some("^N".to_string()),
        KeyCode::Up => Some("^P".to_string()),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct ChordReader {
    repeat: Option<usize>,
    pending: String,
}

impl ChordReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.repeat = None;
        self.pending.clear();
    }

    /// Feed one key; returns a finished `(repeat_factor, chord)` when ready.
    pub fn feed(&mut self, key: &KeyEvent) -> Option<(usize, String)> {
        if key.code == KeyCode::Esc {
            self.reset();
            return None;
        }
        let name = key_name(key)?;

        if self.pending.is_empty() && key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
            if let Some(digit) = single_digit(&name) {
                if digit != 0 || self.repeat.is_some() {
                    let repeat = self.repeat.unwrap_or(0);
                    self.repeat = Some(repeat.saturating_mul(10).saturating_add(digit));
                    return None;
                }
            }
        }

        self.pending.push_str(&name);
        let is_prefix = CHORDS
            .iter()
            .any(|chord| chord.len() > self.pending.len() && chord.starts_with(&self.pending));
        if is_prefix {
            return None;
        }

        let repeat = self.repeat.take().unwrap_or(1).max(1);
        Some((repeat, std::mem::take(&mut self.pending)))
    }
}

fn single_digit(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    c.to_digit(10).map(|d| d as usize)
}
