//! ratatui implementation of [`Surface`].
//!
//! Each draw call updates a cached copy of its pane and repaints the whole
//! frame from the cache, so panes drawn at different times stay consistent.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ratatui::crossterm::terminal;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::debug;

use crate::ui::lifecycle::{self, TermBackend};
use crate::ui::surface::{ChatRow, FileState, MessageRow, Surface};
use crate::ui::view::truncate;

/// Borders take one row above and one below each pane's content.
const PANE_CHROME: u16 = 2;

#[derive(Debug, Default)]
struct Frames {
    chats: Vec<ChatRow>,
    chat_selected: usize,
    msgs: Vec<MessageRow>,
    msg_selected: Option<usize>,
    status: String,
}

pub struct TerminalSurface {
    terminal: Terminal<TermBackend>,
    input_paused: Arc<AtomicBool>,
    frames: Frames,
    chat_ratio: f32,
    chat_rows: usize,
    msg_rows: usize,
    suspended: bool,
}

impl TerminalSurface {
    /// Take over the terminal. `input_paused` is raised while suspended.
    pub fn new(input_paused: Arc<AtomicBool>) -> io::Result<Self> {
        let terminal = lifecycle::setup_terminal()?;
        let mut surface = Self {
            terminal,
            input_paused,
            frames: Frames::default(),
            chat_ratio: 0.5,
            chat_rows: 0,
            msg_rows: 0,
            suspended: false,
        };
        let (rows, cols) = surface.size()?;
        surface.layout(rows, cols, surface.chat_ratio);
        Ok(surface)
    }

    pub fn restore(&mut self) -> io::Result<()> {
        lifecycle::restore_terminal(&mut self.terminal)
    }

    fn redraw(&mut self) -> io::Result<()> {
        if self.suspended {
            return Ok(());
        }
        let frames = &self.frames;
        let ratio = self.chat_ratio;
        self.terminal.draw(|f| draw_frame(f, frames, ratio))?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        let (cols, rows) = terminal::size()?;
        Ok((rows, cols))
    }

    fn erase(&mut self) -> io::Result<()> {
        if self.suspended {
            return Ok(());
        }
        self.terminal.clear()
    }

    fn layout(&mut self, rows: u16, cols: u16, chat_ratio: f32) {
        self.chat_ratio = chat_ratio.clamp(0.0, 1.0);
        let body = rows.saturating_sub(1).saturating_sub(PANE_CHROME) as usize;
        self.chat_rows = body;
        self.msg_rows = body;
        debug!(rows, cols, chat_ratio, "Laid out panes");
    }

    fn chat_rows(&self) -> usize {
        self.chat_rows
    }

    fn msg_rows(&self) -> usize {
        self.msg_rows
    }

    fn draw_chats(&mut self, selected: usize, chats: &[ChatRow]) -> io::Result<()> {
        self.frames.chat_selected = selected;
        self.frames.chats = chats.to_vec();
        self.redraw()
    }

    fn draw_msgs(&mut self, selected: Option<usize>, msgs: &[MessageRow]) -> io::Result<()> {
        self.frames.msg_selected = selected;
        self.frames.msgs = msgs.to_vec();
        self.redraw()
    }

    fn draw_status(&mut self, text: &str) -> io::Result<()> {
        self.frames.status = text.to_string();
        self.redraw()
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.input_paused.store(true, Ordering::Release);
        self.suspended = true;
        lifecycle::leave_tui(&mut self.terminal)
    }

    fn resume(&mut self) -> io::Result<()> {
        let result = lifecycle::enter_tui(&mut self.terminal);
        self.suspended = false;
        self.input_paused.store(false, Ordering::Release);
        result
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

fn draw_frame(f: &mut Frame, frames: &Frames, chat_ratio: f32) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let chat_pct = (chat_ratio * 100.0).round() as u16;
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(chat_pct),
            Constraint::Percentage(100 - chat_pct.min(100)),
        ])
        .split(rows[0]);

    draw_chat_pane(f, panes[0], frames);
    draw_msg_pane(f, panes[1], frames);

    let status = truncate(&frames.status, rows[1].width as usize);
    f.render_widget(Paragraph::new(status), rows[1]);
}

fn draw_chat_pane(f: &mut Frame, area: Rect, frames: &Frames) {
    let width = area.width.saturating_sub(PANE_CHROME) as usize;
    let lines: Vec<Line> = frames
        .chats
        .iter()
        .enumerate()
        .map(|(i, chat)| {
            let mut marks = String::new();
            if chat.is_pinned {
                marks.push('*');
            }
            if chat.is_muted {
                marks.push('~');
            }
            if chat.unread_count > 0 {
                marks.push_str(&format!("[{}]", chat.unread_count));
            } else if chat.is_marked_as_unread {
                marks.push_str("[!]");
            }
            let text = format!("{marks} {} {} {}", chat.date, chat.title, chat.preview);
            let mut style = Style::default();
            if chat.unread_count > 0 || chat.is_marked_as_unread {
                style = style.add_modifier(Modifier::BOLD);
            }
            if i == frames.chat_selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(truncate(text.trim_start(), width), style))
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).title("Chats");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_msg_pane(f: &mut Frame, area: Rect, frames: &Frames) {
    let width = area.width.saturating_sub(PANE_CHROME) as usize;
    let height = area.height.saturating_sub(PANE_CHROME) as usize;
    // Rows arrive newest first; the newest message sits at the bottom.
    let mut lines: Vec<Line> = frames
        .msgs
        .iter()
        .enumerate()
        .rev()
        .map(|(i, msg)| {
            let file = match msg.file {
                Some(FileState::Remote) => " [remote]".to_string(),
                Some(FileState::Downloading { percent }) => format!(" [{percent}%]"),
                Some(FileState::Local) => " [local]".to_string(),
                None => String::new(),
            };
            let body = msg.body.replace('\n', " ");
            let text = format!("{} {}: {}{}", msg.date, msg.sender, body, file);
            let mut style = if msg.is_outgoing {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            if msg.is_unread {
                style = style.add_modifier(Modifier::BOLD);
            }
            if Some(i) == frames.msg_selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(truncate(text.trim_start(), width), style))
        })
        .collect();
    if lines.len() < height {
        let mut padded = vec![Line::default(); height - lines.len()];
        padded.append(&mut lines);
        lines = padded;
    }
    let block = Block::default().borders(Borders::ALL).title("Messages");
    f.render_widget(Paragraph::new(lines).block(block), area);
}
