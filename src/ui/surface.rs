//! Drawing contract between the controller and the terminal.
//!
//! Implementations are only ever reached through the
//! [`RenderGate`](crate::ui::gate::RenderGate), so they can assume no two
//! draw calls overlap.

use std::io;

/// A chat as shown in the chat list pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRow {
    pub title: String,
    pub preview: String,
    pub date: String,
    pub unread_count: u32,
    pub is_pinned: bool,
    pub is_muted: bool,
    pub is_marked_as_unread: bool,
}

/// Download state of a message attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Remote,
    Downloading { percent: u8 },
    Local,
}

/// A message as shown in the message pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub sender: String,
    pub date: String,
    pub body: String,
    pub is_outgoing: bool,
    pub is_unread: bool,
    pub file: Option<FileState>,
}

pub trait Surface: Send {
    /// Terminal geometry as `(rows, cols)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Wipe everything on screen, including cells left over from a resize.
    fn erase(&mut self) -> io::Result<()>;

    /// Split the screen into chat, message and status panes.
    ///
    /// `chat_ratio` is the share of the width given to the chat list.
    fn layout(&mut self, rows: u16, cols: u16, chat_ratio: f32);

    /// Number of chats the chat pane can show.
    fn chat_rows(&self) -> usize;

    /// Number of messages the message pane can show.
    fn msg_rows(&self) -> usize;

    fn draw_chats(&mut self, selected: usize, chats: &[ChatRow]) -> io::Result<()>;

    /// `msgs` are newest first; `selected` is relative to that slice.
    fn draw_msgs(&mut self, selected: Option<usize>, msgs: &[MessageRow]) -> io::Result<()>;

    fn draw_status(&mut self, text: &str) -> io::Result<()>;

    /// Hand the terminal to an external program. Draws are dropped until
    /// [`Surface::resume`] is called.
    fn suspend(&mut self) -> io::Result<()>;

    fn resume(&mut self) -> io::Result<()>;

    fn is_suspended(&self) -> bool;
}
