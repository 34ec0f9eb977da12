use std::io;
use std::sync::PoisonError;

use tracing::{info, warn};

use super::Controller;
use crate::backend::Backend;
use crate::ui::surface::{ChatRow, MessageRow, Surface};
use crate::ui::view;

impl<B, S> Controller<B, S>
where
    B: Backend,
    S: Surface,
{
    /// Redraw every pane under the gate.
    pub fn render(&self) {
        let mut surface = self.gate.lock();
        self.render_locked(&mut surface);
    }

    /// Redraw only the message pane, for changes inside the displayed chat.
    pub fn refresh_msgs(&self) {
        let mut surface = self.gate.lock();
        if let Err(err) = self.draw_msgs(&mut surface) {
            warn!(error = %err, "Failed to draw messages");
        }
    }

    /// Replace the status line text and draw it.
    pub fn update_status(&self, text: &str) {
        let mut surface = self.gate.lock();
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = text.to_string();
        if let Err(err) = surface.draw_status(text) {
            warn!(error = %err, "Failed to draw status line");
        }
    }

    pub fn present_info(&self, text: &str) {
        info!(status = %text, "Status");
        self.update_status(text);
    }

    pub fn present_error(&self, text: &str) {
        warn!(status = %text, "Action failed");
        self.update_status(&format!("Error: {text}"));
    }

    /// Wipe the screen, lay the panes out again for the terminal's current size
    /// and redraw everything.
    pub fn resize(&self, chat_ratio: f32) {
        let mut surface = self.gate.lock();
        let result = surface.size().and_then(|(rows, cols)| {
            surface.erase()?;
            surface.layout(rows, cols, chat_ratio);
            Ok(())
        });
        if let Err(err) = result {
            warn!(error = %err, "Failed to resize panes");
        }
        self.render_locked(&mut surface);
    }

    fn render_locked(&self, surface: &mut S) {
        let status = self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let result = self
            .draw_chats(surface)
            .and_then(|()| self.draw_msgs(surface))
            .and_then(|()| surface.draw_status(&status));
        if let Err(err) = result {
            warn!(error = %err, "Failed to render");
        }
    }

    fn draw_chats(&self, surface: &mut S) -> io::Result<()> {
        let threshold = self.config.scroll_threshold();
        let (window, chats) = self.store.chat_view(surface.chat_rows(), threshold);
        let rows: Vec<ChatRow> = chats.iter().map(view::chat_row).collect();
        surface.draw_chats(window.selected, &rows)
    }

    fn draw_msgs(&self, surface: &mut S) -> io::Result<()> {
        let threshold = self.config.scroll_threshold();
        let Some((chat, window, msgs)) = self.store.msg_view(surface.msg_rows(), threshold) else {
            return surface.draw_msgs(None, &[]);
        };
        let rows: Vec<MessageRow> = msgs
            .iter()
            .map(|msg| view::message_row(&self.store, Some(&chat), msg))
            .collect();
        let selected = (!rows.is_empty()).then_some(window.selected);
        surface.draw_msgs(selected, &rows)
    }
}
