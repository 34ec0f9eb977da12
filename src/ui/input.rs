//! Key and resize events delivered to the input loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// New terminal size as `(cols, rows)`.
    Resize(u16, u16),
}

#[async_trait]
pub trait InputSource: Send {
    /// Next event, or `None` once input is closed.
    async fn next_event(&mut self) -> Option<InputEvent>;
}

/// Terminal input read by a background task.
///
/// The reader stops polling while the pause flag is set, so an external
/// program that owns the terminal gets every key typed into it.
pub struct TerminalInput {
    rx: mpsc::UnboundedReceiver<InputEvent>,
    paused: Arc<AtomicBool>,
    reader: tokio::task::JoinHandle<()>,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let paused = Arc::new(AtomicBool::new(false));
        let reader = spawn_event_reader(tx, paused.clone());
        Self { rx, paused, reader }
    }

    /// Flag shared with the surface; set while the terminal is suspended.
    pub fn pause_handle(&self) -> Arc<AtomicBool> {
        self.paused.clone()
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl InputSource for TerminalInput {
    async fn next_event(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }
}

fn spawn_event_reader(
    tx: mpsc::UnboundedSender<InputEvent>,
    paused: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if paused.load(Ordering::Acquire) {
                tokio::time::sleep(Duration::from_millis(20)).await;
                continue;
            }
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                let event = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        InputEvent::Key(key)
                    }
                    Ok(Event::Resize(cols, rows)) => InputEvent::Resize(cols, rows),
                    Ok(_) => continue,
                    Err(err) => {
                        warn!(error = %err, "Failed to read terminal event");
                        continue;
                    }
                };
                if tx.send(event).is_err() {
                    debug!("Input receiver dropped; stopping event reader");
                    break;
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}
