//! The client's control core.
//!
//! A [`Controller`] is shared by two execution contexts:
//! - the input loop ([`Controller::run`]) on the main task, which reads chords
//!   and drives the chat-list / message-list state machine;
//! - the update listener ([`Controller::listen`]) on a spawned task, which
//!   merges backend updates into the store.
//!
//! Both reach the screen only through the [`RenderGate`], and both mutate the
//! [`Store`] only through its merge operations.

mod actions;
mod dispatch;
pub mod error;
mod input;
mod render;

use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::Backend;
use crate::core::config::Config;
use crate::core::store::Store;
use crate::ui::gate::RenderGate;
use crate::ui::surface::Surface;
use crate::utils::media::{FfprobeMedia, MediaProbe};
use crate::utils::notify::{CommandNotifier, Notifier};

pub use error::{ActionError, ActionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ChatList,
    MessageList,
}

impl Mode {
    /// Share of the screen width given to the chat pane.
    pub fn chat_ratio(self) -> f32 {
        match self {
            Mode::ChatList => 0.5,
            Mode::MessageList => 0.2,
        }
    }
}

/// What the input loop does after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    /// Descend from the chat list into the selected chat's messages.
    Open,
    /// Return to the previous mode.
    Back,
    Quit,
}

pub struct Controller<B, S> {
    store: Store,
    gate: RenderGate<S>,
    backend: Arc<B>,
    config: Config,
    probe: Box<dyn MediaProbe>,
    notifier: Box<dyn Notifier>,
    status: Mutex<String>,
}

impl<B, S> Controller<B, S>
where
    B: Backend,
    S: Surface,
{
    pub fn new(backend: Arc<B>, surface: S, config: Config) -> Self {
        let notifier = CommandNotifier::new(config.notify_cmd());
        Self {
            store: Store::new(config.user_id()),
            gate: RenderGate::new(surface),
            backend,
            probe: Box::new(FfprobeMedia),
            notifier: Box::new(notifier),
            config,
            status: Mutex::new(String::new()),
        }
    }

    pub fn with_probe(mut self, probe: impl MediaProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn gate(&self) -> &RenderGate<S> {
        &self.gate
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> String {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
