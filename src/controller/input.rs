use ratatui::crossterm::event::{KeyCode, KeyModifiers};
use tracing::{debug, error, info};

use super::{ActionError, ActionResult, Controller, Mode, Transition};
use crate::backend::Backend;
use crate::ui::input::{InputEvent, InputSource};
use crate::ui::keys::ChordReader;
use crate::ui::surface::Surface;

/// Kind of file sent by the `s?` chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SendKind {
    Document,
    Photo,
    Audio,
    Video,
}

/// Chat cursor jump used by `J` / `K`.
const BIG_STEP: usize = 10;

impl<B, S> Controller<B, S>
where
    B: Backend,
    S: Surface,
{
    /// Run the input loop until the user quits or input closes.
    pub async fn run<I: InputSource>(&self, input: &mut I) {
        let mut reader = ChordReader::new();
        let mut mode = Mode::ChatList;
        self.resize(mode.chat_ratio());

        loop {
            let Some(event) = input.next_event().await else {
                info!("Input closed");
                break;
            };
            let (repeat, chord) = match event {
                InputEvent::Resize(cols, rows) => {
                    debug!(cols, rows, "Terminal resized");
                    self.resize(mode.chat_ratio());
                    continue;
                }
                InputEvent::Key(key) => match reader.feed(&key) {
                    Some(chord) => chord,
                    None => continue,
                },
            };

            let result = match mode {
                Mode::ChatList => self.on_chat_list_key(repeat, &chord).await,
                Mode::MessageList => self.on_msg_list_key(repeat, &chord, input).await,
            };
            let transition = match result {
                Ok(transition) => transition,
                Err(err) => {
                    self.report(&chord, &err);
                    Transition::Continue
                }
            };

            match (mode, transition) {
                (_, Transition::Quit) => break,
                (Mode::ChatList, Transition::Open) => {
                    mode = Mode::MessageList;
                    self.resize(mode.chat_ratio());
                }
                (Mode::MessageList, Transition::Back) => {
                    mode = Mode::ChatList;
                    self.resize(mode.chat_ratio());
                }
                _ => {}
            }
        }
    }

    fn report(&self, chord: &str, err: &ActionError) {
        match err {
            ActionError::Rejected(_) => debug!(%chord, error = %err, "Action rejected"),
            _ => error!(%chord, error = %err, "Action failed"),
        }
        self.present_error(&err.to_string());
    }

    pub(super) async fn on_chat_list_key(
        &self,
        repeat: usize,
        chord: &str,
    ) -> ActionResult<Transition> {
        match chord {
            "q" => return Ok(Transition::Quit),
            "l" | "^J" => {
                if self.store.current_chat_id().is_none() {
                    return Err(ActionError::rejected("No chats to open"));
                }
                return Ok(Transition::Open);
            }
            "j" | "^N" => self.moved(self.store.next_chat(repeat)),
            "k" | "^P" => self.moved(self.store.prev_chat(repeat)),
            "J" => self.moved(self.store.next_chat(BIG_STEP)),
            "K" => self.moved(self.store.prev_chat(BIG_STEP)),
            "gg" => self.moved(self.store.first_chat()),
            "G" => self.moved(self.store.last_chat()),
            "u" => self.toggle_unread().await?,
            "p" => self.toggle_pin().await?,
            "r" => self.mark_read().await?,
            "m" => self.toggle_mute().await?,
            other => debug!(chord = %other, "Unbound key in chat list"),
        }
        Ok(Transition::Continue)
    }

    pub(super) async fn on_msg_list_key<I: InputSource>(
        &self,
        repeat: usize,
        chord: &str,
        input: &mut I,
    ) -> ActionResult<Transition> {
        match chord {
            "q" => return Ok(Transition::Quit),
            "h" | "^H" | "^D" => return Ok(Transition::Back),
            "]" => self.moved(self.store.next_chat(repeat)),
            "[" => self.moved(self.store.prev_chat(repeat)),
            "j" | "^N" => self.msg_moved(self.store.next_msg(repeat)),
            "k" | "^P" => self.msg_moved(self.store.prev_msg(repeat)),
            "J" => self.msg_moved(self.store.next_msg(BIG_STEP)),
            "K" => self.msg_moved(self.store.prev_msg(BIG_STEP)),
            "G" => self.msg_moved(self.store.jump_bottom()),
            "gg" => self.msg_moved(self.store.jump_top()),
            "dd" => self.delete_msg().await?,
            "D" => self.download_current().await?,
            "l" => self.open_current_msg()?,
            "i" | "a" => self.write_short_msg(input).await?,
            "I" | "A" => self.write_long_msg().await?,
            "e" => self.edit_msg().await?,
            "sd" => self.send_file(input, SendKind::Document).await?,
            "sp" => self.send_file(input, SendKind::Photo).await?,
            "sa" => self.send_file(input, SendKind::Audio).await?,
            "sv" => self.send_file(input, SendKind::Video).await?,
            "v" => self.send_voice(input).await?,
            other => debug!(chord = %other, "Unbound key in message list"),
        }
        Ok(Transition::Continue)
    }

    fn moved(&self, moved: bool) {
        if moved {
            self.render();
        }
    }

    fn msg_moved(&self, moved: bool) {
        if moved {
            self.refresh_msgs();
        }
    }

    /// Read a line on the status row. `None` when cancelled with Esc or `^C`.
    pub(super) async fn prompt<I: InputSource>(
        &self,
        input: &mut I,
        label: &str,
    ) -> Option<String> {
        let mut line = String::new();
        self.update_status(label);
        loop {
            match input.next_event().await? {
                InputEvent::Resize(..) => self.resize(Mode::MessageList.chat_ratio()),
                InputEvent::Key(key) => {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    match key.code {
                        KeyCode::Enter => {
                            self.update_status("");
                            return Some(line);
                        }
                        KeyCode::Esc => {
                            self.update_status("");
                            return None;
                        }
                        KeyCode::Char('c') if ctrl => {
                            self.update_status("");
                            return None;
                        }
                        KeyCode::Char('u') if ctrl => line.clear(),
                        KeyCode::Backspace => {
                            line.pop();
                        }
                        KeyCode::Char(c) if !ctrl => line.push(c),
                        _ => continue,
                    }
                    self.update_status(&format!("{label}{line}"));
                }
            }
        }
    }

    /// Ask a `[Y/n]` question; anything but `n`, Esc or closed input is a yes.
    pub(super) async fn confirm<I: InputSource>(&self, input: &mut I, question: &str) -> bool {
        self.update_status(&format!("{question} [Y/n]"));
        let answer = loop {
            match input.next_event().await {
                None => break false,
                Some(InputEvent::Resize(..)) => self.resize(Mode::MessageList.chat_ratio()),
                Some(InputEvent::Key(key)) => {
                    break !matches!(key.code, KeyCode::Char('n' | 'N') | KeyCode::Esc)
                }
            }
        };
        self.update_status("");
        answer
    }
}
