//! Key-driven actions that talk to the backend or run external programs.
//!
//! Requests are fire-and-acknowledge: the resulting state change reaches the
//! store later as an update, so nothing here merges optimistically except the
//! local removal on delete.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::input::SendKind;
use super::{ActionError, ActionResult, Controller, Mode};
use crate::backend::{Backend, VideoMeta, VoiceMeta};
use crate::core::chat::Chat;
use crate::core::message::Message;
use crate::ui::input::InputSource;
use crate::ui::surface::Surface;
use crate::utils::shell;
use crate::utils::suspend::Suspension;

impl<B, S> Controller<B, S>
where
    B: Backend,
    S: Surface,
{
    fn selected_chat(&self) -> ActionResult<Chat> {
        self.store
            .current_chat_record()
            .ok_or_else(|| ActionError::rejected("No chat selected"))
    }

    fn selected_msg(&self) -> ActionResult<Message> {
        self.store
            .current_msg()
            .ok_or_else(|| ActionError::rejected("No message selected"))
    }

    /// Hand the terminal to `f`, then lay the screen out again.
    fn with_terminal<T>(
        &self,
        f: impl FnOnce(&Suspension<'_, S>) -> io::Result<T>,
    ) -> io::Result<T> {
        let result = Suspension::enter(&self.gate).and_then(|scope| f(&scope));
        self.resize(Mode::MessageList.chat_ratio());
        result
    }

    // ------------------------------------------------------------------
    // Chat toggles
    // ------------------------------------------------------------------

    pub(super) async fn toggle_unread(&self) -> ActionResult {
        let chat = self.selected_chat()?;
        let mark = !chat.is_marked_as_unread;
        self.backend
            .toggle_chat_is_marked_as_unread(chat.id, mark)
            .await?;
        self.present_info(if mark { "Marked as unread" } else { "Marked as read" });
        Ok(())
    }

    pub(super) async fn toggle_pin(&self) -> ActionResult {
        let chat = self.selected_chat()?;
        let pin = !chat.is_pinned;
        self.backend.toggle_chat_is_pinned(chat.id, pin).await?;
        self.present_info(if pin { "Chat pinned" } else { "Chat unpinned" });
        Ok(())
    }

    /// Report the chat's last message as viewed.
    pub(super) async fn mark_read(&self) -> ActionResult {
        let chat = self.selected_chat()?;
        let last_id = chat
            .last_message
            .as_ref()
            .map(|msg| msg.id)
            .or_else(|| self.store.msg_page(chat.id, 0, 1).first().map(|msg| msg.id))
            .ok_or_else(|| ActionError::rejected("No messages to mark as read"))?;
        self.backend.view_messages(chat.id, &[last_id]).await?;
        self.present_info("Marked as read");
        Ok(())
    }

    pub(super) async fn toggle_mute(&self) -> ActionResult {
        let chat = self.selected_chat()?;
        let settings = chat.notification_settings.toggled();
        self.backend
            .set_chat_notification_settings(chat.id, settings)
            .await?;
        self.present_info(if settings.is_muted() {
            "Chat muted"
        } else {
            "Chat unmuted"
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    pub(super) async fn delete_msg(&self) -> ActionResult {
        let msg = self
            .store
            .delete_current_msg()
            .ok_or_else(|| ActionError::rejected("No message selected"))?;
        self.refresh_msgs();
        self.backend.delete_messages(msg.chat_id, &[msg.id]).await?;
        info!(chat_id = msg.chat_id, msg_id = msg.id, "Deleted message");
        self.present_info("Message deleted");
        Ok(())
    }

    pub(super) async fn download_current(&self) -> ActionResult {
        let msg = self.selected_msg()?;
        let file = msg
            .file()
            .ok_or_else(|| ActionError::rejected("Message has no file"))?;
        if let Some(path) = msg.local_path() {
            self.present_info(&format!("Already downloaded: {path}"));
            return Ok(());
        }
        if self.store.download_target(file.id).is_some() {
            self.present_info("Download already in progress");
            return Ok(());
        }
        self.store.track_download(file.id, msg.chat_id, msg.id);
        if let Err(err) = self.backend.download_file(file.id).await {
            self.store.finish_download(file.id);
            return Err(err.into());
        }
        self.present_info("Downloading file");
        Ok(())
    }

    /// Show the selected message in the configured viewer.
    pub(super) fn open_current_msg(&self) -> ActionResult {
        let msg = self.selected_msg()?;
        let open_cmd = self.config.open_cmd();

        if let Some(text) = msg.text_content() {
            let mut file = tempfile::Builder::new()
                .prefix("termgram-")
                .suffix(".txt")
                .tempfile()?;
            io::Write::write_all(&mut file, text.as_bytes())?;
            let path = file.path().to_path_buf();
            self.with_terminal(|scope| scope.open_file(&open_cmd, &path))?;
            return Ok(());
        }

        if msg.file().is_none() {
            return Err(ActionError::rejected("Nothing to open in this message"));
        }
        let path = msg
            .local_path()
            .map(PathBuf::from)
            .ok_or_else(|| ActionError::rejected("File is not downloaded yet"))?;
        self.with_terminal(|scope| scope.open_file(&open_cmd, &path))?;
        Ok(())
    }

    pub(super) async fn write_short_msg<I: InputSource>(&self, input: &mut I) -> ActionResult {
        let chat = self.selected_chat()?;
        let Some(text) = self.prompt(input, "> ").await else {
            return Ok(());
        };
        if text.trim().is_empty() {
            return Ok(());
        }
        self.backend.send_text(chat.id, &text).await?;
        self.present_info("Message sent");
        Ok(())
    }

    /// Compose in the external editor and send whatever was saved.
    pub(super) async fn write_long_msg(&self) -> ActionResult {
        let chat = self.selected_chat()?;
        let Some(text) = self.edit_in_editor(&self.config.long_msg_cmd(), "")? else {
            self.present_info("Nothing to send");
            return Ok(());
        };
        self.backend.send_text(chat.id, &text).await?;
        self.present_info("Message sent");
        Ok(())
    }

    pub(super) async fn edit_msg(&self) -> ActionResult {
        let msg = self.selected_msg()?;
        if !self.store.is_me(msg.sender_id) {
            return Err(ActionError::rejected("You can edit only your messages!"));
        }
        let Some(original) = msg.text_content() else {
            return Err(ActionError::rejected("You can edit text messages only!"));
        };
        match self.edit_in_editor(&self.config.edit_cmd(), original)? {
            Some(text) if text != original => {
                self.backend
                    .edit_message_text(msg.chat_id, msg.id, &text)
                    .await?;
                self.present_info("Message edited");
                Ok(())
            }
            _ => {
                self.present_info("Message unchanged");
                Ok(())
            }
        }
    }

    /// Run the `{file_path}` command `template` on a scratch file seeded with
    /// `initial`.
    ///
    /// Returns the saved text without trailing newlines, or `None` if it is blank.
    fn edit_in_editor(&self, template: &str, initial: &str) -> ActionResult<Option<String>> {
        let file = tempfile::Builder::new()
            .prefix("termgram-")
            .suffix(".txt")
            .tempfile()?;
        fs::write(file.path(), initial)?;
        let path = file.path().to_string_lossy().into_owned();
        let command_line = shell::fill_template(template, &[("file_path", &path)]);

        let status = self.with_terminal(|scope| scope.call(&command_line))?;
        if !status.success() {
            return Err(ActionError::rejected(format!(
                "Editor exited with status {status}"
            )));
        }

        let text = fs::read_to_string(file.path())?;
        let text = text.trim_end();
        Ok((!text.trim().is_empty()).then(|| text.to_string()))
    }

    // ------------------------------------------------------------------
    // Files and voice
    // ------------------------------------------------------------------

    pub(super) async fn send_file<I: InputSource>(
        &self,
        input: &mut I,
        kind: SendKind,
    ) -> ActionResult {
        let chat = self.selected_chat()?;
        let Some(raw) = self.prompt(input, "Path: ").await else {
            return Ok(());
        };
        let path = expand_home(raw.trim());
        if !path.is_file() {
            return Err(ActionError::rejected(format!(
                "File not found: {}",
                path.display()
            )));
        }

        debug!(?kind, path = %path.display(), "Sending file");
        match kind {
            SendKind::Document => self.backend.send_document(chat.id, &path).await?,
            SendKind::Photo => self.backend.send_photo(chat.id, &path).await?,
            SendKind::Audio => self.backend.send_audio(chat.id, &path).await?,
            SendKind::Video => {
                let (width, height) = self.probe.video_resolution(&path)?;
                let duration = self.probe.duration(&path)?;
                let meta = VideoMeta {
                    width,
                    height,
                    duration,
                };
                self.backend.send_video(chat.id, &path, meta).await?
            }
        }
        self.present_info(&format!("Sent {}", path.display()));
        Ok(())
    }

    /// Record with `record_cmd`, confirm, then send with duration and waveform.
    pub(super) async fn send_voice<I: InputSource>(&self, input: &mut I) -> ActionResult {
        let chat = self.selected_chat()?;
        let name = format!(
            "voice-{}.oga",
            chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
        );
        let path = self.config.voice_dir().join(name);
        let path_text = path.to_string_lossy().into_owned();
        let command_line =
            shell::fill_template(&self.config.record_cmd(), &[("file_path", &path_text)]);

        self.with_terminal(|scope| scope.call(&command_line))?;

        if !self.confirm(input, "Send the recording?").await {
            discard(&path);
            self.present_info("Voice note discarded");
            return Ok(());
        }
        if !path.is_file() {
            return Err(ActionError::rejected(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let meta = VoiceMeta {
            duration: self.probe.duration(&path)?,
            waveform: self.probe.waveform(&path)?,
        };
        self.backend.send_voice(chat.id, &path, meta).await?;
        self.present_info("Voice note sent");
        Ok(())
    }
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed discarded recording"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "Failed to remove recording"),
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
