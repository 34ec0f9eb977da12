//! Offline backend that answers every request the way a server would.
//!
//! It keeps just enough session state (chat orders, known files, id counters)
//! to push back the updates a real session would emit, which makes the
//! client usable without a network and gives tests a realistic loop.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::{Backend, BackendError, BackendResult, VideoMeta, VoiceMeta};
use crate::core::chat::{Chat, NotificationSettings, User};
use crate::core::message::{File, FormattedText, LocalFile, Message, MessageContent};

#[derive(Debug, Clone)]
struct KnownFile {
    path: String,
    size: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    chats: HashMap<i64, Chat>,
    files: HashMap<i64, KnownFile>,
    next_msg_id: i64,
    next_file_id: i64,
    next_order: i64,
    echo: Option<(i64, User)>,
}

impl SessionState {
    fn chat_mut(&mut self, chat_id: i64) -> Result<&mut Chat, BackendError> {
        self.chats
            .get_mut(&chat_id)
            .ok_or_else(|| BackendError::new(format!("chat {chat_id} not found")))
    }

    fn bump_order(&mut self, chat_id: i64) -> Result<i64, BackendError> {
        self.next_order += 1;
        let order = self.next_order;
        self.chat_mut(chat_id)?.order = order;
        Ok(order)
    }

    fn next_msg_id(&mut self) -> i64 {
        self.next_msg_id += 1;
        self.next_msg_id
    }
}

pub struct LocalBackend {
    me: User,
    tx: mpsc::UnboundedSender<Value>,
    state: Mutex<SessionState>,
}

impl LocalBackend {
    pub fn new(me: User) -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Self {
            me,
            tx,
            state: Mutex::new(SessionState {
                next_msg_id: 1000,
                next_file_id: 100,
                next_order: 100,
                ..SessionState::default()
            }),
        };
        (backend, rx)
    }

    /// A session with "Saved Messages" and an echo chat, used by the binary.
    pub fn demo(me: User) -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (backend, rx) = Self::new(me.clone());
        let echo = User {
            id: me.id + 1,
            first_name: "Echo".into(),
            last_name: "Bot".into(),
        };

        backend.add_user(me.clone());
        backend.add_user(echo.clone());
        backend.add_chat(Chat {
            id: me.id,
            title: "Saved Messages".into(),
            order: 2,
            ..Chat::default()
        });
        backend.add_chat(Chat {
            id: echo.id,
            title: echo.display_name(),
            order: 1,
            ..Chat::default()
        });
        backend.lock().echo = Some((echo.id, echo.clone()));
        backend.push_incoming(echo.id, echo.id, "Hi! Anything you send here comes back.");
        (backend, rx)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, update: Value) {
        if self.tx.send(update).is_err() {
            debug!("Update receiver dropped; discarding local update");
        }
    }

    pub fn add_user(&self, user: User) {
        self.emit(json!({"@type": "updateUser", "user": user}));
    }

    pub fn add_chat(&self, chat: Chat) {
        {
            let mut state = self.lock();
            state.next_order = state.next_order.max(chat.order);
            state.chats.insert(chat.id, chat.clone());
        }
        self.emit(json!({"@type": "updateNewChat", "chat": chat}));
    }

    /// Make a file known so that [`Backend::download_file`] can complete it.
    pub fn register_remote_file(&self, file_id: i64, path: impl Into<String>, size: u64) {
        self.lock().files.insert(
            file_id,
            KnownFile {
                path: path.into(),
                size,
            },
        );
    }

    /// Deliver a text message from another user.
    pub fn push_incoming(&self, chat_id: i64, sender_id: i64, text: &str) {
        let message = {
            let mut state = self.lock();
            let id = state.next_msg_id();
            Message {
                date: chrono::Utc::now().timestamp(),
                ..Message::text(chat_id, id, sender_id, text)
            }
        };
        self.deliver(message);
    }

    fn deliver(&self, message: Message) {
        let order = self.lock().bump_order(message.chat_id).ok();
        self.emit(json!({"@type": "updateNewMessage", "message": message}));
        if let Some(order) = order {
            self.emit(json!({
                "@type": "updateChatLastMessage",
                "chat_id": message.chat_id,
                "last_message": message,
                "order": order,
            }));
        }
    }

    /// Emit the pending echo of an outgoing message, then its confirmation.
    fn send(&self, chat_id: i64, content: MessageContent) -> BackendResult {
        let (pending, sent, order, echo) = {
            let mut state = self.lock();
            let order = state.bump_order(chat_id)?;
            let pending_id = state.next_msg_id();
            let sent_id = state.next_msg_id();
            let pending = Message {
                id: pending_id,
                chat_id,
                sender_id: self.me.id,
                date: chrono::Utc::now().timestamp(),
                content,
            };
            let sent = Message {
                id: sent_id,
                ..pending.clone()
            };
            let echo = state
                .echo
                .as_ref()
                .filter(|(echo_chat, _)| *echo_chat == chat_id)
                .map(|(_, bot)| bot.id);
            (pending, sent, order, echo)
        };

        let old_message_id = pending.id;
        self.emit(json!({"@type": "updateNewMessage", "message": pending}));
        self.emit(json!({
            "@type": "updateMessageSendSucceeded",
            "message": sent,
            "old_message_id": old_message_id,
        }));
        self.emit(json!({
            "@type": "updateChatLastMessage",
            "chat_id": chat_id,
            "last_message": sent,
            "order": order,
        }));

        if let Some(bot_id) = echo {
            self.push_incoming(chat_id, bot_id, &format!("echo: {}", sent.preview()));
        }
        Ok(())
    }

    async fn local_file(&self, path: &Path) -> Result<File, BackendError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| BackendError::new(format!("{}: {err}", path.display())))?;
        let path = path.to_string_lossy().into_owned();
        let size = metadata.len();
        let mut state = self.lock();
        state.next_file_id += 1;
        let id = state.next_file_id;
        state.files.insert(
            id,
            KnownFile {
                path: path.clone(),
                size,
            },
        );
        Ok(File {
            id,
            size,
            local: LocalFile {
                path,
                is_downloading_completed: true,
                downloaded_size: size,
            },
        })
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn send_text(&self, chat_id: i64, text: &str) -> BackendResult {
        self.send(chat_id, MessageContent::Text { text: text.into() })
    }

    async fn send_photo(&self, chat_id: i64, path: &Path) -> BackendResult {
        let file = self.local_file(path).await?;
        self.send(
            chat_id,
            MessageContent::Photo {
                caption: FormattedText::default(),
                file,
            },
        )
    }

    async fn send_document(&self, chat_id: i64, path: &Path) -> BackendResult {
        let file = self.local_file(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.send(
            chat_id,
            MessageContent::Document {
                file_name,
                caption: FormattedText::default(),
                file,
            },
        )
    }

    async fn send_audio(&self, chat_id: i64, path: &Path) -> BackendResult {
        let file = self.local_file(path).await?;
        let title = path
            .file_stem()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.send(
            chat_id,
            MessageContent::Audio {
                title,
                performer: String::new(),
                duration: 0,
                file,
            },
        )
    }

    async fn send_video(&self, chat_id: i64, path: &Path, meta: VideoMeta) -> BackendResult {
        let file = self.local_file(path).await?;
        self.send(
            chat_id,
            MessageContent::Video {
                width: meta.width,
                height: meta.height,
                duration: meta.duration,
                caption: FormattedText::default(),
                file,
            },
        )
    }

    async fn send_voice(&self, chat_id: i64, path: &Path, meta: VoiceMeta) -> BackendResult {
        let file = self.local_file(path).await?;
        self.send(
            chat_id,
            MessageContent::VoiceNote {
                duration: meta.duration,
                waveform: meta.waveform,
                file,
            },
        )
    }

    async fn edit_message_text(&self, chat_id: i64, msg_id: i64, text: &str) -> BackendResult {
        self.lock().chat_mut(chat_id)?;
        let new_content = MessageContent::Text { text: text.into() };
        self.emit(json!({
            "@type": "updateMessageContent",
            "chat_id": chat_id,
            "message_id": msg_id,
            "new_content": new_content,
        }));
        Ok(())
    }

    async fn delete_messages(&self, chat_id: i64, msg_ids: &[i64]) -> BackendResult {
        self.lock().chat_mut(chat_id)?;
        self.emit(json!({
            "@type": "updateDeleteMessages",
            "chat_id": chat_id,
            "message_ids": msg_ids,
            "is_permanent": true,
        }));
        Ok(())
    }

    async fn download_file(&self, file_id: i64) -> BackendResult {
        let known = self
            .lock()
            .files
            .get(&file_id)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("file {file_id} not found")))?;
        let file = File {
            id: file_id,
            size: known.size,
            local: LocalFile {
                path: known.path,
                is_downloading_completed: true,
                downloaded_size: known.size,
            },
        };
        self.emit(json!({"@type": "updateFile", "file": file}));
        Ok(())
    }

    async fn toggle_chat_is_pinned(&self, chat_id: i64, is_pinned: bool) -> BackendResult {
        let order = {
            let mut state = self.lock();
            let chat = state.chat_mut(chat_id)?;
            chat.is_pinned = is_pinned;
            chat.order
        };
        self.emit(json!({
            "@type": "updateChatIsPinned",
            "chat_id": chat_id,
            "is_pinned": is_pinned,
            "order": order,
        }));
        Ok(())
    }

    async fn toggle_chat_is_marked_as_unread(
        &self,
        chat_id: i64,
        is_marked_as_unread: bool,
    ) -> BackendResult {
        self.lock().chat_mut(chat_id)?.is_marked_as_unread = is_marked_as_unread;
        self.emit(json!({
            "@type": "updateChatIsMarkedAsUnread",
            "chat_id": chat_id,
            "is_marked_as_unread": is_marked_as_unread,
        }));
        Ok(())
    }

    async fn set_chat_notification_settings(
        &self,
        chat_id: i64,
        settings: NotificationSettings,
    ) -> BackendResult {
        self.lock().chat_mut(chat_id)?.notification_settings = settings;
        self.emit(json!({
            "@type": "updateChatNotificationSettings",
            "chat_id": chat_id,
            "notification_settings": settings,
        }));
        Ok(())
    }

    async fn view_messages(&self, chat_id: i64, msg_ids: &[i64]) -> BackendResult {
        let last_read = {
            let mut state = self.lock();
            let chat = state.chat_mut(chat_id)?;
            let last_read = msg_ids
                .iter()
                .copied()
                .max()
                .unwrap_or(chat.last_read_inbox_message_id)
                .max(chat.last_read_inbox_message_id);
            chat.last_read_inbox_message_id = last_read;
            chat.unread_count = 0;
            last_read
        };
        self.emit(json!({
            "@type": "updateChatReadInbox",
            "chat_id": chat_id,
            "last_read_inbox_message_id": last_read,
            "unread_count": 0,
        }));
        Ok(())
    }
}
