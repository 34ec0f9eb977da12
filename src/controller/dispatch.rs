use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::Controller;
use crate::backend::Backend;
use crate::core::chat::ChatPatch;
use crate::core::message::Message;
use crate::core::update::{Update, UpdateError};
use crate::ui::surface::Surface;
use crate::ui::view;

impl<B, S> Controller<B, S>
where
    B: Backend,
    S: Surface,
{
    /// Apply backend updates until the channel closes.
    pub async fn listen(&self, mut updates: mpsc::UnboundedReceiver<Value>) {
        while let Some(raw) = updates.recv().await {
            self.dispatch(raw).await;
        }
        info!("Update channel closed");
    }

    /// Merge one raw update into the store and redraw what it touched.
    pub async fn dispatch(&self, raw: Value) {
        let update = match Update::from_value(raw) {
            Ok(update) => update,
            Err(UpdateError::UnknownKind(kind)) => {
                debug!(%kind, "Ignoring unhandled update");
                return;
            }
            Err(err) => {
                warn!(error = %err, "Dropping malformed update");
                return;
            }
        };
        debug!(kind = update.kind(), "Dispatching update");

        match update {
            Update::NewChat { chat } => {
                self.store.insert_chat(chat);
                self.render();
            }
            Update::User { user } => self.store.upsert_user(user),
            Update::NewMessage { message } => self.on_new_message(message).await,
            Update::MessageContent {
                chat_id,
                message_id,
                new_content,
            } => {
                if self.store.update_msg_content(chat_id, message_id, new_content) {
                    self.refresh_if_current(chat_id);
                }
            }
            Update::MessageSendSucceeded {
                message,
                old_message_id,
            } => {
                let chat_id = message.chat_id;
                self.store.remove_message(chat_id, old_message_id);
                self.store.add_message(message);
                self.refresh_if_current(chat_id);
            }
            Update::DeleteMessages {
                chat_id,
                message_ids,
                is_permanent,
            } => {
                if !is_permanent {
                    debug!(chat_id, "Ignoring non-permanent message deletion");
                    return;
                }
                let removed = message_ids
                    .iter()
                    .filter(|id| self.store.remove_message(chat_id, **id).is_some())
                    .count();
                if removed > 0 {
                    self.refresh_if_current(chat_id);
                }
            }
            Update::ChatOrder { chat_id, order } => self.merge_chat(chat_id, ChatPatch::order(order)),
            Update::ChatTitle { chat_id, title } => self.merge_chat(chat_id, ChatPatch::title(title)),
            Update::ChatMarkedAsUnread {
                chat_id,
                is_marked_as_unread,
            } => self.merge_chat(
                chat_id,
                ChatPatch {
                    is_marked_as_unread: Some(is_marked_as_unread),
                    ..ChatPatch::default()
                },
            ),
            Update::ChatIsPinned {
                chat_id,
                is_pinned,
                order,
            } => self.merge_chat(
                chat_id,
                ChatPatch {
                    is_pinned: Some(is_pinned),
                    order: Some(order),
                    ..ChatPatch::default()
                },
            ),
            Update::ChatReadInbox {
                chat_id,
                last_read_inbox_message_id,
                unread_count,
            } => self.merge_chat(
                chat_id,
                ChatPatch {
                    last_read_inbox_message_id: Some(last_read_inbox_message_id),
                    unread_count: Some(unread_count),
                    ..ChatPatch::default()
                },
            ),
            Update::ChatDraftMessage { chat_id, order } => {
                self.merge_chat(chat_id, ChatPatch::order(order))
            }
            Update::ChatLastMessage {
                chat_id,
                last_message,
                order,
            } => self.merge_chat(
                chat_id,
                ChatPatch {
                    last_message: Some(last_message),
                    order: Some(order),
                    ..ChatPatch::default()
                },
            ),
            Update::ChatNotificationSettings {
                chat_id,
                notification_settings,
            } => self.merge_chat(
                chat_id,
                ChatPatch {
                    notification_settings: Some(notification_settings),
                    ..ChatPatch::default()
                },
            ),
            Update::File { file } => match self.store.apply_file_update(&file) {
                Some((chat_id, _)) => self.refresh_if_current(chat_id),
                None => warn!(file_id = file.id, "File update for an untracked transfer"),
            },
        }
    }

    fn merge_chat(&self, chat_id: i64, patch: ChatPatch) {
        if self.store.update_chat(chat_id, patch) {
            self.render();
        }
    }

    fn refresh_if_current(&self, chat_id: i64) {
        if self.store.current_chat_id() == Some(chat_id) {
            self.refresh_msgs();
        }
    }

    async fn on_new_message(&self, message: Message) {
        let chat_id = message.chat_id;
        self.store.add_message(message.clone());
        self.refresh_if_current(chat_id);
        self.auto_download(&message).await;
        self.notify(&message).await;
    }

    async fn auto_download(&self, message: &Message) {
        let Some(file) = message.file() else {
            return;
        };
        if file.is_downloaded() || file.size > self.config.max_download_size() {
            return;
        }
        if self.store.download_target(file.id).is_some() {
            return;
        }
        self.store.track_download(file.id, message.chat_id, message.id);
        debug!(file_id = file.id, size = file.size, "Starting automatic download");
        if let Err(err) = self.backend.download_file(file.id).await {
            warn!(file_id = file.id, error = %err, "Automatic download failed");
        }
    }

    async fn notify(&self, message: &Message) {
        if self.store.is_me(message.sender_id) {
            return;
        }
        let muted = self
            .store
            .chat(message.chat_id)
            .is_some_and(|chat| chat.notification_settings.is_muted());
        if muted {
            return;
        }
        let title = view::sender_name(&self.store, message.sender_id);
        let body = match message.text_content() {
            Some(text) => text.to_string(),
            None => message.content.label().to_string(),
        };
        if let Err(err) = self.notifier.notify(&title, &body).await {
            warn!(error = %err, "Desktop notification failed");
        }
    }
}
