use serde::{Deserialize, Deserializer, Serialize};

use crate::core::message::Message;

/// Value of `mute_for` that the backend treats as "muted forever".
pub const MUTE_FOREVER: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Seconds left until the chat is unmuted; zero means notifications are on.
    #[serde(default)]
    pub mute_for: i32,
}

impl NotificationSettings {
    pub fn is_muted(&self) -> bool {
        self.mute_for != 0
    }

    /// Settings the backend should receive to flip the mute state.
    pub fn toggled(&self) -> Self {
        Self {
            mute_for: if self.is_muted() { 0 } else { MUTE_FOREVER },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Sort key assigned by the backend; zero hides the chat from the main list.
    #[serde(default, deserialize_with = "order_from_any")]
    pub order: i64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_marked_as_unread: bool,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub last_read_inbox_message_id: i64,
    #[serde(default)]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub notification_settings: NotificationSettings,
}

impl Chat {
    pub fn is_listed(&self) -> bool {
        self.order != 0
    }

    /// Key for the display order: pinned first, then by descending order, then id.
    pub fn sort_key(&self) -> (bool, i64, i64) {
        (self.is_pinned, self.order, self.id)
    }

    pub fn apply(&mut self, patch: ChatPatch) {
        let ChatPatch {
            title,
            order,
            is_pinned,
            is_marked_as_unread,
            unread_count,
            last_read_inbox_message_id,
            last_message,
            notification_settings,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(order) = order {
            self.order = order;
        }
        if let Some(is_pinned) = is_pinned {
            self.is_pinned = is_pinned;
        }
        if let Some(is_marked_as_unread) = is_marked_as_unread {
            self.is_marked_as_unread = is_marked_as_unread;
        }
        if let Some(unread_count) = unread_count {
            self.unread_count = unread_count;
        }
        if let Some(id) = last_read_inbox_message_id {
            self.last_read_inbox_message_id = id;
        }
        if let Some(last_message) = last_message {
            self.last_message = last_message;
        }
        if let Some(settings) = notification_settings {
            self.notification_settings = settings;
        }
    }
}

/// Partial set of chat fields merged by [`crate::core::store::Store::update_chat`].
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatPatch {
    pub title: Option<String>,
    pub order: Option<i64>,
    pub is_pinned: Option<bool>,
    pub is_marked_as_unread: Option<bool>,
    pub unread_count: Option<u32>,
    pub last_read_inbox_message_id: Option<i64>,
    pub last_message: Option<Option<Message>>,
    pub notification_settings: Option<NotificationSettings>,
}

/// A full record as a patch. A missing last message keeps the known one.
impl From<Chat> for ChatPatch {
    fn from(chat: Chat) -> Self {
        Self {
            title: Some(chat.title),
            order: Some(chat.order),
            is_pinned: Some(chat.is_pinned),
            is_marked_as_unread: Some(chat.is_marked_as_unread),
            unread_count: Some(chat.unread_count),
            last_read_inbox_message_id: Some(chat.last_read_inbox_message_id),
            last_message: chat.last_message.map(Some),
            notification_settings: Some(chat.notification_settings),
        }
    }
}

impl ChatPatch {
    pub fn order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Chat orders are 64-bit and some backends ship them as decimal strings.
pub(crate) fn order_from_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Order {
        Number(i64),
        Text(String),
    }

    match Order::deserialize(deserializer)? {
        Order::Number(order) => Ok(order),
        Order::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_toggle_uses_forever_sentinel() {
        let unmuted = NotificationSettings { mute_for: 0 };
        assert_eq!(unmuted.toggled().mute_for, 2147483647);
        assert_eq!(unmuted.toggled().toggled().mute_for, 0);

        let temporarily_muted = NotificationSettings { mute_for: 3600 };
        assert_eq!(temporarily_muted.toggled().mute_for, 0);
    }

    #[test]
    fn patch_only_touches_named_fields() {
        let mut chat = Chat {
            id: 7,
            title: "Old".into(),
            order: 3,
            is_pinned: true,
            unread_count: 4,
            ..Chat::default()
        };

        chat.apply(ChatPatch::title("New"));

        assert_eq!(chat.title, "New");
        assert_eq!(chat.order, 3);
        assert!(chat.is_pinned);
        assert_eq!(chat.unread_count, 4);
    }

    #[test]
    fn patch_can_clear_last_message() {
        let mut chat = Chat {
            id: 1,
            last_message: Some(Message::text(1, 10, 5, "hi")),
            ..Chat::default()
        };

        chat.apply(ChatPatch {
            last_message: Some(None),
            ..ChatPatch::default()
        });

        assert!(chat.last_message.is_none());
    }

    #[test]
    fn display_name_trims_missing_last_name() {
        let user = User {
            id: 1,
            first_name: "Ada".into(),
            last_name: String::new(),
        };
        assert_eq!(user.display_name(), "Ada");
    }
}
