//! Inbound updates pushed by the messaging backend.
//!
//! Payloads arrive as JSON objects tagged by `"@type"`. [`Update::from_value`]
//! turns them into the closed [`Update`] enum so the dispatcher can match
//! exhaustively; anything missing a required field is rejected as malformed.

use std::error::Error as StdError;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::core::chat::{order_from_any, Chat, NotificationSettings, User};
use crate::core::message::{File, Message, MessageContent};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "@type")]
pub enum Update {
    #[serde(rename = "updateNewChat")]
    NewChat { chat: Chat },
    #[serde(rename = "updateUser")]
    User { user: User },
    #[serde(rename = "updateNewMessage")]
    NewMessage { message: Message },
    #[serde(rename = "updateMessageContent")]
    MessageContent {
        chat_id: i64,
        message_id: i64,
        new_content: MessageContent,
    },
    #[serde(rename = "updateMessageSendSucceeded")]
    MessageSendSucceeded { message: Message, old_message_id: i64 },
    #[serde(rename = "updateDeleteMessages")]
    DeleteMessages {
        chat_id: i64,
        message_ids: Vec<i64>,
        #[serde(default)]
        is_permanent: bool,
    },
    #[serde(rename = "updateChatOrder")]
    ChatOrder {
        chat_id: i64,
        #[serde(deserialize_with = "order_from_any")]
        order: i64,
    },
    #[serde(rename = "updateChatTitle")]
    ChatTitle { chat_id: i64, title: String },
    #[serde(rename = "updateChatIsMarkedAsUnread")]
    ChatMarkedAsUnread {
        chat_id: i64,
        is_marked_as_unread: bool,
    },
    #[serde(rename = "updateChatIsPinned")]
    ChatIsPinned {
        chat_id: i64,
        is_pinned: bool,
        #[serde(deserialize_with = "order_from_any")]
        order: i64,
    },
    #[serde(rename = "updateChatReadInbox")]
    ChatReadInbox {
        chat_id: i64,
        last_read_inbox_message_id: i64,
        unread_count: u32,
    },
    /// The draft body itself is not shown anywhere, only the reorder matters.
    #[serde(rename = "updateChatDraftMessage")]
    ChatDraftMessage {
        chat_id: i64,
        #[serde(deserialize_with = "order_from_any")]
        order: i64,
    },
    #[serde(rename = "updateChatLastMessage")]
    ChatLastMessage {
        chat_id: i64,
        last_message: Option<Message>,
        #[serde(deserialize_with = "order_from_any")]
        order: i64,
    },
    #[serde(rename = "updateChatNotificationSettings")]
    ChatNotificationSettings {
        chat_id: i64,
        notification_settings: NotificationSettings,
    },
    #[serde(rename = "updateFile")]
    File { file: File },
}

impl Update {
    pub const KINDS: &'static [&'static str] = &[
        "updateNewChat",
        "updateUser",
        "updateNewMessage",
        "updateMessageContent",
        "updateMessageSendSucceeded",
        "updateDeleteMessages",
        "updateChatOrder",
        "updateChatTitle",
        "updateChatIsMarkedAsUnread",
        "updateChatIsPinned",
        "updateChatReadInbox",
        "updateChatDraftMessage",
        "updateChatLastMessage",
        "updateChatNotificationSettings",
        "updateFile",
    ];

    pub fn from_value(value: Value) -> Result<Self, UpdateError> {
        let kind = match value.get("@type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => return Err(UpdateError::MissingKind),
        };
        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(UpdateError::UnknownKind(kind));
        }
        serde_json::from_value(value).map_err(|source| UpdateError::Malformed { kind, source })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Update::NewChat { .. } => "updateNewChat",
            Update::User { .. } => "updateUser",
            Update::NewMessage { .. } => "updateNewMessage",
            Update::MessageContent { .. } => "updateMessageContent",
            Update::MessageSendSucceeded { .. } => "updateMessageSendSucceeded",
            Update::DeleteMessages { .. } => "updateDeleteMessages",
            Update::ChatOrder { .. } => "updateChatOrder",
            Update::ChatTitle { .. } => "updateChatTitle",
            Update::ChatMarkedAsUnread { .. } => "updateChatIsMarkedAsUnread",
            Update::ChatIsPinned { .. } => "updateChatIsPinned",
            Update::ChatReadInbox { .. } => "updateChatReadInbox",
            Update::ChatDraftMessage { .. } => "updateChatDraftMessage",
            Update::ChatLastMessage { .. } => "updateChatLastMessage",
            Update::ChatNotificationSettings { .. } => "updateChatNotificationSettings",
            Update::File { .. } => "updateFile",
        }
    }
}

/// Reasons an inbound payload cannot be turned into an [`Update`].
#[derive(Debug)]
pub enum UpdateError {
    /// The payload has no `@type` discriminator.
    MissingKind,
    /// The discriminator names an update this client does not handle.
    UnknownKind(String),
    /// A known update is missing fields or carries values of the wrong type.
    Malformed {
        kind: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::MissingKind => write!(f, "update has no @type"),
            UpdateError::UnknownKind(kind) => write!(f, "unhandled update kind {kind}"),
            UpdateError::Malformed { kind, source } => {
                write!(f, "malformed {kind}: {source}")
            }
        }
    }
}

impl StdError for UpdateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            UpdateError::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}
