use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    #[serde(default)]
    pub text: String,
}

impl From<&str> for FormattedText {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Local availability of a remote file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_downloading_completed: bool,
    #[serde(default)]
    pub downloaded_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub local: LocalFile,
}

impl File {
    pub fn is_downloaded(&self) -> bool {
        self.local.is_downloading_completed && !self.local.path.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum MessageContent {
    #[serde(rename = "messageText")]
    Text { text: FormattedText },
    #[serde(rename = "messagePhoto")]
    Photo {
        #[serde(default)]
        caption: FormattedText,
        file: File,
    },
    #[serde(rename = "messageDocument")]
    Document {
        #[serde(default)]
        file_name: String,
        #[serde(default)]
        caption: FormattedText,
        file: File,
    },
    #[serde(rename = "messageAudio")]
    Audio {
        #[serde(default)]
        title: String,
        #[serde(default)]
        performer: String,
        #[serde(default)]
        duration: u32,
        file: File,
    },
    #[serde(rename = "messageVideo")]
    Video {
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
        #[serde(default)]
        duration: u32,
        #[serde(default)]
        caption: FormattedText,
        file: File,
    },
    #[serde(rename = "messageVoiceNote")]
    VoiceNote {
        #[serde(default)]
        duration: u32,
        #[serde(default)]
        waveform: String,
        file: File,
    },
    #[serde(rename = "messageAnimation")]
    Animation {
        #[serde(default)]
        caption: FormattedText,
        file: File,
    },
    #[serde(rename = "messageSticker")]
    Sticker {
        #[serde(default)]
        emoji: String,
        file: File,
    },
    #[serde(other)]
    Unsupported,
}

impl MessageContent {
    /// Short human label used in notifications and previews of media messages.
    pub fn label(&self) -> &'static str {
        match self {
            MessageContent::Text { .. } => "text",
            MessageContent::Photo { .. } => "photo",
            MessageContent::Document { .. } => "document",
            MessageContent::Audio { .. } => "audio",
            MessageContent::Video { .. } => "video",
            MessageContent::VoiceNote { .. } => "voice",
            MessageContent::Animation { .. } => "animation",
            MessageContent::Sticker { .. } => "sticker",
            MessageContent::Unsupported => "unsupported message",
        }
    }

    pub fn file(&self) -> Option<&File> {
        match self {
            MessageContent::Photo { file, .. }
            | MessageContent::Document { file, .. }
            | MessageContent::Audio { file, .. }
            | MessageContent::Video { file, .. }
            | MessageContent::VoiceNote { file, .. }
            | MessageContent::Animation { file, .. }
            | MessageContent::Sticker { file, .. } => Some(file),
            MessageContent::Text { .. } | MessageContent::Unsupported => None,
        }
    }

    pub fn file_mut(&mut self) -> Option<&mut File> {
        match self {
            MessageContent::Photo { file, .. }
            | MessageContent::Document { file, .. }
            | MessageContent::Audio { file, .. }
            | MessageContent::Video { file, .. }
            | MessageContent::VoiceNote { file, .. }
            | MessageContent::Animation { file, .. }
            | MessageContent::Sticker { file, .. } => Some(file),
            MessageContent::Text { .. } | MessageContent::Unsupported => None,
        }
    }

    fn caption(&self) -> Option<&str> {
        let caption = match self {
            MessageContent::Document {
                caption, file_name, ..
            } if caption.text.is_empty() => file_name.as_str(),
            MessageContent::Photo { caption, .. }
            | MessageContent::Document { caption, .. }
            | MessageContent::Video { caption, .. }
            | MessageContent::Animation { caption, .. } => caption.text.as_str(),
            MessageContent::Sticker { emoji, .. } => emoji.as_str(),
            _ => "",
        };
        (!caption.is_empty()).then_some(caption)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    #[serde(alias = "sender_user_id", default)]
    pub sender_id: i64,
    #[serde(default)]
    pub date: i64,
    pub content: MessageContent,
}

impl Message {
    pub fn text(chat_id: i64, id: i64, sender_id: i64, text: &str) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            date: 0,
            content: MessageContent::Text { text: text.into() },
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { text } => Some(text.text.as_str()),
            _ => None,
        }
    }

    pub fn file(&self) -> Option<&File> {
        self.content.file()
    }

    /// Path of the attached file, once it is fully available locally.
    pub fn local_path(&self) -> Option<&str> {
        self.file()
            .filter(|file| file.is_downloaded())
            .map(|file| file.local.path.as_str())
    }

    /// One-line rendition for list panes and notification bodies.
    pub fn preview(&self) -> String {
        match (&self.content, self.content.caption()) {
            (MessageContent::Text { text }, _) => text.text.replace('\n', " "),
            (content, Some(caption)) => format!("[{}] {}", content.label(), caption),
            (content, None) => format!("[{}]", content.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_message_with_legacy_sender_field() {
        let message: Message = serde_json::from_value(json!({
            "id": 10,
            "chat_id": 1,
            "sender_user_id": 42,
            "date": 1_600_000_000,
            "content": {"@type": "messageText", "text": {"text": "hello"}}
        }))
        .expect("message parses");

        assert_eq!(message.sender_id, 42);
        assert_eq!(message.text_content(), Some("hello"));
        assert!(message.file().is_none());
    }

    #[test]
    fn unknown_content_kinds_are_unsupported() {
        let message: Message = serde_json::from_value(json!({
            "id": 1,
            "chat_id": 1,
            "content": {"@type": "messagePoll", "question": "?"}
        }))
        .expect("message parses");

        assert_eq!(message.content, MessageContent::Unsupported);
        assert_eq!(message.preview(), "[unsupported message]");
    }

    #[test]
    fn local_path_requires_completed_download() {
        let mut message: Message = serde_json::from_value(json!({
            "id": 3,
            "chat_id": 1,
            "content": {
                "@type": "messageDocument",
                "file_name": "report.pdf",
                "file": {"id": 77, "size": 1024, "local": {"path": "/tmp/report.pdf"}}
            }
        }))
        .expect("message parses");

        assert_eq!(message.file().map(|file| file.id), Some(77));
        assert_eq!(message.local_path(), None);

        if let Some(file) = message.content.file_mut() {
            file.local.is_downloading_completed = true;
        }
        assert_eq!(message.local_path(), Some("/tmp/report.pdf"));
    }

    #[test]
    fn preview_uses_caption_or_label() {
        let voice = Message {
            id: 1,
            chat_id: 1,
            sender_id: 1,
            date: 0,
            content: MessageContent::VoiceNote {
                duration: 3,
                waveform: String::new(),
                file: File::default(),
            },
        };
        assert_eq!(voice.preview(), "[voice]");

        let doc = Message {
            content: MessageContent::Document {
                file_name: "notes.txt".into(),
                caption: FormattedText::default(),
                file: File::default(),
            },
            ..voice.clone()
        };
        assert_eq!(doc.preview(), "[document] notes.txt");

        let text = Message::text(1, 2, 1, "two\nlines");
        assert_eq!(text.preview(), "two lines");
    }
}
