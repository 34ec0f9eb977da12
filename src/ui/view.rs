//! Turning store records into the rows the surface draws.

use chrono::{DateTime, Local};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::chat::Chat;
use crate::core::message::{File, Message};
use crate::core::store::Store;
use crate::ui::surface::{ChatRow, FileState, MessageRow};

pub fn chat_row(chat: &Chat) -> ChatRow {
    let (preview, date) = chat
        .last_message
        .as_ref()
        .map(|msg| (msg.preview(), format_date(msg.date)))
        .unwrap_or_default();
    ChatRow {
        title: chat.title.clone(),
        preview: single_line(&preview),
        date,
        unread_count: chat.unread_count,
        is_pinned: chat.is_pinned,
        is_muted: chat.notification_settings.is_muted(),
        is_marked_as_unread: chat.is_marked_as_unread,
    }
}

pub fn message_row(store: &Store, chat: Option<&Chat>, msg: &Message) -> MessageRow {
    let is_outgoing = store.is_me(msg.sender_id);
    let sender = if is_outgoing {
        "You".to_string()
    } else {
        sender_name(store, msg.sender_id)
    };
    let last_read = chat.map_or(0, |c| c.last_read_inbox_message_id);
    MessageRow {
        sender,
        date: format_date(msg.date),
        body: msg.preview(),
        is_outgoing,
        is_unread: !is_outgoing && msg.id > last_read,
        file: msg.file().map(file_state),
    }
}

/// Display name of a user, or "Unknown" when the user was never announced.
pub fn sender_name(store: &Store, user_id: i64) -> String {
    store
        .user(user_id)
        .map(|user| user.display_name())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn file_state(file: &File) -> FileState {
    if file.is_downloaded() {
        FileState::Local
    } else if file.local.downloaded_size > 0 && file.size > 0 {
        let percent = (file.local.downloaded_size.min(file.size) * 100 / file.size) as u8;
        FileState::Downloading { percent }
    } else {
        FileState::Remote
    }
}

/// Local `HH:MM` for today, `YYYY-MM-DD` otherwise. Unknown dates are blank.
pub fn format_date(unix_secs: i64) -> String {
    let Some(utc) = DateTime::from_timestamp(unix_secs, 0) else {
        return String::new();
    };
    if unix_secs == 0 {
        return String::new();
    }
    let local = utc.with_timezone(&Local);
    if local.date_naive() == Local::now().date_naive() {
        local.format("%H:%M").to_string()
    } else {
        local.format("%Y-%m-%d").to_string()
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::User;
    use crate::utils::test_utils::{chat, file_message};

    #[test]
    fn truncate_respects_wide_characters() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn chat_row_flattens_preview() {
        let mut c = chat(1, 1);
        c.last_message = Some(Message::text(1, 1, 2, "two\nlines"));
        c.notification_settings.mute_for = 10;
        let row = chat_row(&c);
        assert_eq!(row.preview, "two lines");
        assert!(row.is_muted);
        assert_eq!(row.date, "");
    }

    #[test]
    fn message_row_marks_outgoing_and_unread() {
        let store = Store::new(1);
        store.upsert_user(User {
            id: 2,
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
        });
        let mut c = chat(5, 1);
        c.last_read_inbox_message_id = 10;

        let incoming = message_row(&store, Some(&c), &Message::text(5, 11, 2, "hi"));
        assert_eq!(incoming.sender, "Grace Hopper");
        assert!(incoming.is_unread);

        let read = message_row(&store, Some(&c), &Message::text(5, 9, 2, "old"));
        assert!(!read.is_unread);

        let mine = message_row(&store, Some(&c), &Message::text(5, 12, 1, "yo"));
        assert_eq!(mine.sender, "You");
        assert!(!mine.is_unread);

        let stranger = message_row(&store, None, &Message::text(5, 13, 42, "?"));
        assert_eq!(stranger.sender, "Unknown");
    }

    #[test]
    fn file_state_reports_progress() {
        let mut msg = file_message(1, 1, 2, 7, 200);
        assert_eq!(file_state(msg.file().expect("file")), FileState::Remote);

        let file = msg.content.file_mut().expect("file");
        file.local.downloaded_size = 50;
        assert_eq!(file_state(file), FileState::Downloading { percent: 25 });

        file.local.downloaded_size = 200;
        file.local.is_downloading_completed = true;
        file.local.path = "/tmp/x".into();
        assert_eq!(file_state(file), FileState::Local);
    }
}
