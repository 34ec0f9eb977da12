//! Outbound command surface of the messaging backend.
//!
//! Every call returns once the backend has accepted the request. The state
//! change it causes comes back later as an inbound update on the channel the
//! backend was created with, so callers never mutate the store optimistically.

pub mod local;

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::core::chat::NotificationSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend request failed: {}", self.message)
    }
}

impl StdError for BackendError {}

pub type BackendResult = Result<(), BackendError>;

/// Voice note metadata gathered from the recorded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMeta {
    pub duration: u32,
    pub waveform: String,
}

/// Video metadata gathered from the file being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub duration: u32,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> BackendResult;

    async fn send_photo(&self, chat_id: i64, path: &Path) -> BackendResult;

    async fn send_document(&self, chat_id: i64, path: &Path) -> BackendResult;

    async fn send_audio(&self, chat_id: i64, path: &Path) -> BackendResult;

    async fn send_video(&self, chat_id: i64, path: &Path, meta: VideoMeta) -> BackendResult;

    async fn send_voice(&self, chat_id: i64, path: &Path, meta: VoiceMeta) -> BackendResult;

    async fn edit_message_text(&self, chat_id: i64, msg_id: i64, text: &str) -> BackendResult;

    async fn delete_messages(&self, chat_id: i64, msg_ids: &[i64]) -> BackendResult;

    async fn download_file(&self, file_id: i64) -> BackendResult;

    async fn toggle_chat_is_pinned(&self, chat_id: i64, is_pinned: bool) -> BackendResult;

    async fn toggle_chat_is_marked_as_unread(
        &self,
        chat_id: i64,
        is_marked_as_unread: bool,
    ) -> BackendResult;

    async fn set_chat_notification_settings(
        &self,
        chat_id: i64,
        settings: NotificationSettings,
    ) -> BackendResult;

    async fn view_messages(&self, chat_id: i64, msg_ids: &[i64]) -> BackendResult;
}
