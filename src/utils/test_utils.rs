//! Builders and recording stand-ins for the controller's collaborators.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::backend::{Backend, BackendError, BackendResult, VideoMeta, VoiceMeta};
use crate::core::chat::{Chat, NotificationSettings};
use crate::core::message::{File, FormattedText, Message, MessageContent};
use crate::ui::input::{InputEvent, InputSource};
use crate::ui::surface::{ChatRow, MessageRow, Surface};
use crate::utils::media::{MediaProbe, ProbeError};
use crate::utils::notify::Notifier;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn chat(id: i64, order: i64) -> Chat {
    Chat {
        id,
        title: format!("chat {id}"),
        order,
        ..Chat::default()
    }
}

/// A document message whose file has not been downloaded yet.
pub fn file_message(chat_id: i64, msg_id: i64, sender_id: i64, file_id: i64, size: u64) -> Message {
    Message {
        id: msg_id,
        chat_id,
        sender_id,
        date: 0,
        content: MessageContent::Document {
            file_name: format!("file-{file_id}.bin"),
            caption: FormattedText::default(),
            file: File {
                id: file_id,
                size,
                ..File::default()
            },
        },
    }
}

pub fn key(c: char) -> InputEvent {
    InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

pub fn ctrl(c: char) -> InputEvent {
    InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

pub fn enter() -> InputEvent {
    InputEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

/// One key event per character of `keys`.
pub fn keys(keys: &str) -> Vec<InputEvent> {
    keys.chars().map(key).collect()
}

// ----------------------------------------------------------------------
// Surface
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    pub suspends: usize,
    pub resumes: usize,
    pub erases: usize,
    pub layouts: Vec<(u16, u16, f32)>,
    pub chat_draws: Vec<(usize, Vec<ChatRow>)>,
    pub msg_draws: Vec<(Option<usize>, Vec<MessageRow>)>,
    pub statuses: Vec<String>,
    /// Draws requested while suspended.
    pub skipped: usize,
    /// Draw calls that started while another was still in progress.
    pub overlaps: usize,
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    rows: u16,
    cols: u16,
    chat_rows: usize,
    msg_rows: usize,
    suspended: bool,
    drawing: Arc<AtomicBool>,
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new(rows: u16, cols: u16) -> Self {
        let body = rows.saturating_sub(1) as usize;
        Self {
            rows,
            cols,
            chat_rows: body,
            msg_rows: body,
            suspended: false,
            drawing: Arc::new(AtomicBool::new(false)),
            log: Arc::new(Mutex::new(SurfaceLog::default())),
        }
    }

    pub fn log(&self) -> SurfaceLog {
        lock(&self.log).clone()
    }

    /// Holds the draw for a moment so that an unserialized caller would overlap it.
    fn record_draw(&self, record: impl FnOnce(&mut SurfaceLog)) {
        if self.suspended {
            lock(&self.log).skipped += 1;
            return;
        }
        if self.drawing.swap(true, Ordering::AcqRel) {
            lock(&self.log).overlaps += 1;
        }
        std::thread::sleep(Duration::from_micros(200));
        record(&mut lock(&self.log));
        self.drawing.store(false, Ordering::Release);
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.rows, self.cols))
    }

    fn erase(&mut self) -> io::Result<()> {
        lock(&self.log).erases += 1;
        Ok(())
    }

    fn layout(&mut self, rows: u16, cols: u16, chat_ratio: f32) {
        self.rows = rows;
        self.cols = cols;
        let body = rows.saturating_sub(1) as usize;
        self.chat_rows = body;
        self.msg_rows = body;
        lock(&self.log).layouts.push((rows, cols, chat_ratio));
    }

    fn chat_rows(&self) -> usize {
        self.chat_rows
    }

    fn msg_rows(&self) -> usize {
        self.msg_rows
    }

    fn draw_chats(&mut self, selected: usize, chats: &[ChatRow]) -> io::Result<()> {
        self.record_draw(|log| log.chat_draws.push((selected, chats.to_vec())));
        Ok(())
    }

    fn draw_msgs(&mut self, selected: Option<usize>, msgs: &[MessageRow]) -> io::Result<()> {
        self.record_draw(|log| log.msg_draws.push((selected, msgs.to_vec())));
        Ok(())
    }

    fn draw_status(&mut self, text: &str) -> io::Result<()> {
        self.record_draw(|log| log.statuses.push(text.to_string()));
        Ok(())
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.suspended = true;
        lock(&self.log).suspends += 1;
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        self.suspended = false;
        lock(&self.log).resumes += 1;
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

// ----------------------------------------------------------------------
// Backend
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SendText { chat_id: i64, text: String },
    SendPhoto { chat_id: i64, path: PathBuf },
    SendDocument { chat_id: i64, path: PathBuf },
    SendAudio { chat_id: i64, path: PathBuf },
    SendVideo { chat_id: i64, path: PathBuf, meta: VideoMeta },
    SendVoice { chat_id: i64, path: PathBuf, meta: VoiceMeta },
    EditText { chat_id: i64, msg_id: i64, text: String },
    Delete { chat_id: i64, msg_ids: Vec<i64> },
    Download { file_id: i64 },
    TogglePinned { chat_id: i64, is_pinned: bool },
    ToggleUnread { chat_id: i64, is_marked_as_unread: bool },
    SetNotifications { chat_id: i64, settings: NotificationSettings },
    View { chat_id: i64, msg_ids: Vec<i64> },
}

/// Backend that records every request and emits no updates.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    fail: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    pub fn downloads(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Download { file_id } => Some(file_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) -> BackendResult {
        lock(&self.calls).push(call);
        if self.fail.load(Ordering::Acquire) {
            Err(BackendError::new("request refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn send_text(&self, chat_id: i64, text: &str) -> BackendResult {
        self.record(BackendCall::SendText {
            chat_id,
            text: text.to_string(),
        })
    }

    async fn send_photo(&self, chat_id: i64, path: &Path) -> BackendResult {
        self.record(BackendCall::SendPhoto {
            chat_id,
            path: path.to_path_buf(),
        })
    }

    async fn send_document(&self, chat_id: i64, path: &Path) -> BackendResult {
        self.record(BackendCall::SendDocument {
            chat_id,
            path: path.to_path_buf(),
        })
    }

    async fn send_audio(&self, chat_id: i64, path: &Path) -> BackendResult {
        self.record(BackendCall::SendAudio {
            chat_id,
            path: path.to_path_buf(),
        })
    }

    async fn send_video(&self, chat_id: i64, path: &Path, meta: VideoMeta) -> BackendResult {
        self.record(BackendCall::SendVideo {
            chat_id,
            path: path.to_path_buf(),
            meta,
        })
    }

    async fn send_voice(&self, chat_id: i64, path: &Path, meta: VoiceMeta) -> BackendResult {
        self.record(BackendCall::SendVoice {
            chat_id,
            path: path.to_path_buf(),
            meta,
        })
    }

    async fn edit_message_text(&self, chat_id: i64, msg_id: i64, text: &str) -> BackendResult {
        self.record(BackendCall::EditText {
            chat_id,
            msg_id,
            text: text.to_string(),
        })
    }

    async fn delete_messages(&self, chat_id: i64, msg_ids: &[i64]) -> BackendResult {
        self.record(BackendCall::Delete {
            chat_id,
            msg_ids: msg_ids.to_vec(),
        })
    }

    async fn download_file(&self, file_id: i64) -> BackendResult {
        self.record(BackendCall::Download { file_id })
    }

    async fn toggle_chat_is_pinned(&self, chat_id: i64, is_pinned: bool) -> BackendResult {
        self.record(BackendCall::TogglePinned { chat_id, is_pinned })
    }

    async fn toggle_chat_is_marked_as_unread(
        &self,
        chat_id: i64,
        is_marked_as_unread: bool,
    ) -> BackendResult {
        self.record(BackendCall::ToggleUnread {
            chat_id,
            is_marked_as_unread,
        })
    }

    async fn set_chat_notification_settings(
        &self,
        chat_id: i64,
        settings: NotificationSettings,
    ) -> BackendResult {
        self.record(BackendCall::SetNotifications { chat_id, settings })
    }

    async fn view_messages(&self, chat_id: i64, msg_ids: &[i64]) -> BackendResult {
        self.record(BackendCall::View {
            chat_id,
            msg_ids: msg_ids.to_vec(),
        })
    }
}

// ----------------------------------------------------------------------
// Input, probe, notifier
// ----------------------------------------------------------------------

/// Replays a fixed list of events, yielding to other tasks between them.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_event(&mut self) -> Option<InputEvent> {
        tokio::task::yield_now().await;
        self.events.pop_front()
    }
}

#[derive(Debug, Clone)]
pub struct StubProbe {
    pub duration: u32,
    pub waveform: String,
    pub resolution: (u32, u32),
}

impl Default for StubProbe {
    fn default() -> Self {
        Self {
            duration: 3,
            waveform: "AAAA".to_string(),
            resolution: (640, 480),
        }
    }
}

impl MediaProbe for StubProbe {
    fn duration(&self, _path: &Path) -> Result<u32, ProbeError> {
        Ok(self.duration)
    }

    fn waveform(&self, _path: &Path) -> Result<String, ProbeError> {
        Ok(self.waveform.clone())
    }

    fn video_resolution(&self, _path: &Path) -> Result<(u32, u32), ProbeError> {
        Ok(self.resolution)
    }
}

/// Notifier that keeps `(title, body)` pairs for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, body: &str) -> io::Result<()> {
        lock(&self.sent).push((title.to_string(), body.to_string()));
        Ok(())
    }
}
