use std::path::PathBuf;

use crate::core::config::data::Config;

pub const DEFAULT_MAX_DOWNLOAD_SIZE: u64 = 10 << 20;
pub const DEFAULT_SCROLL_THRESHOLD: usize = 2;
pub const DEFAULT_USER_ID: i64 = 1;

#[cfg(target_os = "macos")]
const DEFAULT_RECORD_CMD: &str =
    "ffmpeg -f avfoundation -i ':0' -c:a libopus -b:a 32k {file_path}";
#[cfg(not(target_os = "macos"))]
const DEFAULT_RECORD_CMD: &str = "ffmpeg -f alsa -i hw:0 -c:a libopus -b:a 32k {file_path}";

#[cfg(target_os = "macos")]
const DEFAULT_OPEN_CMD: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_OPEN_CMD: &str = "xdg-open";

#[cfg(target_os = "macos")]
const DEFAULT_NOTIFY_CMD: &str = "osascript -e 'on run argv' \
    -e 'display notification (item 2 of argv) with title (item 1 of argv)' \
    -e 'end run' {title} {message}";
#[cfg(not(target_os = "macos"))]
const DEFAULT_NOTIFY_CMD: &str = "notify-send {title} {message}";

impl Config {
    pub fn max_download_size(&self) -> u64 {
        self.max_download_size.unwrap_or(DEFAULT_MAX_DOWNLOAD_SIZE)
    }

    pub fn scroll_threshold(&self) -> usize {
        self.scroll_threshold.unwrap_or(DEFAULT_SCROLL_THRESHOLD)
    }

    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .filter(|editor| !editor.trim().is_empty())
            .or_else(|| {
                std::env::var("EDITOR")
                    .ok()
                    .filter(|editor| !editor.trim().is_empty())
            })
            .unwrap_or_else(|| "vim".to_string())
    }

    /// Command used to edit an existing message in `{file_path}`.
    pub fn edit_cmd(&self) -> String {
        format!("{} {{file_path}}", self.editor())
    }

    pub fn long_msg_cmd(&self) -> String {
        self.long_msg_cmd.clone().unwrap_or_else(|| self.edit_cmd())
    }

    pub fn record_cmd(&self) -> String {
        self.record_cmd
            .clone()
            .unwrap_or_else(|| DEFAULT_RECORD_CMD.to_string())
    }

    pub fn open_cmd(&self) -> String {
        self.open_cmd
            .clone()
            .unwrap_or_else(|| DEFAULT_OPEN_CMD.to_string())
    }

    pub fn notify_cmd(&self) -> String {
        self.notify_cmd
            .clone()
            .unwrap_or_else(|| DEFAULT_NOTIFY_CMD.to_string())
    }

    pub fn voice_dir(&self) -> PathBuf {
        self.voice_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id.unwrap_or(DEFAULT_USER_ID)
    }
}
