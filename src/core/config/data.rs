use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration, read from `config.toml` in the platform config dir.
///
/// Every key is optional; the accessors in `defaults.rs` fill in the values
/// used when a key is absent.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Files up to this many bytes are downloaded as soon as they arrive.
    /// Accepts a plain byte count or a size like `"10MB"`.
    #[serde(default, with = "byte_size")]
    pub max_download_size: Option<u64>,
    /// Rows kept between the selection and the bottom edge of a pane.
    pub scroll_threshold: Option<usize>,
    /// Editor used to edit existing messages. Falls back to `$EDITOR`, then `vim`.
    pub editor: Option<String>,
    /// Command used to compose long messages; `{file_path}` is replaced with
    /// the scratch file.
    pub long_msg_cmd: Option<String>,
    /// Command used to record a voice note into `{file_path}`.
    pub record_cmd: Option<String>,
    /// Command used to open files in an external viewer.
    pub open_cmd: Option<String>,
    /// Command used to raise desktop notifications; `{title}` and `{message}`
    /// are replaced with shell-quoted values.
    pub notify_cmd: Option<String>,
    /// Directory recorded voice notes are written to before sending.
    pub voice_dir: Option<PathBuf>,
    /// Log file for tracing output.
    pub log_file: Option<PathBuf>,
    /// Local user id for the offline session.
    pub user_id: Option<i64>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Parse sizes like `"512"`, `"300KB"`, `"10MB"` or `"1GB"` (binary multiples).
pub fn parse_byte_size(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().ok()?;
    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1 << 10,
        "M" | "MB" => 1 << 20,
        "G" | "GB" => 1 << 30,
        _ => return None,
    };
    amount.checked_mul(multiplier)
}

mod byte_size {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bytes(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_u64(*bytes),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Bytes(bytes)) => Ok(Some(bytes)),
            Some(Raw::Text(text)) => super::parse_byte_size(&text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid size: {text}"))),
        }
    }
}
