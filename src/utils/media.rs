//! Media probing used when sending voice notes and videos.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::Path;

use base64::Engine as _;

use crate::utils::shell;

/// Number of bars in a voice note waveform.
pub const WAVEFORM_BARS: usize = 100;
/// Waveform levels are 5-bit values.
const WAVEFORM_MAX_LEVEL: u8 = 31;

#[derive(Debug)]
pub enum ProbeError {
    Io(io::Error),
    /// The probe ran but printed something we could not interpret.
    Output { tool: &'static str, output: String },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Io(err) => write!(f, "failed to run media probe: {err}"),
            ProbeError::Output { tool, output } => {
                write!(f, "unexpected {tool} output: {output:?}")
            }
        }
    }
}

impl StdError for ProbeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProbeError::Io(err) => Some(err),
            ProbeError::Output { .. } => None,
        }
    }
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        ProbeError::Io(err)
    }
}

pub trait MediaProbe: Send + Sync {
    /// Duration in whole seconds.
    fn duration(&self, path: &Path) -> Result<u32, ProbeError>;

    /// Base64 of the 5-bit packed waveform of an audio file.
    fn waveform(&self, path: &Path) -> Result<String, ProbeError>;

    /// `(width, height)` of the first video stream.
    fn video_resolution(&self, path: &Path) -> Result<(u32, u32), ProbeError>;
}

/// Probe backed by the `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Default, Clone)]
pub struct FfprobeMedia;

impl FfprobeMedia {
    fn stdout(tool: &'static str, command_line: &str) -> Result<Vec<u8>, ProbeError> {
        let output = shell::capture(command_line)?;
        if !output.status.success() {
            return Err(ProbeError::Output {
                tool,
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl MediaProbe for FfprobeMedia {
    fn duration(&self, path: &Path) -> Result<u32, ProbeError> {
        let path = shell::quote(&path.to_string_lossy());
        let raw = Self::stdout(
            "ffprobe",
            &format!(
                "ffprobe -v error -show_entries format=duration \
                 -of default=noprint_wrappers=1:nokey=1 {path}"
            ),
        )?;
        parse_duration(&String::from_utf8_lossy(&raw))
    }

    fn waveform(&self, path: &Path) -> Result<String, ProbeError> {
        let path = shell::quote(&path.to_string_lossy());
        let raw = Self::stdout(
            "ffmpeg",
            &format!("ffmpeg -v error -i {path} -ac 1 -ar 8000 -f s16le -"),
        )?;
        let samples: Vec<i16> = raw
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let levels = waveform_levels(&samples, WAVEFORM_BARS);
        Ok(base64::engine::general_purpose::STANDARD.encode(pack_waveform(&levels)))
    }

    fn video_resolution(&self, path: &Path) -> Result<(u32, u32), ProbeError> {
        let path = shell::quote(&path.to_string_lossy());
        let raw = Self::stdout(
            "ffprobe",
            &format!(
                "ffprobe -v error -select_streams v:0 -show_entries stream=width,height \
                 -of csv=s=x:p=0 {path}"
            ),
        )?;
        parse_resolution(&String::from_utf8_lossy(&raw))
    }
}

fn parse_duration(output: &str) -> Result<u32, ProbeError> {
    let trimmed = output.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.round() as u32)
        .ok_or_else(|| ProbeError::Output {
            tool: "ffprobe",
            output: trimmed.to_string(),
        })
}

fn parse_resolution(output: &str) -> Result<(u32, u32), ProbeError> {
    let trimmed = output.trim();
    let parsed = trimmed
        .lines()
        .next()
        .and_then(|line| line.split_once('x'))
        .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)));
    parsed.ok_or_else(|| ProbeError::Output {
        tool: "ffprobe",
        output: trimmed.to_string(),
    })
}

/// Peak amplitude of `bars` equal slices of `samples`, scaled to 0..=31.
pub fn waveform_levels(samples: &[i16], bars: usize) -> Vec<u8> {
    if samples.is_empty() || bars == 0 {
        return vec![0; bars];
    }
    let peaks: Vec<u16> = (0..bars)
        .map(|bar| {
            let start = bar * samples.len() / bars;
            let end = ((bar + 1) * samples.len() / bars).max(start + 1).min(samples.len());
            samples[start..end]
                .iter()
                .map(|s| s.unsigned_abs())
                .max()
                .unwrap_or(0)
        })
        .collect();
    let loudest = peaks.iter().copied().max().unwrap_or(0).max(1) as u32;
    peaks
        .into_iter()
        .map(|peak| (peak as u32 * WAVEFORM_MAX_LEVEL as u32 / loudest) as u8)
        .collect()
}

/// Pack 5-bit levels little-endian, the layout voice note waveforms use.
pub fn pack_waveform(levels: &[u8]) -> Vec<u8> {
    let mut packed = vec![0u8; (levels.len() * 5).div_ceil(8)];
    for (i, level) in levels.iter().enumerate() {
        let value = (level & WAVEFORM_MAX_LEVEL) as u16;
        let bit = i * 5;
        let byte = bit / 8;
        let shift = bit % 8;
        let shifted = value << shift;
        packed[byte] |= (shifted & 0xff) as u8;
        if shift > 3 {
            packed[byte + 1] |= (shifted >> 8) as u8;
        }
    }
    packed
}
