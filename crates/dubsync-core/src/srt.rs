use crate::types::{ResyncedSegment, Segment};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

/// Anything that can be written as a subtitle cue.
pub trait Caption {
    fn cue_start(&self) -> Option<f64>;
    fn cue_end(&self) -> Option<f64>;
    fn cue_text(&self) -> Cow<'_, str>;
}

impl Caption for Segment {
    fn cue_start(&self) -> Option<f64> {
        Some(self.start())
    }

    fn cue_end(&self) -> Option<f64> {
        Some(self.end())
    }

    fn cue_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.text())
    }
}

impl Caption for ResyncedSegment {
    fn cue_start(&self) -> Option<f64> {
        Some(self.start())
    }

    fn cue_end(&self) -> Option<f64> {
        Some(self.end())
    }

    fn cue_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.text())
    }
}

/// Format seconds as `HH:MM:SS,mmm`.
///
/// Missing, negative and non-finite values render as zero. Milliseconds are
/// truncated, not rounded; the tiny epsilon only absorbs binary float error
/// so that `12.345` is not read back as `12.344999...`.
pub fn format_timestamp(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => 0.0,
    };
    let total_ms = (seconds * 1000.0 + 1e-6).floor() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Render cues as SRT. Cues with blank text are skipped but keep their index.
pub fn to_srt<C: Caption>(cues: &[C]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        let text = cue.cue_text();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(cue.cue_start()),
            format_timestamp(cue.cue_end()),
            text
        );
    }
    out
}

pub fn write_srt<C: Caption>(path: &Path, cues: &[C]) -> std::io::Result<()> {
    std::fs::write(path, to_srt(cues))
}
