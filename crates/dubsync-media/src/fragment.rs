use std::path::PathBuf;

/// Dubbed audio attached to a fragment, already written into the run arena.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentAudio {
    pub path: PathBuf,
    pub sample_rate: u32,
    /// Unpadded speech length in seconds.
    pub duration: f64,
}

/// One synchronized unit of video and audio on the output timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFragment {
    /// Index of the segment this fragment was built from.
    pub index: usize,
    /// `[start, end)` on the source timeline.
    pub video_span: (f64, f64),
    pub audio: Option<FragmentAudio>,
    /// Speed factor applied to the span; `1.0` means unscaled playback.
    pub playback_ratio: f64,
    pub output_duration: f64,
    pub fps: Option<f64>,
    pub frame_size: Option<(u32, u32)>,
}

impl SyncFragment {
    pub fn natural_duration(&self) -> f64 {
        self.video_span.1 - self.video_span.0
    }

    pub fn is_stretched(&self) -> bool {
        self.playback_ratio != 1.0
    }

    pub fn is_silent(&self) -> bool {
        self.audio.is_none()
    }
}
