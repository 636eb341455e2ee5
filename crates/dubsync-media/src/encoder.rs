use crate::filtergraph::{AUDIO_OUT, VIDEO_OUT};
use std::fmt;
use std::path::PathBuf;

/// Video encoder settings for one encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderProfile {
    /// NVENC, low-latency preset, variable-rate quality target.
    HardwareFast,
    /// libx264 constant quality, used when the hardware attempt fails.
    SoftwareFallback,
    /// libx264 with a slower, higher-compression preset.
    SoftwareQuality,
}

impl EncoderProfile {
    pub fn codec(&self) -> &'static str {
        match self {
            Self::HardwareFast => "h264_nvenc",
            Self::SoftwareFallback | Self::SoftwareQuality => "libx264",
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::HardwareFast)
    }

    pub fn video_args(&self) -> &'static [&'static str] {
        match self {
            Self::HardwareFast => &[
                "-c:v", "h264_nvenc", "-preset", "p1", "-rc", "vbr", "-cq", "23", "-b:v", "0",
            ],
            Self::SoftwareFallback => &[
                "-c:v", "libx264", "-preset", "medium", "-crf", "18", "-threads", "4",
            ],
            Self::SoftwareQuality => &["-c:v", "libx264", "-preset", "slow", "-crf", "18"],
        }
    }
}

impl fmt::Display for EncoderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preset = match self {
            Self::HardwareFast => "p1",
            Self::SoftwareFallback => "medium",
            Self::SoftwareQuality => "slow",
        };
        write!(f, "{} ({preset})", self.codec())
    }
}

/// Everything ffmpeg needs to produce the final container.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub source: PathBuf,
    pub audio_inputs: Vec<PathBuf>,
    pub filter_script: PathBuf,
    pub output: PathBuf,
    pub fps: f64,
    pub audio_bitrate: String,
}

impl RenderJob {
    /// Full ffmpeg argument list for this job under `profile`.
    ///
    /// The graph is passed with `-filter_complex_script`, which ffmpeg 4.x
    /// through 7.x accept. 7.x logs a deprecation warning; the `-/filter_complex`
    /// replacement does not exist before 7.0.
    pub fn ffmpeg_args(&self, profile: EncoderProfile) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            self.source.to_string_lossy().into_owned(),
        ];
        for input in &self.audio_inputs {
            args.push("-i".into());
            args.push(input.to_string_lossy().into_owned());
        }
        args.extend([
            "-filter_complex_script".into(),
            self.filter_script.to_string_lossy().into_owned(),
            "-map".into(),
            VIDEO_OUT.into(),
            "-map".into(),
            AUDIO_OUT.into(),
        ]);
        args.extend(profile.video_args().iter().map(|s| s.to_string()));
        args.extend([
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-r".into(),
            format!("{:.3}", self.fps),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            self.audio_bitrate.clone(),
            "-movflags".into(),
            "+faststart".into(),
            self.output.to_string_lossy().into_owned(),
        ]);
        args
    }
}
