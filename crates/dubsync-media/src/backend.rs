use crate::encoder::{EncoderProfile, RenderJob};
use crate::probe::{parse_ffprobe_output, SourceVideo};
use dubsync_core::MediaError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// The demux/encode tool the pipeline drives. All calls block.
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &str;
    /// Open the source and read duration, frame rate and geometry.
    fn probe(&self, path: &Path) -> Result<SourceVideo, MediaError>;
    /// Extract the full audio track as 16 kHz mono PCM.
    fn extract_audio(&self, video: &Path, wav_out: &Path) -> Result<(), MediaError>;
    fn encode(&self, job: &RenderJob, profile: EncoderProfile) -> Result<(), MediaError>;
}

pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegBackend {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn run(&self, tool: &Path, args: &[String]) -> Result<Output, MediaError> {
        let tool_name = tool.display().to_string();
        tracing::debug!(tool = %tool_name, "running: {}", args.join(" "));
        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|source| MediaError::ToolLaunch {
                tool: tool_name.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(MediaError::ToolFailed {
                tool: tool_name,
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr, 12),
            });
        }
        Ok(output)
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn probe(&self, path: &Path) -> Result<SourceVideo, MediaError> {
        let source_open = |reason: String| MediaError::SourceOpen {
            path: path.display().to_string(),
            reason,
        };
        if !path.is_file() {
            return Err(source_open("file not found".to_string()));
        }
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=width,height,avg_frame_rate,r_frame_rate:format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1".to_string(),
            path.to_string_lossy().into_owned(),
        ];
        let output = self
            .run(&self.ffprobe, &args)
            .map_err(|e| source_open(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ffprobe_output(path, &stdout).map_err(|e| source_open(e.to_string()))
    }

    fn extract_audio(&self, video: &Path, wav_out: &Path) -> Result<(), MediaError> {
        let mut args: Vec<String> = ["-hide_banner", "-nostdin", "-y", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(video.to_string_lossy().into_owned());
        args.extend(
            ["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(wav_out.to_string_lossy().into_owned());
        self.run(&self.ffmpeg, &args)?;
        Ok(())
    }

    fn encode(&self, job: &RenderJob, profile: EncoderProfile) -> Result<(), MediaError> {
        self.run(&self.ffmpeg, &job.ffmpeg_args(profile))?;
        Ok(())
    }
}

/// Last `lines` lines of a tool's stderr, joined with ` | `.
fn stderr_tail(stderr: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let tail: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = tail.len().saturating_sub(lines);
    tail[start..].join(" | ")
}
