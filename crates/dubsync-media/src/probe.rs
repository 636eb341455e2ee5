use dubsync_core::MediaError;
use std::path::{Path, PathBuf};

/// The opened source recording. Read once, then shared read-only by every fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub fps: Option<f64>,
    pub width: u32,
    pub height: u32,
}

impl SourceVideo {
    /// Frame rate, or `default_fps` when the container reports none.
    pub fn fps_or(&self, default_fps: f64) -> f64 {
        match self.fps {
            Some(fps) if fps.is_finite() && fps > 0.0 => fps,
            _ => default_fps,
        }
    }
}

/// Parse `key=value` lines produced by
/// `ffprobe -show_entries stream=width,height,avg_frame_rate,r_frame_rate:format=duration -of default=noprint_wrappers=1`.
pub fn parse_ffprobe_output(path: &Path, output: &str) -> Result<SourceVideo, MediaError> {
    let mut duration = None;
    let mut avg_rate = None;
    let mut r_rate = None;
    let mut width = None;
    let mut height = None;

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key {
            "duration" => duration = value.parse::<f64>().ok(),
            "avg_frame_rate" => avg_rate = parse_rate(value),
            "r_frame_rate" => r_rate = parse_rate(value),
            "width" => width = value.parse::<u32>().ok(),
            "height" => height = value.parse::<u32>().ok(),
            _ => {}
        }
    }

    let duration = duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| MediaError::Probe("missing or invalid duration".to_string()))?;
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(MediaError::Probe("no video stream dimensions".to_string())),
    };

    Ok(SourceVideo {
        path: path.to_path_buf(),
        duration,
        fps: avg_rate.or(r_rate),
        width,
        height,
    })
}

/// Parse an ffprobe rational such as `30000/1001`; `0/0` yields `None`.
fn parse_rate(value: &str) -> Option<f64> {
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "width=1920\nheight=1080\nr_frame_rate=30000/1001\navg_frame_rate=30000/1001\nduration=12.345000\n";

    #[test]
    fn test_parse_ffprobe_output() {
        let source = parse_ffprobe_output(Path::new("in.mp4"), SAMPLE).unwrap();
        assert_eq!(source.width, 1920);
        assert_eq!(source.height, 1080);
        assert!((source.duration - 12.345).abs() < 1e-9);
        assert!((source.fps.unwrap() - 29.97).abs() < 0.01);
        assert_eq!(source.path, PathBuf::from("in.mp4"));
    }

    #[test]
    fn test_parse_ffprobe_output_falls_back_to_r_frame_rate() {
        let out = "width=640\nheight=360\nr_frame_rate=25/1\navg_frame_rate=0/0\nduration=3.0\n";
        let source = parse_ffprobe_output(Path::new("in.mp4"), out).unwrap();
        assert_eq!(source.fps, Some(25.0));
    }

    #[test]
    fn test_parse_ffprobe_output_no_rate() {
        let out = "width=640\nheight=360\nr_frame_rate=0/0\navg_frame_rate=0/0\nduration=3.0\n";
        let source = parse_ffprobe_output(Path::new("in.mp4"), out).unwrap();
        assert_eq!(source.fps, None);
        assert_eq!(source.fps_or(24.0), 24.0);
    }

    #[test]
    fn test_parse_ffprobe_output_missing_duration() {
        let out = "width=640\nheight=360\nduration=N/A\n";
        let err = parse_ffprobe_output(Path::new("in.mp4"), out).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_parse_ffprobe_output_audio_only() {
        let err = parse_ffprobe_output(Path::new("in.m4a"), "duration=10.0\n").unwrap_err();
        assert!(matches!(err, MediaError::Probe(_)));
    }
}
