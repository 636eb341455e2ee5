use crate::fragment::SyncFragment;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Sample rate every fragment's audio is resampled to before concatenation.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    pub script: String,
    /// Extra inputs after the source (input 0), in input-index order.
    pub audio_inputs: Vec<PathBuf>,
    pub fps: f64,
    pub canvas: Option<(u32, u32)>,
}

pub const VIDEO_OUT: &str = "[outv]";
pub const AUDIO_OUT: &str = "[outa]";

pub fn build_filter_graph(fragments: &[SyncFragment], default_fps: f64) -> FilterGraph {
    let normalized_fps = |f: &SyncFragment| match f.fps {
        Some(fps) if fps.is_finite() && fps > 0.0 => fps,
        _ => default_fps,
    };
    let out_fps = fragments.first().map(normalized_fps).unwrap_or(default_fps);
    let canvas = common_canvas(fragments);

    let mut script = String::new();
    let mut audio_inputs = Vec::new();
    let mut concat_pads = String::new();

    for (i, fragment) in fragments.iter().enumerate() {
        let fps = normalized_fps(fragment);
        let (start, end) = fragment.video_span;
        let ratio = fragment.playback_ratio;
        let duration = fragment.output_duration;
        let stretched_len = fragment.natural_duration() / ratio;
        let hold = (duration - stretched_len).max(0.0) + 1.0 / fps;

        let _ = write!(script, "[0:v]trim=start={start:.6}:end={end:.6},");
        if fragment.is_stretched() {
            let _ = write!(script, "setpts=(PTS-STARTPTS)/{ratio:.6},");
        } else {
            script.push_str("setpts=PTS-STARTPTS,");
        }
        let _ = write!(
            script,
            "fps={fps:.6},tpad=stop_mode=clone:stop_duration={hold:.6},trim=duration={duration:.6},setpts=PTS-STARTPTS"
        );
        if let Some((w, h)) = canvas {
            let _ = write!(script, ",pad={w}:{h}:(ow-iw)/2:(oh-ih)/2");
        }
        let _ = writeln!(script, ",setsar=1[v{i}];");

        match &fragment.audio {
            Some(audio) => {
                audio_inputs.push(audio.path.clone());
                let input = audio_inputs.len();
                let _ = writeln!(
                    script,
                    "[{input}:a]aresample={MIX_SAMPLE_RATE},aformat=sample_fmts=fltp:channel_layouts=stereo,atrim=duration={duration:.6},apad=whole_dur={duration:.6},asetpts=PTS-STARTPTS[a{i}];"
                );
            }
            None => {
                let _ = writeln!(
                    script,
                    "anullsrc=channel_layout=stereo:sample_rate={MIX_SAMPLE_RATE},atrim=duration={duration:.6},asetpts=PTS-STARTPTS[a{i}];"
                );
            }
        }
        let _ = write!(concat_pads, "[v{i}][a{i}]");
    }

    let _ = writeln!(
        script,
        "{concat_pads}concat=n={}:v=1:a=1[catv]{AUDIO_OUT};[catv]fps={out_fps:.6}{VIDEO_OUT}",
        fragments.len()
    );

    FilterGraph {
        script,
        audio_inputs,
        fps: out_fps,
        canvas,
    }
}

/// Smallest even-sized canvas that holds every fragment at native size.
fn common_canvas(fragments: &[SyncFragment]) -> Option<(u32, u32)> {
    let (w, h) = fragments
        .iter()
        .filter_map(|f| f.frame_size)
        .fold((0u32, 0u32), |(w, h), (fw, fh)| (w.max(fw), h.max(fh)));
    if w == 0 || h == 0 {
        return None;
    }
    Some((w + w % 2, h + h % 2))
}
