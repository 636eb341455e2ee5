use dubsync_core::{MediaError, ResyncedSegment, Segment, SyncConfig, SynthesizedAudio};
use dubsync_media::{write_padded_wav, FragmentAudio, RunArena, SourceVideo, SyncFragment};
use std::path::PathBuf;

/// Everything the synchronizer produced for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutput {
    pub fragments: Vec<SyncFragment>,
    /// WAV files written into the run arena, one per voiced fragment.
    pub assets: Vec<PathBuf>,
    /// Captions on the output timeline.
    pub resynced: Vec<ResyncedSegment>,
}

impl SyncOutput {
    pub fn silent_fragments(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_silent()).count()
    }

    pub fn total_duration(&self) -> f64 {
        self.resynced.last().map(|s| s.end()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Synchronizer {
    config: SyncConfig,
    default_fps: f64,
}

impl Synchronizer {
    pub fn new(config: SyncConfig, default_fps: f64) -> Self {
        Self {
            config,
            default_fps,
        }
    }

    /// Build one fragment per usable segment. `audios[i]` belongs to
    /// `segments[i]`; a missing or empty entry makes that fragment silent.
    ///
    /// Fails only when the source recording cannot be read.
    pub fn synchronize<S: AsRef<Segment>>(
        &self,
        segments: &[S],
        audios: &[SynthesizedAudio],
        source: &SourceVideo,
        arena: &mut RunArena,
    ) -> Result<SyncOutput, MediaError> {
        if !source.path.is_file() {
            return Err(MediaError::SourceOpen {
                path: source.path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        if audios.len() != segments.len() {
            tracing::warn!(
                segments = segments.len(),
                audios = audios.len(),
                "audio count does not match segments, unmatched lines will be silent"
            );
        }

        let fps = source.fps_or(self.default_fps);
        let mut output = SyncOutput::default();
        let mut offset = 0.0;

        for (index, segment) in segments.iter().enumerate() {
            let segment = segment.as_ref();
            let start = segment.start();
            if start >= source.duration {
                tracing::debug!(index, start, "segment starts past end of source, stopping");
                break;
            }
            let end = segment.end().min(source.duration);
            let natural = end - start;
            if natural <= self.config.min_span {
                tracing::debug!(index, span = natural, "span too short, skipped");
                continue;
            }

            let voiced = audios.get(index).and_then(SynthesizedAudio::voiced);
            let (audio, playback_ratio, output_duration) = match voiced {
                Some((samples, sample_rate)) => {
                    let path = arena.segment_audio_path(index);
                    match write_padded_wav(&path, samples, sample_rate, self.config.audio_pad) {
                        Ok(()) => {
                            let audio_duration = samples.len() as f64 / sample_rate as f64;
                            let (ratio, duration) = self.fit(natural, audio_duration);
                            output.assets.push(path.clone());
                            let audio = FragmentAudio {
                                path,
                                sample_rate,
                                duration: audio_duration,
                            };
                            (Some(audio), ratio, duration)
                        }
                        Err(e) => {
                            tracing::warn!(index, "cannot write dubbed audio, fragment will be silent: {e}");
                            (None, 1.0, natural)
                        }
                    }
                }
                None => {
                    tracing::warn!(index, "no synthesized audio, fragment will be silent");
                    (None, 1.0, natural)
                }
            };

            tracing::debug!(
                index,
                ratio = playback_ratio,
                output_duration,
                silent = audio.is_none(),
                "fragment synchronized"
            );
            let resynced = ResyncedSegment::new(offset, output_duration, segment.text());
            offset = resynced.end();
            output.resynced.push(resynced);
            output.fragments.push(SyncFragment {
                index,
                video_span: (start, end),
                audio,
                playback_ratio,
                output_duration,
                fps: Some(fps),
                frame_size: Some((source.width, source.height)),
            });
        }

        tracing::info!(
            fragments = output.fragments.len(),
            silent = output.silent_fragments(),
            duration = output.total_duration(),
            "synchronization finished"
        );
        Ok(output)
    }

    /// Playback ratio and output duration for a span of `natural` seconds
    /// carrying `audio` seconds of speech.
    fn fit(&self, natural: f64, audio: f64) -> (f64, f64) {
        let ratio = (natural / audio).clamp(self.config.min_ratio, self.config.max_ratio);
        if (ratio - 1.0).abs() > self.config.stretch_tolerance {
            (ratio, natural / ratio)
        } else {
            (1.0, audio)
        }
    }
}
