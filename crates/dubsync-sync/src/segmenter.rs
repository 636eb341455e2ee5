use dubsync_core::{SegmenterConfig, Segment, TimedChunk};

/// Duration assumed for a chunk whose end timestamp is missing.
const MISSING_END_ESTIMATE: f64 = 0.3;

#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

struct Buffer {
    words: Vec<String>,
    chars: usize,
    start: f64,
}

impl Buffer {
    fn flush(&mut self, end: f64, out: &mut Vec<Segment>) {
        if self.words.is_empty() {
            return;
        }
        out.push(Segment::new(self.start, end, self.words.join(" ")));
        self.words.clear();
        self.chars = 0;
    }

    fn ends_sentence(&self) -> bool {
        self.words
            .last()
            .and_then(|w| w.chars().last())
            .is_some_and(|c| matches!(c, '.' | '?' | '!'))
    }
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment `chunks`. When nothing usable comes out and `full_transcript`
    /// has text, a single fallback segment carries it.
    pub fn segment(&self, chunks: &[TimedChunk], full_transcript: Option<&str>) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut buffer = Buffer {
            words: Vec::new(),
            chars: 0,
            start: 0.0,
        };
        let mut last_end: Option<f64> = None;

        for chunk in chunks {
            let text = chunk.text.trim();
            if text.is_empty() {
                continue;
            }
            let start = chunk.start.unwrap_or_else(|| last_end.unwrap_or(0.0));
            let end = chunk.end.unwrap_or(start + MISSING_END_ESTIMATE);
            let text_len = text.chars().count();

            if buffer.words.is_empty() {
                buffer.start = start;
            } else {
                let prev_end = last_end.unwrap_or(buffer.start);
                let should_break = start - prev_end > self.config.min_break_pause
                    || end - buffer.start > self.config.max_duration
                    || buffer.chars + text_len > self.config.max_chars
                    || buffer.ends_sentence();
                if should_break {
                    buffer.flush(prev_end, &mut segments);
                    buffer.start = start;
                }
            }

            buffer.words.push(text.to_string());
            buffer.chars += text_len + 1;
            last_end = Some(end);
        }
        if let Some(end) = last_end {
            buffer.flush(end, &mut segments);
        }

        if segments.is_empty() {
            if let Some(full) = full_transcript.map(str::trim).filter(|t| !t.is_empty()) {
                let end = last_end.filter(|e| *e > 0.0).unwrap_or(1.0);
                tracing::debug!("no timed chunks usable, emitting whole transcript as one segment");
                segments.push(Segment::new(0.0, end, full));
            }
        }

        tracing::info!(chunks = chunks.len(), segments = segments.len(), "segmentation finished");
        segments
    }
}
