/// A word or phrase emitted by the recognizer. Either timestamp may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedChunk {
    pub text: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TimedChunk {
    pub fn new(text: impl Into<String>, start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Shorthand for a chunk with both timestamps present.
    pub fn timed(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(text, Some(start), Some(end))
    }
}

/// Full recognizer output: the flat transcript plus its timed chunks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub chunks: Vec<TimedChunk>,
}

/// A subtitle-sized line on the source timeline. `end >= start` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: f64,
    end: f64,
    text: String,
}

impl Segment {
    /// Negative starts clamp to zero and an `end` before `start` collapses onto it.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        let start = start.max(0.0);
        Self {
            start,
            end: end.max(start),
            text: text.into(),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Same timing, new text. Used when translation replaces the line.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            start: self.start,
            end: self.end,
            text: text.into(),
        }
    }
}

impl AsRef<Segment> for Segment {
    fn as_ref(&self) -> &Segment {
        self
    }
}

/// A line positioned on the output timeline built from accumulated fragment durations.
#[derive(Debug, Clone, PartialEq)]
pub struct ResyncedSegment {
    start: f64,
    end: f64,
    text: String,
}

impl ResyncedSegment {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end: start + duration.max(0.0),
            text: text.into(),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Synthesized speech for one segment. `samples == None` marks a failed line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesizedAudio {
    pub samples: Option<Vec<f32>>,
    pub sample_rate: Option<u32>,
}

impl SynthesizedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: Some(samples),
            sample_rate: Some(sample_rate),
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// Samples and rate, if this line carries usable audio.
    pub fn voiced(&self) -> Option<(&[f32], u32)> {
        match (&self.samples, self.sample_rate) {
            (Some(samples), Some(rate)) if !samples.is_empty() && rate > 0 => {
                Some((samples.as_slice(), rate))
            }
            _ => None,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.voiced()
            .map(|(samples, rate)| samples.len() as f64 / rate as f64)
    }
}

/// Video encoding strategy requested for the final render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    #[default]
    Fast,
    Quality,
}

impl std::str::FromStr for EncodingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "quality" => Ok(Self::Quality),
            other => Err(format!("unknown encoding mode '{other}'")),
        }
    }
}
