use crate::srt::Caption;
use crate::types::Segment;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Emotion {
    /// Map a recognizer label to an emotion, `None` for non-emotion labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "neutral" => Some(Self::Neutral),
            "happy" => Some(Self::Happy),
            "sad" => Some(Self::Sad),
            "angry" => Some(Self::Angry),
            "fear" | "fearful" => Some(Self::Fearful),
            "disgust" | "disgusted" => Some(Self::Disgusted),
            "surprise" | "surprised" => Some(Self::Surprised),
            _ => None,
        }
    }

    /// First emotion `<|TAG|>` in a tagged transcription. Language and event
    /// tags such as `<|en|>` or `<|Speech|>` are skipped.
    pub fn from_tagged(transcription: &str) -> Self {
        let Some(re) = tag_pattern() else {
            return Self::Neutral;
        };
        re.captures_iter(transcription)
            .find_map(|cap| Self::from_label(&cap[1]))
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Fearful => "fearful",
            Self::Disgusted => "disgusted",
            Self::Surprised => "surprised",
        }
    }
}

fn tag_pattern() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<\|([A-Za-z]+)\|>").ok())
        .as_ref()
}

/// Remove every `<|TAG|>` marker and collapse the whitespace left behind.
pub fn strip_tags(text: &str) -> String {
    let stripped = match tag_pattern() {
        Some(re) => re.replace_all(text, " "),
        None => Cow::Borrowed(text),
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A segment carrying an optional emotion tag.
///
/// Exposes the plain [`Segment`] through `AsRef`, so code that only
/// needs timing and text never sees the annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSegment {
    pub segment: Segment,
    pub emotion: Option<Emotion>,
}

impl AnnotatedSegment {
    pub fn new(segment: Segment, emotion: Option<Emotion>) -> Self {
        Self { segment, emotion }
    }

    /// Subtitle text with a `[EMOTION]` prefix for non-neutral lines.
    pub fn caption_text(&self) -> Cow<'_, str> {
        match self.emotion {
            Some(emotion) if emotion != Emotion::Neutral => Cow::Owned(format!(
                "[{}] {}",
                emotion.label().to_uppercase(),
                self.segment.text()
            )),
            _ => Cow::Borrowed(self.segment.text()),
        }
    }
}

impl AnnotatedSegment {
    /// Lift tagged recognizer output into an annotation. Untagged text is
    /// kept as is with no emotion.
    pub fn from_tagged(segment: Segment) -> Self {
        let tagged = tag_pattern().is_some_and(|re| re.is_match(segment.text()));
        if !tagged {
            return segment.into();
        }
        let emotion = Emotion::from_tagged(segment.text());
        let text = strip_tags(segment.text());
        Self::new(segment.with_text(text), Some(emotion))
    }
}

impl From<Segment> for AnnotatedSegment {
    fn from(segment: Segment) -> Self {
        Self::new(segment, None)
    }
}

impl AsRef<Segment> for AnnotatedSegment {
    fn as_ref(&self) -> &Segment {
        &self.segment
    }
}

impl Caption for AnnotatedSegment {
    fn cue_start(&self) -> Option<f64> {
        Some(self.segment.start())
    }

    fn cue_end(&self) -> Option<f64> {
        Some(self.segment.end())
    }

    fn cue_text(&self) -> Cow<'_, str> {
        self.caption_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tagged_picks_first_tag() {
        assert_eq!(
            Emotion::from_tagged("<|en|><|HAPPY|><|Speech|> hello"),
            Emotion::Happy
        );
        assert_eq!(Emotion::from_tagged("<|SAD|><|ANGRY|>"), Emotion::Sad);
    }

    #[test]
    fn test_from_tagged_aliases() {
        assert_eq!(Emotion::from_tagged("<|FEAR|>"), Emotion::Fearful);
        assert_eq!(Emotion::from_tagged("<|DISGUST|>"), Emotion::Disgusted);
        assert_eq!(Emotion::from_tagged("<|SURPRISE|>"), Emotion::Surprised);
    }

    #[test]
    fn test_from_tagged_without_tags_is_neutral() {
        assert_eq!(Emotion::from_tagged("plain text"), Emotion::Neutral);
        assert_eq!(Emotion::from_tagged("<|ja|><|BGM|>"), Emotion::Neutral);
    }

    #[test]
    fn test_from_label_unknown_is_none() {
        assert_eq!(Emotion::from_label("Speech"), None);
        assert_eq!(Emotion::from_label("NEUTRAL"), Some(Emotion::Neutral));
    }

    #[test]
    fn test_caption_text_prefixes_non_neutral() {
        let seg = AnnotatedSegment::new(Segment::new(0.0, 1.0, "hi"), Some(Emotion::Angry));
        assert_eq!(seg.caption_text(), "[ANGRY] hi");
        let neutral = AnnotatedSegment::new(Segment::new(0.0, 1.0, "hi"), Some(Emotion::Neutral));
        assert_eq!(neutral.caption_text(), "hi");
        let untagged: AnnotatedSegment = Segment::new(0.0, 1.0, "hi").into();
        assert_eq!(untagged.caption_text(), "hi");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<|en|><|HAPPY|> hello  <|Speech|>world"), "hello world");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_annotated_from_tagged_segment() {
        let seg = AnnotatedSegment::from_tagged(Segment::new(0.5, 2.0, "<|en|><|SAD|> goodbye"));
        assert_eq!(seg.emotion, Some(Emotion::Sad));
        assert_eq!(seg.segment.text(), "goodbye");
        assert_eq!(seg.segment.start(), 0.5);

        let plain = AnnotatedSegment::from_tagged(Segment::new(0.0, 1.0, "hello"));
        assert_eq!(plain.emotion, None);
        assert_eq!(plain.segment.text(), "hello");
    }

    #[test]
    fn test_as_ref_exposes_plain_segment() {
        let seg = AnnotatedSegment::new(Segment::new(1.0, 2.0, "x"), Some(Emotion::Happy));
        let plain: &Segment = seg.as_ref();
        assert_eq!(plain.text(), "x");
    }
}
