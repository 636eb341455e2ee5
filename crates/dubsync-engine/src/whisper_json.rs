use dubsync_core::{EngineError, TimedChunk, Transcript};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WhisperDocument {
    #[serde(default)]
    text: String,
    #[serde(default)]
    chunks: Vec<WhisperChunk>,
}

#[derive(Debug, Deserialize)]
struct WhisperChunk {
    #[serde(default)]
    text: String,
    #[serde(default)]
    timestamp: Vec<Option<f64>>,
}

/// Parse `{"text": ..., "chunks": [{"text": ..., "timestamp": [start, end]}]}`.
pub fn parse_whisper_json(input: &str) -> Result<Transcript, EngineError> {
    let doc: WhisperDocument = serde_json::from_str(input)
        .map_err(|e| EngineError::ProcessingFailed(format!("invalid transcript JSON: {e}")))?;
    let chunks = doc
        .chunks
        .into_iter()
        .map(|chunk| {
            let start = chunk.timestamp.first().copied().flatten();
            let end = chunk.timestamp.get(1).copied().flatten();
            TimedChunk::new(chunk.text, start, end)
        })
        .collect();
    Ok(Transcript {
        text: doc.text,
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let json = r#"{"text": " Hello world.", "chunks": [
            {"text": " Hello", "timestamp": [0.0, 0.4]},
            {"text": " world.", "timestamp": [0.4, null]}
        ]}"#;
        let transcript = parse_whisper_json(json).unwrap();
        assert_eq!(transcript.text, " Hello world.");
        assert_eq!(transcript.chunks.len(), 2);
        assert_eq!(transcript.chunks[0].start, Some(0.0));
        assert_eq!(transcript.chunks[0].end, Some(0.4));
        assert_eq!(transcript.chunks[1].end, None);
    }

    #[test]
    fn test_parse_missing_chunks_and_timestamps() {
        let transcript = parse_whisper_json(r#"{"text": "just text"}"#).unwrap();
        assert!(transcript.chunks.is_empty());

        let transcript = parse_whisper_json(r#"{"chunks": [{"text": "x"}]}"#).unwrap();
        assert_eq!(transcript.chunks[0].start, None);
        assert_eq!(transcript.chunks[0].end, None);
        assert!(transcript.text.is_empty());
    }

    #[test]
    fn test_parse_invalid_json_is_processing_error() {
        let err = parse_whisper_json("not json").unwrap_err();
        assert!(matches!(err, EngineError::ProcessingFailed(_)));
    }
}
