pub mod pipeline;
pub mod renderer;
pub mod segmenter;
pub mod synchronizer;

pub use pipeline::{Pipeline, RunReport, ORIGINAL_SUBTITLES, SYNCED_SUBTITLES, TRANSLATED_SUBTITLES};
pub use renderer::{RenderOutcome, Renderer};
pub use segmenter::Segmenter;
pub use synchronizer::{SyncOutput, Synchronizer};
