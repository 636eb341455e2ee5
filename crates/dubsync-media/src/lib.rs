pub mod arena;
pub mod backend;
pub mod encoder;
pub mod filtergraph;
pub mod fragment;
pub mod probe;
pub mod wav;

pub use arena::{remove_with_retry, CleanupReport, RunArena};
pub use backend::{FfmpegBackend, MediaBackend};
pub use encoder::{EncoderProfile, RenderJob};
pub use filtergraph::{build_filter_graph, FilterGraph, MIX_SAMPLE_RATE};
pub use fragment::{FragmentAudio, SyncFragment};
pub use probe::{parse_ffprobe_output, SourceVideo};
pub use wav::{read_wav_mono, write_padded_wav};
