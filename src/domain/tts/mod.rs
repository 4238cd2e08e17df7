pub mod dto;
pub mod error;
pub mod language;
pub mod planner;
pub mod scheduler;
pub mod segmenter;
pub mod service;
pub mod stream;
pub mod voice;

pub use dto::{LanguagesResponse, SpeechRequest, SynthesisRequest};
pub use error::TtsServiceError;
pub use language::{detect_language, LanguageCode};
pub use planner::{plan, Chunk, ChunkOptions, ChunkPlan, ChunkPolicy};
pub use scheduler::{ActiveRequests, AudioSegment, SynthesisScheduler};
pub use segmenter::{segment, SentenceSpan};
pub use service::{
    HealthSnapshot, StreamingSynthesis, SynthesisOutput, TtsService, TtsServiceApi, TtsSettings,
};
pub use stream::SegmentStream;
pub use voice::{VoiceIdentity, VoiceRegistry, VoiceShaping};
