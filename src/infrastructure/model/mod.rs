pub mod http_model;

pub use http_model::HttpSpeechModel;

use crate::domain::tts::LanguageCode;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Parameters for a single model invocation
#[derive(Debug, Clone, Copy)]
pub struct ModelParams<'a> {
    pub text: &'a str,
    pub language: LanguageCode,
    /// Voice profile to condition on. `None` means the model's neutral voice.
    pub voice_prompt: Option<&'a Path>,
    pub temperature: f32,
    pub cfg_weight: f32,
    pub exaggeration: f32,
}

/// Raw model output: mono f32 samples in [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model server request failed: {0}")]
    Transport(String),
    #[error("model server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid audio from model: {0}")]
    Decode(String),
    #[error("voice preparation failed: {0}")]
    Voice(String),
    #[error("{0}")]
    Inference(String),
}

/// Neural voice model used to render text.
///
/// Implementations are NOT required to be reentrant: every method takes
/// `&mut self`, so callers can only reach the model through a [`ModelHandle`],
/// which serializes access process-wide.
#[async_trait]
pub trait SpeechModel: Send {
    /// Render `params.text` to raw samples
    async fn synthesize(&mut self, params: ModelParams<'_>) -> Result<RawAudio, ModelError>;

    /// Pre-compute conditionals for a voice profile so later calls can reuse it
    async fn prepare_voice(&mut self, _path: &Path, _exaggeration: f32) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Exclusive handle to the single shared model instance
pub type ModelHandle = Arc<Mutex<Box<dyn SpeechModel>>>;

pub fn into_handle(model: Box<dyn SpeechModel>) -> ModelHandle {
    Arc::new(Mutex::new(model))
}
