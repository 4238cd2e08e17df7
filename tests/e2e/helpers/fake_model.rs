use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tts_gateway::infrastructure::model::{ModelError, ModelParams, RawAudio, SpeechModel};

pub const SAMPLE_RATE: u32 = 24_000;

/// What the gateway asked the model to do
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub text: String,
    pub language: String,
    pub exaggeration: f32,
    pub temperature: f32,
    pub with_voice_prompt: bool,
}

/// In-process stand-in for the inference server
#[derive(Clone, Default)]
pub struct FakeModel {
    pub calls: Arc<Mutex<Vec<ModelCall>>>,
    pub prepared: Arc<Mutex<Vec<String>>>,
    delay: Duration,
    fail_on: Option<String>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail any call whose text contains `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.text.clone()).collect()
    }
}

#[async_trait]
impl SpeechModel for FakeModel {
    async fn synthesize(&mut self, params: ModelParams<'_>) -> Result<RawAudio, ModelError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.calls.lock().push(ModelCall {
            text: params.text.to_string(),
            language: params.language.as_str().to_string(),
            exaggeration: params.exaggeration,
            temperature: params.temperature,
            with_voice_prompt: params.voice_prompt.is_some(),
        });

        if let Some(needle) = &self.fail_on {
            if params.text.contains(needle.as_str()) {
                return Err(ModelError::Inference("out of memory".to_string()));
            }
        }

        // 10ms of audio per character keeps segments distinguishable by size
        let len = params.text.chars().count() * (SAMPLE_RATE as usize / 100);
        Ok(RawAudio {
            samples: (0..len).map(|i| ((i % 100) as f32 / 100.0) - 0.5).collect(),
            sample_rate: SAMPLE_RATE,
        })
    }

    async fn prepare_voice(&mut self, path: &Path, _exaggeration: f32) -> Result<(), ModelError> {
        self.prepared.lock().push(path.display().to_string());
        Ok(())
    }
}
