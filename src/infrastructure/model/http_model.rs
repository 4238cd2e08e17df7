use super::{ModelError, ModelParams, RawAudio, SpeechModel};
use async_trait::async_trait;
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Speech model served by an out-of-process inference server.
///
/// The server owns the weights and the device; this client only forwards one
/// request at a time and decodes the WAV it gets back.
pub struct HttpSpeechModel {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    text: &'a str,
    language_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_prompt_path: Option<String>,
    exaggeration: f32,
    cfg_weight: f32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct PrepareVoiceBody {
    path: String,
    exaggeration: f32,
}

impl HttpSpeechModel {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Vec<u8>, ModelError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "Model server request failed");
                ModelError::Transport(e.to_string())
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).chars().take(500).collect(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechModel for HttpSpeechModel {
    async fn synthesize(&mut self, params: ModelParams<'_>) -> Result<RawAudio, ModelError> {
        let start_time = std::time::Instant::now();
        let body = GenerateBody {
            text: params.text,
            language_id: params.language.as_str(),
            audio_prompt_path: params.voice_prompt.map(|p| p.display().to_string()),
            exaggeration: params.exaggeration,
            cfg_weight: params.cfg_weight,
            temperature: params.temperature,
        };

        let wav = self.post_json("/generate", &body).await?;
        let audio = decode_wav(&wav)?;

        tracing::debug!(
            language = %params.language,
            text_length = params.text.len(),
            samples = audio.samples.len(),
            sample_rate = audio.sample_rate,
            latency_ms = start_time.elapsed().as_millis(),
            "Model server generation completed"
        );

        Ok(audio)
    }

    async fn prepare_voice(&mut self, path: &Path, exaggeration: f32) -> Result<(), ModelError> {
        let body = PrepareVoiceBody {
            path: path.display().to_string(),
            exaggeration,
        };
        self.post_json("/voices/prepare", &body)
            .await
            .map(|_| ())
            .map_err(|e| ModelError::Voice(e.to_string()))
    }
}

/// Decode a WAV payload into mono f32 samples, averaging channels if needed
pub fn decode_wav(bytes: &[u8]) -> Result<RawAudio, ModelError> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| ModelError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| ModelError::Decode(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| ModelError::Decode(e.to_string()))?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(RawAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}
