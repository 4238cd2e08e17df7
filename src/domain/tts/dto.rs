use super::error::TtsServiceError;
use super::language::LanguageCode;
use super::planner::ChunkOptions;
use super::voice::VoiceIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub const MAX_INPUT_CHARS: usize = 5000;
const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.1..=1.5;
const CFG_WEIGHT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
const EXAGGERATION_RANGE: RangeInclusive<f32> = 0.0..=1.0;
const SPEED_RANGE: RangeInclusive<f32> = 0.5..=2.0;
const CHUNK_WORDS_RANGE: RangeInclusive<usize> = 5..=2000;
const CHUNK_SENTENCES_RANGE: RangeInclusive<usize> = 1..=200;

/// Request for POST /v1/audio/speech and /v1/audio/speech/stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub input: String,
    /// ISO 639-1 code; English when omitted unless the service detects otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub voice: VoiceIdentity,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f32,
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_true")]
    pub stream: bool,
    #[serde(default = "default_true")]
    pub chunk_by_sentences: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunk_words: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunk_sentences: Option<usize>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_cfg_weight() -> f32 {
    0.4
}

fn default_exaggeration() -> f32 {
    0.3
}

fn default_speed() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// A request that passed validation, with its language resolved
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: LanguageCode,
    pub voice: VoiceIdentity,
    pub temperature: f32,
    pub cfg_weight: f32,
    pub exaggeration: f32,
    pub speed: f32,
    pub stream: bool,
    pub chunking: ChunkOptions,
}

impl SpeechRequest {
    /// Check every bound and resolve the language, defaulting to English
    pub fn validate(self) -> Result<SynthesisRequest, TtsServiceError> {
        if self.input.trim().is_empty() {
            return Err(TtsServiceError::Validation("input cannot be empty".to_string()));
        }
        let char_count = self.input.chars().count();
        if char_count > MAX_INPUT_CHARS {
            return Err(TtsServiceError::Validation(format!(
                "input must be {} characters or less, got {}",
                MAX_INPUT_CHARS, char_count
            )));
        }

        check_range("temperature", self.temperature, &TEMPERATURE_RANGE)?;
        check_range("cfg_weight", self.cfg_weight, &CFG_WEIGHT_RANGE)?;
        check_range("exaggeration", self.exaggeration, &EXAGGERATION_RANGE)?;
        check_range("speed", self.speed, &SPEED_RANGE)?;
        if let Some(words) = self.max_chunk_words {
            check_range("max_chunk_words", words, &CHUNK_WORDS_RANGE)?;
        }
        if let Some(sentences) = self.max_chunk_sentences {
            check_range("max_chunk_sentences", sentences, &CHUNK_SENTENCES_RANGE)?;
        }

        let language = match self.language.as_deref() {
            Some(code) => code
                .parse::<LanguageCode>()
                .map_err(TtsServiceError::Validation)?,
            None => LanguageCode::English,
        };

        Ok(SynthesisRequest {
            text: self.input,
            language,
            voice: self.voice,
            temperature: self.temperature,
            cfg_weight: self.cfg_weight,
            exaggeration: self.exaggeration,
            speed: self.speed,
            stream: self.stream,
            chunking: ChunkOptions {
                enabled: self.chunk_by_sentences,
                max_words: self.max_chunk_words,
                max_sentences: self.max_chunk_sentences,
            },
        })
    }
}

fn check_range<T>(field: &str, value: T, range: &RangeInclusive<T>) -> Result<(), TtsServiceError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(TtsServiceError::Validation(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Response for GET /languages
#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: BTreeMap<String, String>,
    pub count: usize,
}

impl LanguagesResponse {
    pub fn supported() -> Self {
        let languages: BTreeMap<String, String> = LanguageCode::ALL
            .iter()
            .map(|lang| (lang.as_str().to_string(), lang.name().to_string()))
            .collect();
        Self {
            count: languages.len(),
            languages,
        }
    }
}
