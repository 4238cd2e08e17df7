use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::tts::service::TtsSettings;
use crate::domain::tts::{ChunkPolicy, VoiceIdentity, VoiceShaping};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Upstream model server
    pub model_server_url: String,
    pub model_timeout_secs: u64,
    // Synthesis
    pub max_workers: usize,
    pub fast_mode: bool,
    pub chunk_size: usize,
    pub fast_chunk_size: usize,
    pub long_text_word_threshold: usize,
    pub min_chunk_words: usize,
    pub female_exaggeration: f32,
    pub male_exaggeration: f32,
    pub female_voice_path: PathBuf,
    pub male_voice_path: PathBuf,
    pub skip_warmup: bool,
    // TTS Cache
    pub tts_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 4123)?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            model_server_url: env::var("MODEL_SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5002".to_string()),
            model_timeout_secs: parse_var("MODEL_TIMEOUT_SECS", 120)?,
            max_workers: parse_var("CHATTERBOX_MAX_WORKERS", 3)?,
            fast_mode: flag("CHATTERBOX_FAST_MODE", true),
            chunk_size: parse_var("CHATTERBOX_CHUNK_SIZE", 15)?,
            fast_chunk_size: parse_var("CHATTERBOX_FAST_CHUNK_SIZE", 10)?,
            long_text_word_threshold: parse_var("CHATTERBOX_LONG_TEXT_WORD_THRESHOLD", 150)?,
            min_chunk_words: parse_var("CHATTERBOX_MIN_CHUNK_WORDS", 60)?,
            female_exaggeration: parse_var("CHATTERBOX_FEMALE_EXAGGERATION", 0.45)?,
            male_exaggeration: parse_var("CHATTERBOX_MALE_EXAGGERATION", 0.30)?,
            female_voice_path: env::var("CHATTERBOX_FEMALE_VOICE")
                .unwrap_or_else(|_| "voices/female.wav".to_string())
                .into(),
            male_voice_path: env::var("CHATTERBOX_MALE_VOICE")
                .unwrap_or_else(|_| "voices/male.wav".to_string())
                .into(),
            skip_warmup: flag("CHATTERBOX_SKIP_WARMUP", false),
            tts_cache_enabled: flag("TTS_CACHE_ENABLED", false),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Words per chunk when a request gives no target
    pub fn default_chunk_words(&self) -> usize {
        if self.fast_mode {
            self.fast_chunk_size
        } else {
            self.chunk_size
        }
    }

    pub fn tts_settings(&self) -> TtsSettings {
        TtsSettings {
            policy: ChunkPolicy {
                default_words: self.default_chunk_words(),
                min_chunk_words: self.min_chunk_words,
                long_text_threshold: self.long_text_word_threshold,
            },
            shaping: VoiceShaping {
                female_floor: self.female_exaggeration,
                male_floor: self.male_exaggeration,
            },
            max_workers: self.max_workers,
            cache_enabled: self.tts_cache_enabled,
            voice_paths: vec![
                (VoiceIdentity::Female, self.female_voice_path.clone()),
                (VoiceIdentity::Male, self.male_voice_path.clone()),
            ],
            warmup: !self.skip_warmup,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid value for {}: {} ({})", name, raw, e).into()),
        Err(_) => Ok(default),
    }
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
