use crate::infrastructure::model::SpeechModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceIdentity {
    Female,
    Male,
    #[default]
    Neutral,
}

impl VoiceIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceIdentity::Female => "female",
            VoiceIdentity::Male => "male",
            VoiceIdentity::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for VoiceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum expressiveness per cloned voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceShaping {
    pub female_floor: f32,
    pub male_floor: f32,
}

impl Default for VoiceShaping {
    fn default() -> Self {
        Self {
            female_floor: 0.45,
            male_floor: 0.30,
        }
    }
}

impl VoiceShaping {
    pub fn floor(&self, voice: VoiceIdentity) -> Option<f32> {
        match voice {
            VoiceIdentity::Female => Some(self.female_floor),
            VoiceIdentity::Male => Some(self.male_floor),
            VoiceIdentity::Neutral => None,
        }
    }

    /// Effective expressiveness: never below the voice's floor
    pub fn shape(&self, voice: VoiceIdentity, requested: f32) -> f32 {
        match self.floor(voice) {
            Some(floor) => requested.max(floor),
            None => requested,
        }
    }
}

/// Reference to a prepared voice profile passed to the model as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceHandle {
    path: PathBuf,
}

impl VoiceHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
struct VoiceProfile {
    handle: VoiceHandle,
    loaded: bool,
}

/// Voice profiles prepared once at startup; read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct VoiceRegistry {
    profiles: HashMap<VoiceIdentity, VoiceProfile>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum VoiceLookup<'a> {
    /// Neutral voice: no conditioning prompt
    Neutral,
    Ready(&'a VoiceHandle),
    NotLoaded,
}

impl VoiceRegistry {
    /// Prepare every configured profile with the model.
    ///
    /// A missing file or a failed preparation leaves that voice unavailable
    /// but never aborts startup.
    pub async fn load(
        model: &mut dyn SpeechModel,
        paths: &[(VoiceIdentity, PathBuf)],
        shaping: &VoiceShaping,
    ) -> Self {
        let mut profiles = HashMap::new();

        for (voice, path) in paths {
            let path = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            let loaded = if path.exists() {
                let exaggeration = shaping.floor(*voice).unwrap_or(0.0);
                tracing::info!(voice = %voice, path = %path.display(), "Loading voice profile");
                match model.prepare_voice(&path, exaggeration).await {
                    Ok(()) => {
                        tracing::info!(voice = %voice, "Voice profile loaded");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(voice = %voice, error = %e, "Failed to load voice profile");
                        false
                    }
                }
            } else {
                tracing::warn!(voice = %voice, path = %path.display(), "Voice profile path not found");
                false
            };

            profiles.insert(
                *voice,
                VoiceProfile {
                    handle: VoiceHandle { path },
                    loaded,
                },
            );
        }

        Self { profiles }
    }

    pub fn lookup(&self, voice: VoiceIdentity) -> VoiceLookup<'_> {
        if voice == VoiceIdentity::Neutral {
            return VoiceLookup::Neutral;
        }
        match self.profiles.get(&voice) {
            Some(profile) if profile.loaded => VoiceLookup::Ready(&profile.handle),
            _ => VoiceLookup::NotLoaded,
        }
    }

    pub fn is_loaded(&self, voice: VoiceIdentity) -> bool {
        !matches!(self.lookup(voice), VoiceLookup::NotLoaded)
    }
}
