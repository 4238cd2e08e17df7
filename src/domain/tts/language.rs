use super::segmenter::approx_word_count;
use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ISO 639-1 language codes supported by the voice model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "da")]
    Danish,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "el")]
    Greek,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fi")]
    Finnish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "ms")]
    Malay,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "no")]
    Norwegian,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "sv")]
    Swedish,
    #[serde(rename = "sw")]
    Swahili,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "zh")]
    Chinese,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 23] = [
        LanguageCode::Arabic,
        LanguageCode::Danish,
        LanguageCode::German,
        LanguageCode::Greek,
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::Finnish,
        LanguageCode::French,
        LanguageCode::Hebrew,
        LanguageCode::Hindi,
        LanguageCode::Italian,
        LanguageCode::Japanese,
        LanguageCode::Korean,
        LanguageCode::Malay,
        LanguageCode::Dutch,
        LanguageCode::Norwegian,
        LanguageCode::Polish,
        LanguageCode::Portuguese,
        LanguageCode::Russian,
        LanguageCode::Swedish,
        LanguageCode::Swahili,
        LanguageCode::Turkish,
        LanguageCode::Chinese,
    ];

    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Arabic => "ar",
            LanguageCode::Danish => "da",
            LanguageCode::German => "de",
            LanguageCode::Greek => "el",
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::Finnish => "fi",
            LanguageCode::French => "fr",
            LanguageCode::Hebrew => "he",
            LanguageCode::Hindi => "hi",
            LanguageCode::Italian => "it",
            LanguageCode::Japanese => "ja",
            LanguageCode::Korean => "ko",
            LanguageCode::Malay => "ms",
            LanguageCode::Dutch => "nl",
            LanguageCode::Norwegian => "no",
            LanguageCode::Polish => "pl",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Russian => "ru",
            LanguageCode::Swedish => "sv",
            LanguageCode::Swahili => "sw",
            LanguageCode::Turkish => "tr",
            LanguageCode::Chinese => "zh",
        }
    }

    /// English display name
    pub fn name(&self) -> &'static str {
        match self {
            LanguageCode::Arabic => "Arabic",
            LanguageCode::Danish => "Danish",
            LanguageCode::German => "German",
            LanguageCode::Greek => "Greek",
            LanguageCode::English => "English",
            LanguageCode::Spanish => "Spanish",
            LanguageCode::Finnish => "Finnish",
            LanguageCode::French => "French",
            LanguageCode::Hebrew => "Hebrew",
            LanguageCode::Hindi => "Hindi",
            LanguageCode::Italian => "Italian",
            LanguageCode::Japanese => "Japanese",
            LanguageCode::Korean => "Korean",
            LanguageCode::Malay => "Malay",
            LanguageCode::Dutch => "Dutch",
            LanguageCode::Norwegian => "Norwegian",
            LanguageCode::Polish => "Polish",
            LanguageCode::Portuguese => "Portuguese",
            LanguageCode::Russian => "Russian",
            LanguageCode::Swedish => "Swedish",
            LanguageCode::Swahili => "Swahili",
            LanguageCode::Turkish => "Turkish",
            LanguageCode::Chinese => "Chinese",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Option<Self> {
        let code = match language {
            Language::Arabic => LanguageCode::Arabic,
            Language::Danish => LanguageCode::Danish,
            Language::German => LanguageCode::German,
            Language::Greek => LanguageCode::Greek,
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::Finnish => LanguageCode::Finnish,
            Language::French => LanguageCode::French,
            Language::Hebrew => LanguageCode::Hebrew,
            Language::Hindi => LanguageCode::Hindi,
            Language::Italian => LanguageCode::Italian,
            Language::Japanese => LanguageCode::Japanese,
            Language::Korean => LanguageCode::Korean,
            Language::Malay => LanguageCode::Malay,
            Language::Dutch => LanguageCode::Dutch,
            Language::Bokmal | Language::Nynorsk => LanguageCode::Norwegian,
            Language::Polish => LanguageCode::Polish,
            Language::Portuguese => LanguageCode::Portuguese,
            Language::Russian => LanguageCode::Russian,
            Language::Swedish => LanguageCode::Swedish,
            Language::Swahili => LanguageCode::Swahili,
            Language::Turkish => LanguageCode::Turkish,
            Language::Chinese => LanguageCode::Chinese,
            #[allow(unreachable_patterns)]
            _ => return None,
        };
        Some(code)
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        LanguageCode::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == code)
            .ok_or_else(|| format!("unsupported language '{}'", s))
    }
}

/// Build a detector restricted to the languages the model can speak
pub fn build_detector() -> LanguageDetector {
    let languages = [
        Language::Arabic,
        Language::Danish,
        Language::German,
        Language::Greek,
        Language::English,
        Language::Spanish,
        Language::Finnish,
        Language::French,
        Language::Hebrew,
        Language::Hindi,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Malay,
        Language::Dutch,
        Language::Bokmal,
        Language::Nynorsk,
        Language::Polish,
        Language::Portuguese,
        Language::Russian,
        Language::Swedish,
        Language::Swahili,
        Language::Turkish,
        Language::Chinese,
    ];

    LanguageDetectorBuilder::from_languages(&languages).build()
}

/// Fewer words than this never leave the English default
pub const MIN_DETECTION_WORDS: usize = 4;
/// Share of the total confidence the top language must hold
pub const MIN_DETECTION_CONFIDENCE: f64 = 0.6;

/// Detect the language of the given text, defaulting to English.
///
/// Short inputs and low-confidence guesses stay English.
pub fn detect_language(detector: &LanguageDetector, text: &str) -> LanguageCode {
    let words = approx_word_count(text);
    if words < MIN_DETECTION_WORDS {
        tracing::debug!(words, "Text too short for language detection, using English");
        return LanguageCode::English;
    }

    // Bokmal and Nynorsk both count towards Norwegian
    let mut scores: Vec<(LanguageCode, f64)> = Vec::new();
    for (language, confidence) in detector.compute_language_confidence_values(text) {
        let Some(code) = LanguageCode::from_lingua(language) else {
            continue;
        };
        match scores.iter_mut().find(|(c, _)| *c == code) {
            Some((_, total)) => *total += confidence,
            None => scores.push((code, confidence)),
        }
    }

    match scores
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
    {
        Some((code, confidence)) if confidence >= MIN_DETECTION_CONFIDENCE => {
            tracing::debug!(language = %code, confidence, "Detected input language");
            code
        }
        best => {
            tracing::warn!(
                best = ?best.map(|(code, _)| code.as_str()),
                confidence = best.map_or(0.0, |(_, c)| c),
                "Could not detect language, falling back to English"
            );
            LanguageCode::English
        }
    }
}
