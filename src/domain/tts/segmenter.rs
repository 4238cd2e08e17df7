use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence-final punctuation (ASCII and CJK) followed by whitespace
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?。！？]\s+").expect("sentence boundary pattern is valid")
});

/// Byte range of one sentence inside the original text.
///
/// A span includes its terminal punctuation and the whitespace run that
/// follows it, so spans tile the input with no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
}

impl SentenceSpan {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Split `text` into sentence spans whose concatenation is exactly `text`
pub fn segment(text: &str) -> Vec<SentenceSpan> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut last_end = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        spans.push(SentenceSpan {
            start: last_end,
            end: boundary.end(),
        });
        last_end = boundary.end();
    }

    // Trailing remainder, or the whole text when nothing matched
    if last_end < text.len() {
        spans.push(SentenceSpan {
            start: last_end,
            end: text.len(),
        });
    }

    spans
}

/// Approximate word count used for chunk sizing.
///
/// Whitespace-separated tokens count as one word each. A token containing
/// characters from a script written without spaces (Han, kana, Thai, Lao,
/// Khmer, Myanmar) counts as roughly one word per four characters instead.
/// This is a known approximation, not tuned against real CJK tokenization.
pub fn approx_word_count(text: &str) -> usize {
    let words: usize = text
        .split_whitespace()
        .map(|token| {
            if token.chars().any(is_unspaced_script) {
                (token.chars().count() / 4).max(1)
            } else {
                1
            }
        })
        .sum();

    if words > 0 {
        return words;
    }
    (text.chars().count() / 4).max(1)
}

fn is_unspaced_script(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{30FF}'   // CJK punctuation, hiragana, katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility ideographs
        | '\u{FF00}'..='\u{FFEF}' // full-width forms
        | '\u{0E00}'..='\u{0EFF}' // Thai, Lao
        | '\u{1000}'..='\u{109F}' // Myanmar
        | '\u{1780}'..='\u{17FF}' // Khmer
        | '\u{20000}'..='\u{2FA1F}'
    )
}
