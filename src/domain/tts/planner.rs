use super::segmenter::{approx_word_count, segment, SentenceSpan};

/// One synthesis unit: a run of whole sentences copied verbatim from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Chunk {
    fn from_range(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            text: text[start..end].to_string(),
        }
    }
}

/// Service-wide chunk sizing knobs
#[derive(Debug, Clone, Copy)]
pub struct ChunkPolicy {
    /// Words per chunk when the caller gives no target
    pub default_words: usize,
    /// Floor applied to `default_words`
    pub min_chunk_words: usize,
    /// Inputs at or below this many words stay whole unless the caller sets a target
    pub long_text_threshold: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            default_words: 10,
            min_chunk_words: 60,
            long_text_threshold: 150,
        }
    }
}

/// Per-request chunking switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    pub enabled: bool,
    pub max_words: Option<usize>,
    pub max_sentences: Option<usize>,
}

/// Result of planning, with the targets that were actually applied
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub chunks: Vec<Chunk>,
    pub word_target: usize,
    pub max_sentences: Option<usize>,
}

/// Group sentence spans into chunks.
///
/// A chunk is closed before a span when adding it would exceed `word_target`
/// words or `max_sentences` sentences, but only if the chunk already holds a
/// sentence: a single oversized sentence always becomes its own chunk.
/// With `chunking_enabled == false` the whole text is one chunk.
pub fn plan_spans(
    text: &str,
    spans: &[SentenceSpan],
    word_target: usize,
    max_sentences: Option<usize>,
    chunking_enabled: bool,
) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }
    if !chunking_enabled || spans.is_empty() {
        return vec![Chunk::from_range(text, 0, text.len())];
    }

    let mut chunks = Vec::new();
    let mut chunk_start = spans[0].start;
    let mut word_count = 0;
    let mut sentence_count = 0;

    for span in spans {
        let sentence_words = approx_word_count(span.slice(text));
        let over_words = word_count + sentence_words > word_target;
        let over_sentences = max_sentences.is_some_and(|max| sentence_count + 1 > max);

        if sentence_count > 0 && (over_words || over_sentences) {
            chunks.push(Chunk::from_range(text, chunk_start, span.start));
            chunk_start = span.start;
            word_count = 0;
            sentence_count = 0;
        }

        word_count += sentence_words;
        sentence_count += 1;
    }

    if let Some(last) = spans.last() {
        chunks.push(Chunk::from_range(text, chunk_start, last.end));
    }

    chunks
}

/// Decide whether and how to chunk `text`, then plan the chunks.
///
/// An explicit `max_words` always wins: chunking then applies whenever the
/// text is longer than that target. Without it, only texts longer than the
/// long-text threshold are chunked, so short replies stay whole.
pub fn plan(text: &str, options: ChunkOptions, policy: &ChunkPolicy) -> ChunkPlan {
    let total_words = approx_word_count(text);

    if !options.enabled {
        return ChunkPlan {
            chunks: plan_spans(text, &[], total_words, None, false),
            word_target: total_words,
            max_sentences: None,
        };
    }

    let (word_target, should_chunk) = match options.max_words {
        Some(target) => (target, total_words > target),
        None => (
            policy.default_words.max(policy.min_chunk_words),
            total_words > policy.long_text_threshold,
        ),
    };

    if !should_chunk {
        return ChunkPlan {
            chunks: plan_spans(text, &[], total_words, None, false),
            word_target: total_words,
            max_sentences: None,
        };
    }

    let spans = segment(text);
    ChunkPlan {
        chunks: plan_spans(text, &spans, word_target, options.max_sentences, true),
        word_target,
        max_sentences: options.max_sentences,
    }
}
