use regex::Regex;
use std::sync::LazyLock;

use super::canonical::normalize_whitespace;

const MIN_WORDS: usize = 3;
const MAX_SENTENCES: usize = 8;

static NUMBERED_ITEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s*").ok());

/// Extracts step lines from free-form generated text.
///
/// A numbered list ("1. ...", "2. ...") is preferred; each item runs until the
/// next numbered line or the end. Without one, the text is split into
/// sentences and up to eight are kept. Lines under three words are dropped in
/// both cases. An empty result means nothing usable was produced.
pub fn parse_generated_steps(generated: &str) -> Vec<String> {
    let numbered = parse_numbered(generated);
    if !numbered.is_empty() {
        return numbered;
    }
    split_sentences(generated)
}

fn parse_numbered(generated: &str) -> Vec<String> {
    let Some(re) = NUMBERED_ITEM.as_ref() else {
        return Vec::new();
    };
    let markers: Vec<_> = re.find_iter(generated).collect();
    markers
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let end = markers
                .get(i + 1)
                .map_or(generated.len(), |next| next.start());
            clean_line(&generated[m.end()..end])
        })
        .collect()
}

fn split_sentences(generated: &str) -> Vec<String> {
    let flat = normalize_whitespace(generated);
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = flat.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '?' | '!') {
            if let Some(&(next_idx, ' ')) = chars.peek() {
                sentences.push(&flat[start..next_idx]);
                start = next_idx + 1;
            }
        }
    }
    if start < flat.len() {
        sentences.push(&flat[start..]);
    }
    sentences
        .into_iter()
        .filter_map(clean_line)
        .take(MAX_SENTENCES)
        .collect()
}

fn clean_line(raw: &str) -> Option<String> {
    let mut line = normalize_whitespace(raw);
    if line.split_whitespace().count() < MIN_WORDS {
        return None;
    }
    if !line.ends_with(['.', '!', '?']) {
        line.push('.');
    }
    Some(line)
}
