//! Text splitting utilities used by the packer.
//!
//! All lengths are counted in `char`s so slicing never lands inside a
//! multi-byte sequence.

/// An indivisible piece of text handed to the packer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unit {
    pub text: String,
    /// Length of `text` in chars.
    pub len: usize,
}

impl Unit {
    pub fn new(text: String) -> Self {
        let len = text.chars().count();
        Self { text, len }
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub(crate) fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split on runs of blank lines (lines that are empty or whitespace-only).
/// Returns the raw paragraph text; empty paragraphs are skipped.
pub(crate) fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Trim and collapse every whitespace run to a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split at runs of `.`, `!` or `?` followed by whitespace or end of text.
/// Trailing text without terminal punctuation becomes its own sentence.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        // Consume the whole punctuation run ("?!", "...").
        while let Some(&(_, next)) = chars.peek() {
            if is_terminal(next) {
                chars.next();
            } else {
                break;
            }
        }
        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Cut `text` into consecutive slices of at most `size` chars.
/// Slices are trimmed; whitespace-only slices are dropped.
pub(crate) fn hard_split(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|slice| slice.iter().collect::<String>().trim().to_string())
        .filter(|slice| !slice.is_empty())
        .collect()
}

/// Join unit texts with single spaces.
pub(crate) fn join_units(units: &[Unit]) -> String {
    units
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Length of `units` once joined with single spaces.
pub(crate) fn joined_len(units: &[Unit]) -> usize {
    let text: usize = units.iter().map(|u| u.len).sum();
    text + units.len().saturating_sub(1)
}

/// Whole trailing units of `units` whose joined length fits in `budget`,
/// in their original order. Empty when even the last unit is too long.
pub(crate) fn overlap_prefix(units: &[Unit], budget: usize) -> Vec<Unit> {
    let mut taken = 0;
    let mut len = 0;
    for unit in units.iter().rev() {
        let next_len = if taken == 0 { unit.len } else { len + 1 + unit.len };
        if next_len > budget {
            break;
        }
        len = next_len;
        taken += 1;
    }
    units[units.len() - taken..].to_vec()
}
