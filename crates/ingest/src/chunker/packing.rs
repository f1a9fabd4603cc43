//! Unit extraction and greedy packing into overlapping chunks.

use chunkwise_core::Chunk;
use tracing::debug;

use super::helpers::{
    char_len, collapse_whitespace, hard_split, join_units, joined_len, normalize_line_endings,
    overlap_prefix, split_paragraphs, split_sentences, Unit,
};
use super::types::ChunkParams;

/// Chunk `text` with the default 800/100 parameters.
pub fn chunk(text: &str, source_id: &str) -> Vec<Chunk> {
    chunk_text(text, source_id, &ChunkParams::default())
}

/// Split `text` into ordered, overlapping chunks tagged with `source_id`.
///
/// Empty or whitespace-only text yields no chunks. Every chunk is at most
/// `params.target_size()` chars long.
pub fn chunk_text(text: &str, source_id: &str, params: &ChunkParams) -> Vec<Chunk> {
    let units = extract_units(text, params);
    let contents = pack_units(&units, params);
    debug!(
        source_id,
        units = units.len(),
        chunks = contents.len(),
        "chunked document"
    );

    contents
        .into_iter()
        .enumerate()
        .map(|(index, content)| Chunk::new(source_id, index, content))
        .collect()
}

// ── Units ───────────────────────────────────────────────────────────────────

/// Paragraphs become units when short, sentences otherwise; anything still
/// longer than the target size is sliced.
pub(crate) fn extract_units(text: &str, params: &ChunkParams) -> Vec<Unit> {
    let normalized = normalize_line_endings(text);
    let mut units = Vec::new();

    for raw in split_paragraphs(&normalized) {
        let paragraph = collapse_whitespace(&raw);
        if paragraph.is_empty() {
            continue;
        }
        let pieces = if params.keeps_paragraph_whole(char_len(&paragraph)) {
            vec![paragraph]
        } else {
            split_sentences(&paragraph)
        };
        for piece in pieces {
            if char_len(&piece) > params.target_size() {
                units.extend(hard_split(&piece, params.target_size()).into_iter().map(Unit::new));
            } else {
                units.push(Unit::new(piece));
            }
        }
    }
    units
}

// ── Packing ─────────────────────────────────────────────────────────────────

/// Greedily accumulate units into chunks of at most `target_size` chars.
///
/// On overflow the closed chunk's trailing units (up to `overlap` chars)
/// seed the next chunk. If that seed plus the overflowing unit would not
/// fit, leading seed units are dropped until it does.
pub(crate) fn pack_units(units: &[Unit], params: &ChunkParams) -> Vec<String> {
    let target = params.target_size();
    let mut chunks = Vec::new();
    let mut current: Vec<Unit> = Vec::new();
    let mut current_len = 0;

    for unit in units {
        if current.is_empty() {
            current.push(unit.clone());
            current_len = unit.len;
            continue;
        }
        if current_len + 1 + unit.len <= target {
            current.push(unit.clone());
            current_len += 1 + unit.len;
            continue;
        }

        chunks.push(join_units(&current));

        let mut seed = overlap_prefix(&current, params.overlap());
        while !seed.is_empty() && joined_len(&seed) + 1 + unit.len > target {
            seed.remove(0);
        }
        seed.push(unit.clone());
        current_len = joined_len(&seed);
        current = seed;
    }

    if !current.is_empty() {
        chunks.push(join_units(&current));
    }
    chunks
}
