//! Canonical forms shared by every tier.
//!
//! Whitespace runs collapse to one space and the ends are trimmed, so
//! re-wrapped or re-indented text hashes the same. Case and punctuation
//! are kept for the exact tier and dropped for shingling.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use credence_core::models::Payload;

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());
static NON_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").ok());

pub fn canonical_text(text: &str) -> String {
    match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(text.trim(), " ").into_owned(),
        None => text.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Bytes hashed by the exact tier. The payload kind is part of the input so
/// a text and a binary payload with equal bytes never collide.
pub fn canonical_bytes(payload: &Payload) -> Vec<u8> {
    match payload {
        Payload::Text(t) => [b"text\0".as_slice(), canonical_text(t).as_bytes()].concat(),
        Payload::Binary { media_type, bytes } => {
            let mut out = Vec::with_capacity(bytes.len() + media_type.len() + 8);
            out.extend_from_slice(b"binary\0");
            out.extend_from_slice(media_type.trim().to_ascii_lowercase().as_bytes());
            out.push(0);
            out.extend_from_slice(bytes);
            out
        }
        // serde_json's default map is key-ordered, so key order never matters.
        Payload::Structured(v) => [b"structured\0".as_slice(), v.to_string().as_bytes()].concat(),
    }
}

/// Hex blake3 of the canonical form.
pub fn content_hash(payload: &Payload) -> String {
    blake3::hash(&canonical_bytes(payload)).to_hex().to_string()
}

/// Key in the exact index. Scoped keys keep evidence for different
/// assertions apart.
pub fn exact_key(scope: Option<&str>, hash: &str) -> String {
    match scope {
        Some(scope) => format!("{scope}/{hash}"),
        None => hash.to_string(),
    }
}

/// Lowercased words with punctuation removed.
pub fn words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = match NON_WORD.as_ref() {
        Some(re) => re.replace_all(&lowered, " ").into_owned(),
        None => lowered,
    };
    stripped.split_whitespace().map(str::to_string).collect()
}

/// Overlapping `size`-word shingles. Texts shorter than one shingle
/// produce a single shingle of everything they have.
pub fn shingles(text: &str, size: usize) -> HashSet<String> {
    let words = words(text);
    if words.is_empty() {
        return HashSet::new();
    }
    let size = size.max(1);
    if words.len() <= size {
        return HashSet::from([words.join(" ")]);
    }
    words.windows(size).map(|w| w.join(" ")).collect()
}
