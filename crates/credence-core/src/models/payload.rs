use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Opaque content of an assertion. Typed so each dedup tier knows how to
/// fingerprint it, never probed by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Natural-language claim text.
    Text(String),
    /// Binary media (image, audio, document scan).
    Binary { media_type: String, bytes: Vec<u8> },
    /// Structured claim, e.g. a graph edge expressed as JSON.
    Structured(serde_json::Value),
}

impl Payload {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Binary { .. } => "binary",
            Payload::Structured(_) => "structured",
        }
    }

    /// Whether the payload carries no content at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(t) => t.trim().is_empty(),
            Payload::Binary { bytes, .. } => bytes.is_empty(),
            Payload::Structured(v) => v.is_null(),
        }
    }

    /// Text view used by shingling and embedding. Binary payloads have none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Payload::Text(t) => Some(t.clone()),
            Payload::Binary { .. } => None,
            // serde_json's default map is ordered, so this is stable across key order.
            Payload::Structured(v) => Some(v.to_string()),
        }
    }
}
