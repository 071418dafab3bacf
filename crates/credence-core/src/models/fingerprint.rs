use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What a fingerprint belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum FingerprintOwner {
    Assertion(String),
    Evidence(String),
}

impl FingerprintOwner {
    pub fn id(&self) -> &str {
        match self {
            FingerprintOwner::Assertion(id) | FingerprintOwner::Evidence(id) => id,
        }
    }
}

/// Granularity of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum HashKind {
    Exact,
    NearDuplicate,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FingerprintValue {
    /// Content hash (exact tier) or perceptual hash (near tier, binary).
    Hash(String),
    /// MinHash signature (near tier, text).
    Signature(Vec<u64>),
    /// Embedding (semantic tier).
    Vector(Vec<f32>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FingerprintRecord {
    pub owner: FingerprintOwner,
    pub kind: HashKind,
    pub value: FingerprintValue,
}
