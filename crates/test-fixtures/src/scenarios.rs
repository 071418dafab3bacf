//! Typed golden scenarios.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use credence_core::models::{Evidence, Stance, VoteChoice};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Root of the golden data shipped with this crate.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// All JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "json").then_some(path)
        })
        .collect();
    paths.sort();
    paths
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFixture {
    pub stance: Stance,
    pub credibility: f64,
    #[serde(default)]
    pub age_days: i64,
    #[serde(default)]
    pub decay_rate: Option<f64>,
}

impl EvidenceFixture {
    /// Materialize as evidence `e-{index}` on `assertion_id`, aged from `as_of`.
    pub fn build(&self, index: usize, assertion_id: &str, as_of: DateTime<Utc>) -> Evidence {
        let id = format!("e-{index}");
        let at = as_of - Duration::days(self.age_days);
        let e = match self.stance {
            Stance::Supporting => Evidence::supporting(id, assertion_id, self.credibility, at),
            Stance::Refuting => Evidence::refuting(id, assertion_id, self.credibility, at),
            Stance::Neutral => Evidence::neutral(id, assertion_id, self.credibility, at, "fixture"),
        };
        match self.decay_rate {
            Some(rate) => e.with_decay_rate(rate),
            None => e,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringScenario {
    pub name: String,
    pub description: String,
    pub evidence: Vec<EvidenceFixture>,
    pub expected_min_weight: Option<f64>,
    pub expected_max_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteFixture {
    pub voter: String,
    pub reputation: f64,
    pub choice: VoteChoice,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingScenario {
    pub name: String,
    pub description: String,
    pub votes: Vec<VoteFixture>,
    pub expected_ratio: f64,
    pub expected_total_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupScenario {
    pub name: String,
    pub description: String,
    pub first: String,
    pub second: String,
    pub expected_recommendation: String,
}
