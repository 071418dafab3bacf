use std::collections::HashMap;

use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::traits::IReputationLookup;

/// Reputation table fixed at construction. Unknown voters are an error.
#[derive(Debug, Clone, Default)]
pub struct StaticReputation {
    table: HashMap<String, f64>,
}

impl StaticReputation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, voter_id: &str, reputation: f64) -> Self {
        self.table.insert(voter_id.to_string(), reputation);
        self
    }
}

impl IReputationLookup for StaticReputation {
    fn reputation(&self, voter_id: &str) -> CredenceResult<f64> {
        self.table
            .get(voter_id)
            .copied()
            .ok_or_else(|| CredenceError::ValidationError(format!("unknown voter {voter_id}")))
    }
}
