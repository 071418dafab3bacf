use crate::errors::CredenceResult;

/// Current numeric reputation of a voter, owned by an external system.
pub trait IReputationLookup: Send + Sync {
    fn reputation(&self, voter_id: &str) -> CredenceResult<f64>;
}
