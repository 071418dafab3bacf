//! Seams to the excluded surrounding systems and to storage.

mod embedding;
mod reputation;
mod storage;

pub use embedding::IEmbeddingProvider;
pub use reputation::IReputationLookup;
pub use storage::{IAssertionStore, IChallengeStore, ICredenceStore, IEvidenceStore, IPromotionLedger};
