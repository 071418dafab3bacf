//! Shared test support for the Credence workspace: builders, a fixed clock,
//! a static reputation table, mock embedding providers, a delaying store
//! wrapper, and typed loading of the golden scenario files under `golden/`.

pub mod builders;
pub mod clock;
pub mod embedders;
pub mod reputation;
pub mod scenarios;
pub mod stores;

pub use builders::{base_time, text_assertion, verified_methodology};
pub use clock::FixedClock;
pub use embedders::{FailingEmbedder, SlowEmbedder, UnavailableEmbedder, WorkingEmbedder};
pub use reputation::StaticReputation;
pub use scenarios::{
    fixture_exists, fixture_path, list_fixtures, load_fixture, DedupScenario, EvidenceFixture, ScoringScenario,
    VoteFixture, VotingScenario,
};
pub use stores::SlowAssertionReads;
