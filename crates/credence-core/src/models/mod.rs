//! Data model shared by every subsystem.

pub mod assertion;
pub mod challenge;
pub mod dedup;
pub mod degradation_event;
pub mod events;
pub mod evidence;
pub mod fingerprint;
pub mod payload;
pub mod promotion;
pub mod vote;

pub use assertion::{Assertion, MethodologyChecklist};
pub use challenge::{Challenge, ChallengeOutcome, ChallengeState, ResolutionTrigger};
pub use dedup::{DuplicateCandidate, DuplicateCheck, DuplicateMatch, MatchTier, Recommendation};
pub use degradation_event::DegradationEvent;
pub use events::{ChallengeOpened, CredenceEvent, EvidenceScored, ScoreTrigger};
pub use evidence::{Evidence, NeutralEvidence, RefutingEvidence, Stance, SupportingEvidence};
pub use fingerprint::{FingerprintOwner, FingerprintRecord, FingerprintValue, HashKind};
pub use payload::Payload;
pub use promotion::{
    CriterionKind, CriterionResult, EligibilityReport, OpenChallengesCriterion, PromotionCriteria,
    PromotionEvent, PromotionEventKind, PromotionMode, PromotionRequest,
};
pub use vote::{Vote, VoteChoice};
