//! ChallengeEngine: dispute lifecycle over a challenge store.
//!
//! Vote tallying is serialized per challenge with an in-process lock, and
//! every write carries the version it was read at. A lost race surfaces as
//! `Conflict` from the store; the operation reloads and retries once.
//! Every write runs under the assertion's [`ReviewGate`], the gate promotion
//! freezes under, so a challenge or vote never lands on an assertion frozen
//! after its writable check and a review never sees a half-applied outcome.
//! Lock order is the challenge lock, then the gate.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use credence_core::clock::Clock;
use credence_core::config::ChallengeConfig;
use credence_core::errors::{ChallengeError, CredenceError, CredenceResult};
use credence_core::gate::ReviewGate;
use credence_core::models::{Challenge, ChallengeOutcome, ChallengeState, ResolutionTrigger, Vote, VoteChoice};
use credence_core::traits::{IAssertionStore, IChallengeStore, IReputationLookup};
use credence_observability::tracing_setup::events;

use crate::policy::ResolutionPolicy;
use crate::tally::{tally, Tally};
use crate::transitions;
use crate::weighting::{validate_confidence, validate_reputation, vote_weight};

/// Result of a vote.
#[derive(Debug, Clone)]
pub struct VoteReceipt {
    /// Challenge as persisted after the vote.
    pub challenge: Challenge,
    /// The voter's earlier vote was replaced.
    pub replaced: bool,
    /// Set when this vote tipped the challenge into a supermajority.
    pub outcome: Option<ChallengeOutcome>,
}

pub struct ChallengeEngine {
    challenges: Arc<dyn IChallengeStore>,
    assertions: Arc<dyn IAssertionStore>,
    reputation: Arc<dyn IReputationLookup>,
    clock: Arc<dyn Clock>,
    gate: Arc<ReviewGate>,
    policy: ResolutionPolicy,
    voting_period: Duration,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ChallengeEngine {
    pub fn new(
        challenges: Arc<dyn IChallengeStore>,
        assertions: Arc<dyn IAssertionStore>,
        reputation: Arc<dyn IReputationLookup>,
        clock: Arc<dyn Clock>,
        gate: Arc<ReviewGate>,
        config: &ChallengeConfig,
    ) -> Self {
        Self {
            challenges,
            assertions,
            reputation,
            clock,
            gate,
            policy: ResolutionPolicy::from_config(config),
            voting_period: Duration::seconds(config.voting_period_secs as i64),
            locks: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    /// Open a challenge against an assertion on `topic`.
    ///
    /// At most one live challenge may exist per (assertion, topic).
    #[instrument(skip(self, reason))]
    pub fn open_challenge(
        &self,
        assertion_id: &str,
        topic: &str,
        raised_by: &str,
        reason: &str,
    ) -> CredenceResult<Challenge> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(CredenceError::ValidationError("challenge topic is empty".into()));
        }
        if raised_by.trim().is_empty() {
            return Err(CredenceError::ValidationError("challenge raiser is empty".into()));
        }

        // The gate also serializes opens, so the live-topic check holds.
        self.gate
            .with_review(assertion_id, || self.insert_new(assertion_id, topic, raised_by, reason))
    }

    fn insert_new(&self, assertion_id: &str, topic: &str, raised_by: &str, reason: &str) -> CredenceResult<Challenge> {
        self.ensure_writable(assertion_id, "open_challenge")?;

        if let Some(existing) = self
            .challenges
            .challenges_for(assertion_id)?
            .into_iter()
            .find(|c| !c.is_terminal() && c.topic == topic)
        {
            return Err(ChallengeError::AlreadyOpen {
                assertion_id: assertion_id.to_string(),
                topic: topic.to_string(),
                existing_id: existing.id,
            }
            .into());
        }

        let now = self.clock.now();
        let challenge = Challenge {
            id: Uuid::new_v4().to_string(),
            assertion_id: assertion_id.to_string(),
            topic: topic.to_string(),
            raised_by: raised_by.to_string(),
            reason: reason.to_string(),
            created_at: now,
            deadline: now + self.voting_period,
            state: ChallengeState::Open,
            version: 0,
            votes: Default::default(),
            outcome: None,
        };
        self.challenges.insert_challenge(&challenge)?;
        events::challenge_opened(&challenge.id, assertion_id, topic);
        Ok(challenge)
    }

    /// Cast or replace `voter_id`'s vote.
    #[instrument(skip(self))]
    pub fn cast_vote(
        &self,
        challenge_id: &str,
        voter_id: &str,
        choice: VoteChoice,
        confidence: f64,
    ) -> CredenceResult<VoteReceipt> {
        validate_confidence(confidence)?;
        if voter_id.trim().is_empty() {
            return Err(CredenceError::ValidationError("voter id is empty".into()));
        }
        let reputation = self.reputation.reputation(voter_id)?;
        validate_reputation(voter_id, reputation)?;

        self.with_lock(challenge_id, || {
            self.with_assertion_gate(challenge_id, || {
                self.retry_once("cast_vote", challenge_id, || {
                    self.apply_vote(challenge_id, voter_id, choice, confidence, reputation)
                })
            })
        })
    }

    fn apply_vote(
        &self,
        challenge_id: &str,
        voter_id: &str,
        choice: VoteChoice,
        confidence: f64,
        reputation: f64,
    ) -> CredenceResult<VoteReceipt> {
        let mut challenge = self.load(challenge_id)?;
        let expected = challenge.version;
        let now = self.clock.now();

        transitions::ensure_live(&challenge)?;
        self.ensure_writable(&challenge.assertion_id, "cast_vote")?;
        if challenge.is_past_deadline(now) {
            return Err(ChallengeError::VotingClosed {
                challenge_id: challenge.id.clone(),
                deadline: challenge.deadline.to_rfc3339(),
            }
            .into());
        }

        let vote = Vote {
            id: Uuid::new_v4().to_string(),
            challenge_id: challenge.id.clone(),
            voter_id: voter_id.to_string(),
            reputation,
            choice,
            confidence,
            cast_at: now,
        };
        let replaced = transitions::record_vote(&mut challenge, vote)?;
        events::vote_cast(
            challenge_id,
            voter_id,
            vote_choice_str(choice),
            vote_weight(reputation, confidence),
            replaced,
        );

        let t = tally(&challenge.votes);
        let outcome = match self.policy.supermajority_outcome(&t, challenge.created_at, now) {
            Some(state) => {
                let trigger = ResolutionTrigger::Supermajority {
                    threshold: self.policy.supermajority.threshold(),
                };
                Some(self.finish(&mut challenge, expected, state, &t, trigger, now)?)
            }
            None => {
                challenge.version = self.challenges.save_challenge(&challenge, expected)?;
                None
            }
        };

        Ok(VoteReceipt {
            challenge,
            replaced,
            outcome,
        })
    }

    /// Close a live challenge by an authorized actor, using the deadline rule.
    #[instrument(skip(self))]
    pub fn resolve(&self, challenge_id: &str, actor: &str) -> CredenceResult<ChallengeOutcome> {
        if actor.trim().is_empty() {
            return Err(CredenceError::ValidationError("resolving actor is empty".into()));
        }
        self.with_lock(challenge_id, || {
            self.with_assertion_gate(challenge_id, || {
                self.retry_once("resolve", challenge_id, || {
                    let mut challenge = self.load(challenge_id)?;
                    transitions::ensure_live(&challenge)?;
                    let expected = challenge.version;
                    let t = tally(&challenge.votes);
                    let state = self.policy.closing_outcome(&t);
                    let trigger = ResolutionTrigger::Manual {
                        actor: actor.to_string(),
                    };
                    self.finish(&mut challenge, expected, state, &t, trigger, self.clock.now())
                })
            })
        })
    }

    /// Resolve every live challenge that is past its deadline or already
    /// holds a supermajority. Idempotent: a challenge resolved by an earlier
    /// sweep, a vote, or a manual close is skipped.
    pub fn sweep(&self) -> CredenceResult<Vec<ChallengeOutcome>> {
        let now = self.clock.now();
        let live = self.challenges.open_challenges()?;
        let checked = live.len();
        let mut resolved = Vec::new();

        for challenge in live {
            match self.sweep_one(&challenge.id, now) {
                Ok(Some(outcome)) => resolved.push(outcome),
                Ok(None) => {}
                Err(e) => warn!(challenge_id = %challenge.id, error = %e, "sweep skipped challenge"),
            }
        }

        if !resolved.is_empty() {
            info!(checked, resolved = resolved.len(), "deadline sweep complete");
        } else {
            debug!(checked, "deadline sweep complete, nothing due");
        }
        Ok(resolved)
    }

    fn sweep_one(&self, challenge_id: &str, now: DateTime<Utc>) -> CredenceResult<Option<ChallengeOutcome>> {
        self.with_lock(challenge_id, || {
            self.with_assertion_gate(challenge_id, || {
                self.retry_once("sweep", challenge_id, || {
                    let mut challenge = self.load(challenge_id)?;
                    if challenge.is_terminal() {
                        return Ok(None);
                    }
                    let expected = challenge.version;
                    let t = tally(&challenge.votes);
                    let (state, trigger) = if challenge.is_past_deadline(now) {
                        (self.policy.closing_outcome(&t), ResolutionTrigger::Deadline)
                    } else if let Some(state) = self.policy.supermajority_outcome(&t, challenge.created_at, now) {
                        let threshold = self.policy.supermajority.threshold();
                        (state, ResolutionTrigger::Supermajority { threshold })
                    } else {
                        return Ok(None);
                    };
                    self.finish(&mut challenge, expected, state, &t, trigger, now).map(Some)
                })
            })
        })
    }

    pub fn get(&self, challenge_id: &str) -> CredenceResult<Challenge> {
        self.load(challenge_id)
    }

    /// Current weighted tally.
    pub fn tally(&self, challenge_id: &str) -> CredenceResult<Tally> {
        Ok(tally(&self.load(challenge_id)?.votes))
    }

    pub fn challenges_for(&self, assertion_id: &str) -> CredenceResult<Vec<Challenge>> {
        self.challenges.challenges_for(assertion_id)
    }

    fn finish(
        &self,
        challenge: &mut Challenge,
        expected: u64,
        state: ChallengeState,
        t: &Tally,
        trigger: ResolutionTrigger,
        at: DateTime<Utc>,
    ) -> CredenceResult<ChallengeOutcome> {
        let outcome = transitions::resolve(challenge, state, t, trigger, at)?;
        challenge.version = self.challenges.save_challenge(challenge, expected)?;
        events::challenge_resolved(
            &outcome.challenge_id,
            outcome.state.as_str(),
            outcome.consensus_ratio,
            trigger_str(&outcome.trigger),
        );
        Ok(outcome)
    }

    fn load(&self, challenge_id: &str) -> CredenceResult<Challenge> {
        self.challenges
            .get_challenge(challenge_id)?
            .ok_or_else(|| CredenceError::ChallengeNotFound {
                id: challenge_id.to_string(),
            })
    }

    fn ensure_writable(&self, assertion_id: &str, operation: &str) -> CredenceResult<()> {
        self.assertions
            .get_assertion(assertion_id)?
            .ok_or_else(|| CredenceError::AssertionNotFound {
                id: assertion_id.to_string(),
            })?
            .ensure_writable(operation)
    }

    /// Run `f` under the review gate of the assertion `challenge_id` targets.
    fn with_assertion_gate<T>(&self, challenge_id: &str, f: impl FnOnce() -> CredenceResult<T>) -> CredenceResult<T> {
        let assertion_id = self.load(challenge_id)?.assertion_id;
        self.gate.with_review(&assertion_id, f)
    }

    fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> CredenceResult<T>) -> CredenceResult<T> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let out = {
            // Guards no data; a poisoned lock still serializes.
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f()
        };
        drop(lock);
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        out
    }

    /// Challenges with an operation running or waiting.
    pub fn pending_locks(&self) -> usize {
        self.locks.len()
    }

    fn retry_once<T>(
        &self,
        operation: &str,
        challenge_id: &str,
        mut f: impl FnMut() -> CredenceResult<T>,
    ) -> CredenceResult<T> {
        match f() {
            Err(e) if e.is_conflict() => {
                warn!(operation, challenge_id, error = %e, "version conflict, retrying once");
                f()
            }
            other => other,
        }
    }
}

fn vote_choice_str(choice: VoteChoice) -> &'static str {
    match choice {
        VoteChoice::Sustain => "sustain",
        VoteChoice::Dismiss => "dismiss",
        VoteChoice::Abstain => "abstain",
    }
}

fn trigger_str(trigger: &ResolutionTrigger) -> &'static str {
    match trigger {
        ResolutionTrigger::Supermajority { .. } => "supermajority",
        ResolutionTrigger::Deadline => "deadline",
        ResolutionTrigger::Manual { .. } => "manual",
    }
}
