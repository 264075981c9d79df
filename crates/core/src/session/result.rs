use crate::error::Error;
use crate::types::{BidAmount, BidObservation, Probability, Revenue, UserId};

/// Stages of one bidding round, in pipeline order. A failed round
/// reports the stage it aborted at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStage {
    AwaitingUser,
    Valuating,
    FetchingComparables,
    Deciding,
    Submitting,
    Settled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub user: UserId,
    pub probability: Probability,
    pub ceiling: BidAmount,
    pub bid: BidAmount,
    pub observation: BidObservation,
}

#[derive(Debug)]
pub enum RoundOutcome {
    Settled(RoundResult),
    /// No user was pending a bid; nothing to do this round.
    Skipped,
    Failed {
        stage: RoundStage,
        error: Error,
    },
}

impl RoundOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, RoundOutcome::Settled(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RoundOutcome::Failed { .. })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionStats {
    pub rounds_settled: u32,
    pub rounds_skipped: u32,
    pub rounds_failed: u32,
    pub bids_won: u32,
    pub bids_lost: u32,
    /// Total amount bid on won auctions.
    pub spend: Revenue,
    pub profit: Revenue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionReason {
    BatchExhausted,
    HaltedOnFailure,
    InvariantViolated,
}

#[derive(Debug)]
pub struct BatchResult {
    pub outcomes: Vec<RoundOutcome>,
    pub stats: SessionStats,
    pub reason: CompletionReason,
}
