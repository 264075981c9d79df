use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::engine::BidStrategy;
use crate::error::{Error, GatewayError, InvariantViolation, OracleError};
use crate::traits::{AuctionGateway, ComparablesOracle, ValuationModel};
use crate::types::{ComparableSet, Revenue, SessionConfig};
use crate::valuation::ValuationPolicy;

use super::result::{
    BatchResult, CompletionReason, RoundOutcome, RoundResult, RoundStage, SessionStats,
};

/// One bidding session: a strictly sequential run of rounds sharing
/// one strategy state, bidding on one user segment. Each round's
/// comparables depend on every earlier round's outcome, so rounds
/// never overlap; the awaited collaborator calls are the only
/// suspension points.
pub struct Session<S: BidStrategy> {
    gateway: Arc<dyn AuctionGateway>,
    model: Arc<dyn ValuationModel>,
    oracle: Arc<dyn ComparablesOracle>,
    policy: ValuationPolicy,
    strategy: S,
    config: SessionConfig,
    rng: StdRng,
    stats: SessionStats,
}

impl<S: BidStrategy> Session<S> {
    pub fn new(
        gateway: Arc<dyn AuctionGateway>,
        model: Arc<dyn ValuationModel>,
        oracle: Arc<dyn ComparablesOracle>,
        policy: ValuationPolicy,
        strategy: S,
        config: SessionConfig,
    ) -> Self {
        Self::with_rng(
            gateway,
            model,
            oracle,
            policy,
            strategy,
            config,
            StdRng::from_entropy(),
        )
    }

    /// Deterministic variant for tests and replayable sessions.
    pub fn seeded(
        gateway: Arc<dyn AuctionGateway>,
        model: Arc<dyn ValuationModel>,
        oracle: Arc<dyn ComparablesOracle>,
        policy: ValuationPolicy,
        strategy: S,
        config: SessionConfig,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            gateway,
            model,
            oracle,
            policy,
            strategy,
            config,
            StdRng::seed_from_u64(seed),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn with_rng(
        gateway: Arc<dyn AuctionGateway>,
        model: Arc<dyn ValuationModel>,
        oracle: Arc<dyn ComparablesOracle>,
        policy: ValuationPolicy,
        strategy: S,
        config: SessionConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            gateway,
            model,
            oracle,
            policy,
            strategy,
            config,
            rng,
            stats: SessionStats::default(),
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// One full decision cycle: fetch the pending user, valuate, fetch
    /// comparables, decide, submit, advance. Any collaborator failure
    /// aborts the round at its stage without advancing the strategy.
    pub async fn run_round(&mut self) -> RoundOutcome {
        match self.try_round().await {
            Ok(result) => {
                self.record_settled(&result);
                info!(
                    user = result.user.as_u64(),
                    bid = result.bid.as_f64(),
                    ceiling = result.ceiling.as_f64(),
                    won = result.observation.is_won(),
                    "round settled"
                );
                RoundOutcome::Settled(result)
            }
            Err((_, Error::Gateway(GatewayError::NoUserAvailable))) => {
                warn!("no user pending a bid, skipping round");
                self.stats.rounds_skipped += 1;
                RoundOutcome::Skipped
            }
            Err((stage, error)) => {
                error!(?stage, %error, "round aborted");
                self.stats.rounds_failed += 1;
                RoundOutcome::Failed { stage, error }
            }
        }
    }

    /// Runs up to `n` rounds sequentially. Individual failures are
    /// reported in the outcomes and the batch moves on, unless
    /// `halt_on_failure` is set; an invariant violation always halts.
    /// `run_rounds(0)` is a no-op.
    pub async fn run_rounds(&mut self, n: usize) -> BatchResult {
        let mut outcomes = Vec::with_capacity(n);
        let mut reason = CompletionReason::BatchExhausted;

        for _ in 0..n {
            let outcome = self.run_round().await;
            let halt = match &outcome {
                RoundOutcome::Failed { error, .. } if error.is_fatal() => {
                    Some(CompletionReason::InvariantViolated)
                }
                RoundOutcome::Failed { .. } if self.config.halt_on_failure => {
                    Some(CompletionReason::HaltedOnFailure)
                }
                _ => None,
            };
            outcomes.push(outcome);
            if let Some(halted) = halt {
                reason = halted;
                break;
            }
        }

        info!(
            settled = self.stats.rounds_settled,
            skipped = self.stats.rounds_skipped,
            failed = self.stats.rounds_failed,
            won = self.stats.bids_won,
            ?reason,
            "batch finished"
        );

        BatchResult {
            outcomes,
            stats: self.stats,
            reason,
        }
    }

    async fn try_round(&mut self) -> Result<RoundResult, (RoundStage, Error)> {
        let user = self
            .gateway
            .fetch_pending_user()
            .await
            .map_err(|e| (RoundStage::AwaitingUser, Error::from(e)))?;

        let probability = self
            .model
            .purchase_probability(&user)
            .await
            .map_err(|e| (RoundStage::Valuating, Error::from(e)))?;
        let ceiling = self.policy.max_bid_discounted(probability, self.config.discount);

        let comps = match self.oracle.comparables(&user, &self.config.comparables).await {
            Ok(rows) => ComparableSet::ranked(rows),
            // Thin history is the bootstrap case, not a failure: the
            // strategy probes instead.
            Err(OracleError::InsufficientHistory) => ComparableSet::empty(),
            Err(e) => return Err((RoundStage::FetchingComparables, Error::from(e))),
        };

        let bid = self.strategy.decide(ceiling, &comps, &mut self.rng);
        if bid > ceiling {
            return Err((
                RoundStage::Deciding,
                Error::from(InvariantViolation::CeilingExceeded {
                    bid: bid.as_f64(),
                    ceiling: ceiling.as_f64(),
                }),
            ));
        }
        debug!(
            user = user.id.as_u64(),
            probability = probability.as_f64(),
            ceiling = ceiling.as_f64(),
            comparables = comps.len(),
            bid = bid.as_f64(),
            "bid decided"
        );

        let observation = self
            .gateway
            .submit_bid(&user, bid)
            .await
            .map_err(|e| (RoundStage::Submitting, Error::from(e)))?;

        // Only a round that reached the gateway consumes session time.
        self.strategy.advance();

        Ok(RoundResult {
            user: user.id,
            probability,
            ceiling,
            bid,
            observation,
        })
    }

    fn record_settled(&mut self, result: &RoundResult) {
        self.stats.rounds_settled += 1;
        if result.observation.is_won() {
            self.stats.bids_won += 1;
            self.stats.spend += Revenue::new(result.bid.as_f64());
            self.stats.profit += result.observation.profit();
        } else {
            self.stats.bids_lost += 1;
        }
    }
}
