use std::sync::Arc;

use cinder_core::{
    AnnealingEngine, BidStrategy, Revenue, RoundOutcome, Session, UniformProbe, ValuationPolicy,
};

use crate::market::SimulatedMarket;
use crate::{CinderConfig, RunPlan, StrategyKind};

/// Runs one bidding session against the simulated market and prints
/// the per-round trail and the batch summary.
pub async fn run(config: &CinderConfig, plan: RunPlan) -> eyre::Result<()> {
    let market = Arc::new(SimulatedMarket::new(config.market));

    match plan.strategy {
        StrategyKind::Annealing => {
            let engine =
                AnnealingEngine::resume(config.engine_config(), config.engine.resume_from);
            run_session(config, plan, market, engine).await
        }
        StrategyKind::Probe => {
            let probe = UniformProbe::new(config.probe.lower, config.probe.upper);
            run_session(config, plan, market, probe).await
        }
    }
}

async fn run_session<S: BidStrategy>(
    config: &CinderConfig,
    plan: RunPlan,
    market: Arc<SimulatedMarket>,
    strategy: S,
) -> eyre::Result<()> {
    let session_config = config.session_config()?;
    let policy = ValuationPolicy::new(Revenue::new(config.market.purchase_revenue));

    let mut session = match plan.seed {
        Some(seed) => Session::seeded(
            market.clone(),
            market.clone(),
            market,
            policy,
            strategy,
            session_config,
            seed,
        ),
        None => Session::new(
            market.clone(),
            market.clone(),
            market,
            policy,
            strategy,
            session_config,
        ),
    };

    let batch = session.run_rounds(plan.rounds).await;

    for (i, outcome) in batch.outcomes.iter().enumerate() {
        let round = i + 1;
        match outcome {
            RoundOutcome::Settled(result) => println!(
                "round {round:>4}: user {:>4} bid {:.3} (ceiling {:.3}) -> {}",
                result.user.as_u64(),
                result.bid.as_f64(),
                result.ceiling.as_f64(),
                if result.observation.is_won() {
                    "won"
                } else {
                    "lost"
                },
            ),
            RoundOutcome::Skipped => println!("round {round:>4}: skipped, no user pending"),
            RoundOutcome::Failed { stage, error } => {
                println!("round {round:>4}: aborted at {stage:?}: {error}")
            }
        }
    }

    let stats = batch.stats;
    println!("---");
    println!(
        "settled {} / skipped {} / failed {} ({:?})",
        stats.rounds_settled, stats.rounds_skipped, stats.rounds_failed, batch.reason
    );
    println!(
        "won {} / lost {} / spend {:.2} / profit {:.2}",
        stats.bids_won,
        stats.bids_lost,
        stats.spend.as_f64(),
        stats.profit.as_f64()
    );

    Ok(())
}
