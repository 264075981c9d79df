use rand::{Rng, RngCore};

use crate::types::{BidAmount, ComparableSet, EngineConfig};

use super::strategy::BidStrategy;

/// Per-session annealing state. Owned by exactly one engine; sessions
/// on other segments get their own copy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineState {
    pub timescale: u32,
    pub base_increment: f64,
    pub min_increment: f64,
    pub elapsed: u32,
}

/// Converges a per-segment bid toward the unknown clearing price:
/// start low, step up from the observed loss frontier, and shrink the
/// step as the session cools.
#[derive(Clone, Debug)]
pub struct AnnealingEngine {
    state: EngineState,
    min_observations: usize,
}

impl AnnealingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::resume(config, 0)
    }

    /// Resume a previously-run session at a known bid count.
    pub fn resume(config: EngineConfig, bids_performed: u32) -> Self {
        Self {
            state: EngineState {
                timescale: config.timescale.max(1),
                base_increment: config.initial_increment,
                min_increment: config.minimum_increment,
                elapsed: bids_performed,
            },
            min_observations: config.min_observations,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn elapsed(&self) -> u32 {
        self.state.elapsed
    }

    /// Cooling factor in [0, 1]: 1 at the start of a session, 0 once
    /// `elapsed` reaches the timescale.
    pub fn temperature(&self) -> f64 {
        let timescale = f64::from(self.state.timescale);
        ((timescale - f64::from(self.state.elapsed)) / timescale).max(0.0)
    }

    /// Current exploration step, floored so the engine never stalls.
    pub fn bid_increment(&self) -> f64 {
        (self.state.base_increment * self.temperature()).max(self.state.min_increment)
    }

    fn raw_decide(&self, comps: &ComparableSet, rng: &mut dyn RngCore) -> f64 {
        let incr = self.bid_increment();

        // Bootstrap phase: too few comparables to trust the frontier,
        // so probe with the bare increment.
        if comps.len() < self.min_observations {
            return incr;
        }

        match (comps.lowest_winning_bid(), comps.highest_losing_bid()) {
            // Nothing recorded at all.
            (None, None) => incr,

            // Every comparable lost: the clearing price sits above all
            // of them, so step up from the loss frontier.
            (None, Some(top_loss)) => top_loss.as_f64() + incr,

            // Every comparable won. Should not happen with a sane
            // oracle, but step down from the cheapest win rather than
            // assume a price floor of zero.
            (Some(low_win), None) => low_win.as_f64() - incr,

            (Some(low_win), Some(top_loss)) => {
                let low_win = low_win.as_f64();
                let top_loss = top_loss.as_f64();

                if top_loss < low_win {
                    // Clean separation: the clearing price is inside
                    // the gap.
                    let gap = low_win - top_loss;
                    if gap > incr {
                        top_loss + incr
                    } else {
                        // A full step would overshoot the win
                        // boundary; sample the gap instead.
                        draw(rng, top_loss, top_loss + gap)
                    }
                } else {
                    // Overlapping wins and losses: the frontier is
                    // ambiguous.
                    let gap = top_loss - low_win;
                    if gap < incr {
                        draw(rng, low_win, low_win + gap)
                    } else {
                        // Wide overlap means a noisy neighbor set;
                        // stay close to the cheapest confirmed win.
                        let high = match comps.second_lowest_winning_bid() {
                            Some(second) => second.as_f64().min(low_win + incr),
                            None => incr,
                        };
                        draw(rng, low_win, high)
                    }
                }
            }
        }
    }
}

impl BidStrategy for AnnealingEngine {
    /// The valuation ceiling is a hard upper bound; no branch may
    /// exceed it, and the result never goes below zero.
    fn decide(
        &self,
        ceiling: BidAmount,
        comps: &ComparableSet,
        rng: &mut dyn RngCore,
    ) -> BidAmount {
        BidAmount::new(self.raw_decide(comps, rng)).min(ceiling)
    }

    fn advance(&mut self) {
        self.state.elapsed = self.state.elapsed.saturating_add(1);
    }
}

/// Uniform draw over `[lo, hi)`, degenerating to `lo` when the
/// interval is empty or inverted.
fn draw(rng: &mut dyn RngCore, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BidObservation, BidOutcome, Revenue, UserId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn engine_with_unit_increment() -> AnnealingEngine {
        AnnealingEngine::new(EngineConfig {
            timescale: 500,
            initial_increment: 1.0,
            minimum_increment: 0.001,
            min_observations: 1,
        })
    }

    fn comps(losses: &[f64], wins: &[f64]) -> ComparableSet {
        let mut rows = Vec::new();
        let mut id = 0;
        for &amount in losses {
            id += 1;
            rows.push(BidObservation::settled(
                UserId::new(id),
                BidAmount::new(amount),
                BidOutcome::Lost,
            ));
        }
        for &amount in wins {
            id += 1;
            rows.push(BidObservation::settled(
                UserId::new(id),
                BidAmount::new(amount),
                BidOutcome::Won {
                    purchased: false,
                    profit: Revenue::ZERO,
                },
            ));
        }
        ComparableSet::ranked(rows)
    }

    #[test]
    fn temperature_decays_to_zero_and_stays_there() {
        let mut engine = AnnealingEngine::new(EngineConfig {
            timescale: 4,
            ..EngineConfig::default()
        });

        let mut last = engine.temperature();
        assert_eq!(last, 1.0);
        for _ in 0..4 {
            engine.advance();
            let t = engine.temperature();
            assert!((0.0..=1.0).contains(&t));
            assert!(t < last, "temperature must strictly decrease until floor");
            last = t;
        }
        assert_eq!(engine.temperature(), 0.0);

        engine.advance();
        assert_eq!(engine.temperature(), 0.0);
    }

    #[test]
    fn increment_never_drops_below_floor() {
        let config = EngineConfig {
            timescale: 10,
            initial_increment: 0.5,
            minimum_increment: 0.01,
            min_observations: 1,
        };
        let mut engine = AnnealingEngine::new(config);
        for _ in 0..30 {
            assert!(engine.bid_increment() >= config.minimum_increment);
            engine.advance();
        }
        // Fully cooled: only the floor remains.
        assert_eq!(engine.bid_increment(), config.minimum_increment);
    }

    #[test]
    fn resume_restores_elapsed_count() {
        let engine = AnnealingEngine::resume(EngineConfig::default(), 250);
        assert_eq!(engine.elapsed(), 250);
        assert_eq!(engine.temperature(), 0.5);
    }

    #[test]
    fn all_losses_step_up_from_the_frontier() {
        let engine = engine_with_unit_increment();
        let mut rng = StdRng::seed_from_u64(1);
        let bid = engine.decide(BidAmount::new(20.0), &comps(&[5.0, 7.0], &[]), &mut rng);
        assert_eq!(bid, BidAmount::new(8.0));
    }

    #[test]
    fn all_wins_step_down_from_cheapest_win() {
        let engine = engine_with_unit_increment();
        let mut rng = StdRng::seed_from_u64(1);
        let bid = engine.decide(BidAmount::new(20.0), &comps(&[], &[4.0, 6.0]), &mut rng);
        assert_eq!(bid, BidAmount::new(3.0));
    }

    #[test]
    fn wide_separation_steps_up_by_increment() {
        let engine = engine_with_unit_increment();
        let mut rng = StdRng::seed_from_u64(1);
        let bid = engine.decide(BidAmount::new(20.0), &comps(&[3.0], &[9.0]), &mut rng);
        assert_eq!(bid, BidAmount::new(4.0));
    }

    #[test]
    fn narrow_separation_samples_the_gap_uniformly() {
        let engine = engine_with_unit_increment();
        let set = comps(&[3.0], &[3.5]);
        let mut rng = StdRng::seed_from_u64(42);

        let trials = 4000;
        let mut buckets = [0u32; 5];
        let mut sum = 0.0;
        for _ in 0..trials {
            let bid = engine.decide(BidAmount::new(20.0), &set, &mut rng).as_f64();
            assert!((3.0..3.5).contains(&bid));
            buckets[((bid - 3.0) / 0.1) as usize] += 1;
            sum += bid;
        }

        let mean = sum / f64::from(trials);
        assert!((3.22..3.28).contains(&mean), "mean {mean} not near 3.25");
        for (i, count) in buckets.iter().enumerate() {
            assert!(
                (600..=1000).contains(count),
                "bucket {i} has {count} of {trials} draws"
            );
        }
    }

    #[test]
    fn empty_comparables_probe_is_capped_by_ceiling() {
        let engine = engine_with_unit_increment();
        let mut rng = StdRng::seed_from_u64(1);
        let bid = engine.decide(BidAmount::new(0.5), &ComparableSet::empty(), &mut rng);
        assert_eq!(bid, BidAmount::new(0.5));
    }

    #[test]
    fn bootstrap_probes_below_min_observations() {
        let engine = AnnealingEngine::new(EngineConfig {
            timescale: 500,
            initial_increment: 1.0,
            minimum_increment: 0.001,
            min_observations: 10,
        });
        let mut rng = StdRng::seed_from_u64(1);
        // Plenty of signal, but below the bootstrap threshold: the
        // frontier is ignored and the engine probes.
        let bid = engine.decide(BidAmount::new(20.0), &comps(&[5.0, 7.0], &[9.0]), &mut rng);
        assert_eq!(bid, BidAmount::new(1.0));
    }

    #[test]
    fn overlap_with_narrow_band_samples_above_cheapest_win() {
        let engine = engine_with_unit_increment();
        // Loss at 4.2 above win at 3.9: ambiguous frontier, band 0.3.
        let set = comps(&[4.2], &[3.9]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let bid = engine.decide(BidAmount::new(20.0), &set, &mut rng).as_f64();
            assert!((3.9..4.2).contains(&bid));
        }
    }

    #[test]
    fn overlap_with_wide_band_stays_near_cheapest_wins() {
        let engine = engine_with_unit_increment();
        // Losses spread far above the cheapest wins at 3.0 and 3.4.
        let set = comps(&[6.0, 8.0], &[3.0, 3.4, 9.0]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let bid = engine.decide(BidAmount::new(20.0), &set, &mut rng).as_f64();
            // Bounded by the second-cheapest win, not the wide gap.
            assert!((3.0..3.4).contains(&bid));
        }
    }

    #[test]
    fn every_branch_respects_zero_and_ceiling() {
        let engine = engine_with_unit_increment();
        let ceiling = BidAmount::new(3.2);
        let sets = [
            ComparableSet::empty(),
            comps(&[5.0, 7.0], &[]),
            comps(&[], &[0.2, 6.0]),
            comps(&[3.0], &[9.0]),
            comps(&[3.0], &[3.5]),
            comps(&[4.2], &[3.9]),
            comps(&[6.0, 8.0], &[3.0, 3.4, 9.0]),
            comps(&[4.0], &[4.0]),
        ];
        let mut rng = StdRng::seed_from_u64(99);
        for set in &sets {
            for _ in 0..50 {
                let bid = engine.decide(ceiling, set, &mut rng);
                assert!(bid >= BidAmount::ZERO);
                assert!(bid <= ceiling, "bid {bid:?} exceeds ceiling");
            }
        }
    }

    #[test]
    fn identical_win_and_loss_degenerates_to_that_amount() {
        let engine = engine_with_unit_increment();
        let mut rng = StdRng::seed_from_u64(3);
        // Overlap gap of exactly zero: the draw interval is empty and
        // the engine bids the boundary itself.
        let bid = engine.decide(BidAmount::new(20.0), &comps(&[4.0], &[4.0]), &mut rng);
        assert_eq!(bid, BidAmount::new(4.0));
    }
}
