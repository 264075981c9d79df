use super::comps::ComparablesQuery;
use super::primitives::Discount;

/// Tuning for the annealing engine. Defaults come from the calibration
/// of the production session this agent replaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Number of bids over which the temperature decays to zero.
    pub timescale: u32,
    /// Base exploration step before temperature decay.
    pub initial_increment: f64,
    /// Floor on the step size so the engine never stalls completely.
    pub minimum_increment: f64,
    /// Below this many comparables the engine stays in its bootstrap
    /// probe phase instead of trusting the win/loss frontier.
    pub min_observations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timescale: 500,
            initial_increment: 0.50,
            minimum_increment: 0.001,
            min_observations: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub comparables: ComparablesQuery,
    pub discount: Discount,
    /// Stop a batch at the first failed round instead of reporting the
    /// failure and moving on. Invariant violations always halt.
    pub halt_on_failure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            comparables: ComparablesQuery::default(),
            discount: Discount::FULL,
            halt_on_failure: false,
        }
    }
}
