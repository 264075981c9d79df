use rand::{Rng, RngCore};

use crate::types::{BidAmount, ComparableSet};

use super::strategy::BidStrategy;

/// Exploratory strategy that ignores the comparables entirely and bids
/// uniformly inside a fixed band. Useful for seeding history before an
/// annealing session takes over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformProbe {
    lower: f64,
    upper: f64,
}

impl UniformProbe {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: lower.max(0.0),
            upper,
        }
    }
}

impl Default for UniformProbe {
    fn default() -> Self {
        Self::new(0.0, 10.0)
    }
}

impl BidStrategy for UniformProbe {
    fn decide(
        &self,
        ceiling: BidAmount,
        _comps: &ComparableSet,
        rng: &mut dyn RngCore,
    ) -> BidAmount {
        let raw = if self.upper > self.lower {
            rng.gen_range(self.lower..self.upper)
        } else {
            self.lower
        };
        BidAmount::new(raw).min(ceiling)
    }

    fn advance(&mut self) {}
}
