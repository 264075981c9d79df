use rand::RngCore;

use crate::types::{BidAmount, ComparableSet};

/// A bidding strategy: given the valuation ceiling and the comparables
/// view, pick the next bid. Variants are interchangeable and selected
/// by configuration.
///
/// Randomness is injected so tests can drive decisions with a seeded
/// generator.
pub trait BidStrategy: Send {
    /// Pure with respect to strategy state: deciding must not consume
    /// session time. The result is always within `[0, ceiling]`.
    fn decide(
        &self,
        ceiling: BidAmount,
        comps: &ComparableSet,
        rng: &mut dyn RngCore,
    ) -> BidAmount;

    /// Called exactly once per submitted bid, after the bid is handed
    /// to the gateway.
    fn advance(&mut self);
}
