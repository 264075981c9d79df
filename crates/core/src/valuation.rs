use crate::types::{BidAmount, Discount, Probability, Revenue};

/// Converts a purchase probability into the hard ceiling on what a bid
/// may cost: `p * discount * average_purchase_revenue`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValuationPolicy {
    average_purchase_revenue: Revenue,
}

impl ValuationPolicy {
    /// Expected revenue conditional on a purchase, calibrated from
    /// historical purchase data.
    pub const DEFAULT_AVERAGE_PURCHASE_REVENUE: f64 = 10.96;

    pub fn new(average_purchase_revenue: Revenue) -> Self {
        Self {
            average_purchase_revenue,
        }
    }

    pub fn max_bid(&self, probability: Probability) -> BidAmount {
        self.max_bid_discounted(probability, Discount::FULL)
    }

    pub fn max_bid_discounted(&self, probability: Probability, discount: Discount) -> BidAmount {
        BidAmount::new(
            probability.as_f64() * discount.as_f64() * self.average_purchase_revenue.as_f64(),
        )
    }
}

impl Default for ValuationPolicy {
    fn default() -> Self {
        Self::new(Revenue::new(Self::DEFAULT_AVERAGE_PURCHASE_REVENUE))
    }
}
