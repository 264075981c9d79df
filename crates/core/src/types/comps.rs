use super::observation::BidObservation;
use super::primitives::BidAmount;

/// Parameters for a comparables lookup. `include_pending` makes
/// explicit whether users still awaiting an auction outcome may appear
/// as comparables; how the oracle breaks similarity ties is its own
/// concern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComparablesQuery {
    pub k: usize,
    pub include_pending: bool,
}

impl Default for ComparablesQuery {
    fn default() -> Self {
        Self {
            k: 10,
            include_pending: false,
        }
    }
}

/// Prior observations judged similar to the pending user, ranked by
/// bid amount descending. A fresh view built for each round, never
/// persisted. Ties keep the oracle's similarity order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComparableSet {
    observations: Vec<BidObservation>,
}

impl ComparableSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ranked(mut observations: Vec<BidObservation>) -> Self {
        observations.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[BidObservation] {
        &self.observations
    }

    pub fn wins(&self) -> impl Iterator<Item = &BidObservation> {
        self.observations.iter().filter(|obs| obs.is_won())
    }

    /// A bid that is still pending counts with the losses until it
    /// settles.
    pub fn losses(&self) -> impl Iterator<Item = &BidObservation> {
        self.observations.iter().filter(|obs| !obs.is_won())
    }

    pub fn none_won(&self) -> bool {
        self.wins().next().is_none()
    }

    pub fn all_won(&self) -> bool {
        self.losses().next().is_none()
    }

    pub fn highest_losing_bid(&self) -> Option<BidAmount> {
        // Descending order: the first loss is the highest one.
        self.losses().next().map(|obs| obs.amount)
    }

    pub fn lowest_winning_bid(&self) -> Option<BidAmount> {
        self.wins().last().map(|obs| obs.amount)
    }

    pub fn second_lowest_winning_bid(&self) -> Option<BidAmount> {
        let wins: Vec<&BidObservation> = self.wins().collect();
        (wins.len() >= 2).then(|| wins[wins.len() - 2].amount)
    }
}
