use crate::error::InvariantViolation;

use super::primitives::{BidAmount, Revenue, UserId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BidOutcome {
    Pending,
    Won { purchased: bool, profit: Revenue },
    Lost,
}

/// One bid placed on one user. Appended to history when the bid is
/// submitted; the outcome is settled exactly once, by the gateway
/// response; observations are never deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct BidObservation {
    pub user: UserId,
    pub amount: BidAmount,
    pub outcome: BidOutcome,
}

impl BidObservation {
    pub fn pending(user: UserId, amount: BidAmount) -> Self {
        Self {
            user,
            amount,
            outcome: BidOutcome::Pending,
        }
    }

    pub fn settled(user: UserId, amount: BidAmount, outcome: BidOutcome) -> Self {
        Self {
            user,
            amount,
            outcome,
        }
    }

    pub fn settle(&mut self, outcome: BidOutcome) -> Result<(), InvariantViolation> {
        if self.is_settled() {
            return Err(InvariantViolation::ObservationAlreadySettled);
        }
        self.outcome = outcome;
        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self.outcome, BidOutcome::Pending)
    }

    pub fn is_won(&self) -> bool {
        matches!(self.outcome, BidOutcome::Won { .. })
    }

    pub fn profit(&self) -> Revenue {
        match self.outcome {
            BidOutcome::Won { profit, .. } => profit,
            BidOutcome::Pending | BidOutcome::Lost => Revenue::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_exactly_once() {
        let mut obs = BidObservation::pending(UserId::new(7), BidAmount::new(1.25));
        assert!(!obs.is_settled());

        obs.settle(BidOutcome::Lost).expect("first settle succeeds");
        assert!(obs.is_settled());
        assert!(!obs.is_won());

        let err = obs
            .settle(BidOutcome::Won {
                purchased: false,
                profit: Revenue::ZERO,
            })
            .unwrap_err();
        assert!(matches!(err, InvariantViolation::ObservationAlreadySettled));
        assert_eq!(obs.outcome, BidOutcome::Lost);
    }

    #[test]
    fn profit_is_zero_unless_won() {
        let lost = BidObservation::settled(UserId::new(1), BidAmount::new(2.0), BidOutcome::Lost);
        assert_eq!(lost.profit(), Revenue::ZERO);

        let won = BidObservation::settled(
            UserId::new(2),
            BidAmount::new(2.0),
            BidOutcome::Won {
                purchased: true,
                profit: Revenue::new(9.5),
            },
        );
        assert_eq!(won.profit(), Revenue::new(9.5));
    }
}
