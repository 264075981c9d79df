use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cinder_core::{
    AuctionGateway, BidAmount, BidObservation, BidOutcome, ComparablesOracle, ComparablesQuery,
    FeatureVector, GatewayError, InvariantViolation, OracleError, Probability, Revenue, User,
    UserId, ValuationError, ValuationModel,
};

use crate::MarketSection;

/// In-process stand-in for the real collaborators: an auction server
/// with a single pending-bid slot, a purchase model, and a
/// nearest-neighbor comparables lookup over the accumulated history.
/// Lets a session run end to end without transport or persistence.
pub struct SimulatedMarket {
    config: MarketSection,
    inner: Mutex<Inner>,
}

struct Inner {
    rng: StdRng,
    remaining: u64,
    next_id: u64,
    pending: Option<Pending>,
    history: Vec<HistoryRow>,
}

struct Pending {
    user: User,
    clearing_price: f64,
    purchase_probability: f64,
}

struct HistoryRow {
    features: Vec<f64>,
    observation: BidObservation,
}

impl SimulatedMarket {
    pub fn new(config: MarketSection) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rng: StdRng::seed_from_u64(config.seed),
                remaining: config.users,
                next_id: 0,
                pending: None,
                history: Vec::new(),
            }),
            config,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("market state poisoned")
    }
}

/// Purchase propensity derived from the feature vector alone, so the
/// model stays deterministic for a given user.
fn propensity(features: &[f64]) -> f64 {
    let weights = [0.45, 0.35, 0.2];
    let score: f64 = features
        .iter()
        .zip(weights)
        .map(|(f, w)| f * w)
        .sum();
    (0.1 + 0.8 * score).clamp(0.0, 1.0)
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

#[async_trait]
impl AuctionGateway for SimulatedMarket {
    async fn fetch_pending_user(&self) -> Result<User, GatewayError> {
        let mut inner = self.lock();

        if inner.pending.is_some() {
            return Err(GatewayError::Invariant(
                InvariantViolation::MultiplePendingBids,
            ));
        }
        if inner.remaining == 0 {
            return Err(GatewayError::NoUserAvailable);
        }

        inner.remaining -= 1;
        inner.next_id += 1;
        let id = inner.next_id;
        let features: Vec<f64> = (0..3).map(|_| inner.rng.gen_range(0.0..1.0)).collect();

        // The market clears around a price correlated with how
        // attractive the user looks, plus noise the agent must anneal
        // through.
        let attractiveness = (features[0] + features[1]) / 2.0;
        let noise = inner.rng.gen_range(-0.5..0.5);
        let clearing_price =
            (self.config.base_price + self.config.price_spread * attractiveness + noise).max(0.1);

        let user = User::new(UserId::new(id), FeatureVector::new(features.clone()));
        inner.pending = Some(Pending {
            user: user.clone(),
            clearing_price,
            purchase_probability: propensity(&features),
        });

        Ok(user)
    }

    async fn submit_bid(
        &self,
        user: &User,
        amount: BidAmount,
    ) -> Result<BidObservation, GatewayError> {
        let mut inner = self.lock();

        let pending = match inner.pending.take() {
            Some(pending) if pending.user.id == user.id => pending,
            Some(pending) => {
                // Put it back; the caller bid on the wrong user.
                inner.pending = Some(pending);
                return Err(GatewayError::Rejected {
                    reason: format!("user {} is not pending a bid", user.id.as_u64()),
                });
            }
            None => {
                return Err(GatewayError::Rejected {
                    reason: "no bid pending".to_string(),
                });
            }
        };

        let outcome = if amount.as_f64() >= pending.clearing_price {
            let purchased = inner.rng.gen_bool(pending.purchase_probability);
            let profit = if purchased {
                Revenue::new(self.config.purchase_revenue - pending.clearing_price)
            } else {
                Revenue::ZERO
            };
            BidOutcome::Won { purchased, profit }
        } else {
            BidOutcome::Lost
        };

        let observation = BidObservation::settled(user.id, amount, outcome);
        inner.history.push(HistoryRow {
            features: pending.user.features.as_slice().to_vec(),
            observation: observation.clone(),
        });

        Ok(observation)
    }
}

#[async_trait]
impl ValuationModel for SimulatedMarket {
    async fn purchase_probability(&self, user: &User) -> Result<Probability, ValuationError> {
        Probability::new(propensity(user.features.as_slice()))
    }
}

#[async_trait]
impl ComparablesOracle for SimulatedMarket {
    async fn comparables(
        &self,
        user: &User,
        query: &ComparablesQuery,
    ) -> Result<Vec<BidObservation>, OracleError> {
        let inner = self.lock();

        if inner.history.is_empty() {
            return Err(OracleError::InsufficientHistory);
        }

        let mut ranked: Vec<(f64, &HistoryRow)> = inner
            .history
            .iter()
            .filter(|row| query.include_pending || row.observation.is_settled())
            .map(|row| (distance(user.features.as_slice(), &row.features), row))
            .collect();
        ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(ranked
            .into_iter()
            .take(query.k)
            .map(|(_, row)| row.observation.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(users: u64) -> SimulatedMarket {
        SimulatedMarket::new(MarketSection {
            users,
            ..MarketSection::default()
        })
    }

    #[tokio::test]
    async fn single_pending_slot_is_enforced() {
        let market = market(5);

        let user = market.fetch_pending_user().await.expect("first fetch");
        let err = market.fetch_pending_user().await.unwrap_err();
        assert!(matches!(err, GatewayError::Invariant(_)));

        market
            .submit_bid(&user, BidAmount::new(100.0))
            .await
            .expect("bid settles");
        market.fetch_pending_user().await.expect("slot free again");
    }

    #[tokio::test]
    async fn runs_dry_after_configured_users() {
        let market = market(1);

        let user = market.fetch_pending_user().await.expect("one user");
        market
            .submit_bid(&user, BidAmount::new(1.0))
            .await
            .expect("bid settles");

        let err = market.fetch_pending_user().await.unwrap_err();
        assert!(matches!(err, GatewayError::NoUserAvailable));
    }

    #[tokio::test]
    async fn high_bids_win_and_low_bids_lose() {
        let market = market(10);

        let user = market.fetch_pending_user().await.expect("user");
        let won = market
            .submit_bid(&user, BidAmount::new(1_000.0))
            .await
            .expect("settles");
        assert!(won.is_won());

        let user = market.fetch_pending_user().await.expect("user");
        let lost = market
            .submit_bid(&user, BidAmount::new(0.0))
            .await
            .expect("settles");
        assert!(!lost.is_won());
    }

    #[tokio::test]
    async fn oracle_reports_thin_history_then_returns_neighbors() {
        let market = market(10);
        let query = ComparablesQuery::default();

        let user = market.fetch_pending_user().await.expect("user");
        let err = market.comparables(&user, &query).await.unwrap_err();
        assert!(matches!(err, OracleError::InsufficientHistory));

        market
            .submit_bid(&user, BidAmount::new(2.0))
            .await
            .expect("settles");

        let user = market.fetch_pending_user().await.expect("next user");
        let comps = market.comparables(&user, &query).await.expect("history");
        assert_eq!(comps.len(), 1);
    }

    #[tokio::test]
    async fn model_is_deterministic_per_user() {
        let market = market(3);
        let user = market.fetch_pending_user().await.expect("user");

        let a = market.purchase_probability(&user).await.expect("p");
        let b = market.purchase_probability(&user).await.expect("p");
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a.as_f64()));
    }
}
