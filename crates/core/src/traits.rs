use async_trait::async_trait;

use crate::error::{GatewayError, OracleError, ValuationError};
use crate::types::{BidAmount, BidObservation, ComparablesQuery, Probability, User};

/// The auction server. Holds the single pending-bid slot: exactly one
/// user may be awaiting a bid at a time, and a second fetch before the
/// first bid settles is the gateway's error to raise.
#[async_trait]
pub trait AuctionGateway: Send + Sync {
    /// Returns `GatewayError::NoUserAvailable` when nothing is pending.
    async fn fetch_pending_user(&self) -> Result<User, GatewayError>;

    /// Submits a bid for the pending user and returns the settled
    /// observation. A failed submission is assumed not to have taken
    /// effect.
    async fn submit_bid(
        &self,
        user: &User,
        amount: BidAmount,
    ) -> Result<BidObservation, GatewayError>;
}

/// The purchase model. Training and inference internals live outside
/// the core.
#[async_trait]
pub trait ValuationModel: Send + Sync {
    async fn purchase_probability(&self, user: &User) -> Result<Probability, ValuationError>;
}

/// Black-box "find the K most similar prior users" lookup. May return
/// fewer rows than asked for when history is thin.
#[async_trait]
pub trait ComparablesOracle: Send + Sync {
    async fn comparables(
        &self,
        user: &User,
        query: &ComparablesQuery,
    ) -> Result<Vec<BidObservation>, OracleError>;
}
