use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl Error {
    /// Fatal errors indicate corrupt collaborator state and must halt a
    /// batch; everything else is a per-round failure the caller may
    /// retry or skip.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Invariant(_) | Error::Gateway(GatewayError::Invariant(_))
        )
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no user is pending a bid")]
    NoUserAvailable,

    #[error("bid submission rejected: {reason}")]
    Rejected { reason: String },

    #[error("gateway transport failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("purchase probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),

    #[error("discount {0} is outside (0, 1]")]
    DiscountOutOfRange(f64),

    #[error("purchase model failed: {0}")]
    Model(String),
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no prior observations to compare against")]
    InsufficientHistory,

    #[error("comparables lookup failed: {0}")]
    Lookup(String),
}

#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("more than one user is pending a bid")]
    MultiplePendingBids,

    #[error("bid observation was already settled")]
    ObservationAlreadySettled,

    #[error("decided bid {bid} exceeds valuation ceiling {ceiling}")]
    CeilingExceeded { bid: f64, ceiling: f64 },
}
