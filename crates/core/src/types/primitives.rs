use crate::error::ValuationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Probability of purchase, as reported by the valuation model.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub const ZERO: Self = Self(0.0);
    pub const CERTAIN: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self, ValuationError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValuationError::ProbabilityOutOfRange(value))
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// Multiplier in (0, 1] that shaves the valuation ceiling down without
/// recomputing the probability.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Discount(f64);

impl Discount {
    pub const FULL: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self, ValuationError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ValuationError::DiscountOutOfRange(value))
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// A bid in currency units. Never negative; `new` saturates at zero.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct BidAmount(f64);

impl BidAmount {
    pub const ZERO: Self = Self(0.0);

    pub fn new(value: f64) -> Self {
        Self(value.max(0.0))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Revenue(f64);

impl Revenue {
    pub const ZERO: Self = Self(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl std::ops::Add for Revenue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Revenue {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
