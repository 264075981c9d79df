use super::primitives::UserId;

/// Numeric features derived upstream from the raw user record.
/// Vectorization and normalization happen outside the core; the engine
/// only carries the vector through to the model and the oracle.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A user pending a bid. Immutable once fetched.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub features: FeatureVector,
}

impl User {
    pub fn new(id: UserId, features: FeatureVector) -> Self {
        Self { id, features }
    }
}
