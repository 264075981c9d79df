pub mod annealing;
pub mod probe;
pub mod strategy;

pub use annealing::{AnnealingEngine, EngineState};
pub use probe::UniformProbe;
pub use strategy::BidStrategy;
