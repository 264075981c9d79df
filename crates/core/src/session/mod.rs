pub mod core;
pub mod result;

pub use core::Session;
pub use result::{BatchResult, CompletionReason, RoundOutcome, RoundResult, RoundStage, SessionStats};
