pub mod error;
pub mod engine;
pub mod session;
pub mod traits;
pub mod types;
pub mod valuation;

pub use error::*;
pub use engine::*;
pub use session::*;
pub use traits::*;
pub use types::*;
pub use valuation::*;
