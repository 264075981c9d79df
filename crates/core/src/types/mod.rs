pub mod comps;
pub mod config;
pub mod observation;
pub mod primitives;
pub mod user;

pub use comps::*;
pub use config::*;
pub use observation::*;
pub use primitives::*;
pub use user::*;
