pub mod error;
pub mod governor;

pub use error::{GovernorError, Result};
pub use governor::RateLimitGovernor;
