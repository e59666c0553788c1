// HTTP routes
pub mod health;
pub mod toilets;

pub use health::*;
pub use toilets::*;
