// Business domains
pub mod toilets;
