// Seoul Toilet Map - API Core
//
// Aggregates the Seoul public toilet registry from the city's Open API into
// one normalized, deduplicated list and serves it alongside a raw page proxy.
//
// Registry logic lives in domains/toilets; upstream access goes through the
// page source trait in kernel/.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
