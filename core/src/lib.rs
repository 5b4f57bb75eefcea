pub mod config;
pub mod consistency;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod ranking;
pub mod rng;
pub mod rollup;
pub mod sample;
pub mod stats;
pub mod store;
pub mod store_detail;
pub mod tables;
pub mod trend;
pub mod types;
pub mod waterfall;

pub use config::GapConfig;
pub use engine::GapEngine;
pub use error::{GapError, GapResult};
