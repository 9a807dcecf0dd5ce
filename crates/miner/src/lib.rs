// Domain-driven module structure for the template miner.

// Core infrastructure
pub mod error;
pub mod conf;
pub mod state;
pub mod metrics;

// Domain modules
pub mod records;
pub mod store;
pub mod pipeline;
pub mod runtime;
