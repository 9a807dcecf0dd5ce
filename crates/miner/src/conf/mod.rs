//! Conf module — runner configuration model and loading.

pub mod model;
pub mod load;

pub use model::{InputFormat, MinerConfig};
