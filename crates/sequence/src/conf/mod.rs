//! Conf module — sequence configuration model and loading.

pub mod model;
pub mod load;

pub use model::{AnalyzerSettings, SequenceConfig, TimeSettings};
