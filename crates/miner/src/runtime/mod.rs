//! Runtime module — process lifecycle: boot, then the batch loop.

pub mod boot;
pub mod run;
