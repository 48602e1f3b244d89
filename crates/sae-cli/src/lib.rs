//! Library components of the SAE numbering CLI.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod plan;
pub mod types;
