//! Static Gas Estimate Accuracy Evaluator
//!

pub mod adapters;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod explorer;
pub mod processor;
pub mod store;
pub mod types;
pub mod utils;
