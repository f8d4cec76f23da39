//! Per-contract accuracy evaluation
//!
//! - **Source** - explorer metadata to compiler inputs
//! - **Engine** - transaction replay and accuracy statistics
//! - **Pipeline** - the full chain of adapters for one contract

pub mod engine;
pub mod pipeline;
pub mod source;

pub use engine::{AccuracyEvaluator, SampleAccumulator};
pub use pipeline::ContractPipeline;
pub use source::{prepare_source, PreparedSource};
