//! Small shared helpers
//!
//! - `math`: Percentages and sample statistics
//! - `version`: Solidity compiler version parsing

pub mod math;
pub mod version;
