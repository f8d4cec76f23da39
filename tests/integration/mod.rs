//! Integration Tests Module
//!
//! End-to-end passes over a scratch outcome directory using in-memory
//! adapters.

pub mod aggregation;
pub mod primary_pass;
pub mod reevaluation;
