//! Gas Estimate Accuracy Evaluator - Type System
//!
//! - `accuracy`: Samples, summaries, selectors and raw estimator output
//! - `classification`: Threshold buckets for gas, coverage and accuracy classes
//! - `contract`: Corpus records and the ordered contract corpus
//! - `outcome`: Durable per-contract outcomes and the failure taxonomy
//! - `settings`: Compiler and symbolic execution settings
//! - `statistics`: Pass statistics and the shared collector trait

pub mod accuracy;
pub mod classification;
pub mod contract;
pub mod outcome;
pub mod settings;
pub mod statistics;

pub use accuracy::{AccuracySummary, FunctionGasEstimate, SymExecOutput};
pub use classification::{BucketClass, ClassBuckets, GasClassBasis};
pub use contract::{ContractCorpus, ContractRecord};
pub use outcome::{
    ContractState, ErrorDescriptor, EvalError, EvalErrorKind, EvalResult, OutcomePayload,
    OutcomeRecord, OutcomeStatus, SkipReason,
};
pub use settings::{CompilerSettings, SearchStrategy, SourceFile, SymExecSettings};
pub use statistics::{PassStats, StatisticsCollector};
