pub mod base;
pub mod corpus;
pub mod reevaluate;

pub use base::*;
pub use corpus::CorpusOrchestrator;
