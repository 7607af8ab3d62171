//! Build orchestration: thin glue sequencing Resolve → Compile → Test over
//! the resolution and execution engines.

pub mod operators;
pub mod orchestrator;
pub mod steps;

pub use operators::SequenceOperator;
pub use orchestrator::Orchestrator;
