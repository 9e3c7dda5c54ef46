//! `nodes` crate — payloads carried by the two canvas node variants and the
//! edit operations that mutate a single node.
//!
//! The engine crate owns the graph; everything here is local to one node.

pub mod error;
pub mod job;
pub mod trigger;

pub use error::EditError;
pub use job::{JobNodeData, Step, StepField};
pub use trigger::{TriggerNodeData, TriggerSpec};
