//! `engine` crate — graph model, the graph ⇄ definition transformations and
//! the editing session that keeps them in sync.

pub mod definition;
pub mod error;
pub mod export;
pub mod ids;
pub mod import;
pub mod models;
pub mod needs;
pub mod session;
pub mod trigger;

pub use error::{EngineError, ParseError};
pub use export::{export, export_named, try_export, DEFAULT_WORKFLOW_NAME, EXPORT_ERROR_PLACEHOLDER};
pub use ids::IdGenerator;
pub use import::{import, ImportedGraph};
pub use models::{Edge, Graph, Node, NodeKind, Position};
pub use needs::{dependency_sets, infer_needs, DependencyIndex};
pub use session::Session;
