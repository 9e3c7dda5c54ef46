//! Engine-level error types.

use thiserror::Error;

/// The definition text could not be decoded into a mapping-shaped document.
///
/// Carries the underlying decoder message so callers can show it verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid definition: {0}")]
pub struct ParseError(pub String);

impl ParseError {
    /// The decoder's message without the `invalid definition:` prefix.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Errors produced by the engine (import, export, session edits).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Transformation errors ------

    /// Importing a definition failed; the previous graph is untouched.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Encoding the assembled definition to text failed.
    #[error("failed to serialize definition: {0}")]
    Serialization(String),

    /// The graph interchange JSON could not be read or written.
    #[error("graph interchange error: {0}")]
    Interchange(#[from] serde_json::Error),

    // ------ Session errors ------

    /// No node with this ID exists in the session graph.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// The node exists but is not of the variant the operation edits.
    #[error("node '{node_id}' is not a {expected} node")]
    WrongNodeKind {
        node_id: String,
        expected: &'static str,
    },

    /// A single-node edit was rejected.
    #[error(transparent)]
    Edit(#[from] nodes::EditError),
}
