//! Node-level error type.

use thiserror::Error;

/// Errors returned by the single-node edit operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// A step, trigger or trigger value index does not exist.
    #[error("{what} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Return `Ok(())` if `index` addresses an element of a sequence of `len`.
pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), EditError> {
    if index < len {
        Ok(())
    } else {
        Err(EditError::IndexOutOfRange { what, index, len })
    }
}
