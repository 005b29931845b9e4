//! Stage-level errors.

use thiserror::Error;

use crate::path::{Path, PathError};
use crate::usda::ParseError;
use crate::value::ValueType;

/// Errors that can occur while editing, loading or saving a stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Prim not found: {0}")]
    PrimNotFound(Path),

    #[error("Parent of {0} does not exist")]
    NoParent(Path),

    #[error("Not a prim path: {0}")]
    InvalidPrimPath(Path),

    #[error("Not a property path: {0}")]
    NotAPropertyPath(Path),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(Path),

    #[error("Type mismatch on {attribute}: declared {expected}, got {found}")]
    TypeMismatch {
        attribute: Path,
        expected: ValueType,
        found: &'static str,
    },

    #[error("Attribute {attribute} already declared as {existing}, requested {requested}")]
    TypeConflict {
        attribute: Path,
        existing: ValueType,
        requested: ValueType,
    },

    #[error("Cannot author beneath instance proxy {0}")]
    InstanceProxyEdit(Path),

    #[error("Layer has no file identifier")]
    AnonymousLayer,
}

/// Result type for stage operations.
pub type StageResult<T> = Result<T, StageError>;
