use std::fmt::{Display, Formatter};

use serde_json::Error as SerdeError;

/// Every way a user intent can be rejected by the editor.
///
/// All variants are recoverable: a rejected operation leaves the collection,
/// the selection and the history exactly as they were.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorError {
    /// The loaded buffer is not a JSON array of product objects.
    Import(String),
    /// An id edit collides with another record's id.
    DuplicateId(String),
    /// A value cannot be stored in the target field (e.g. a non-numeric price).
    InvalidValue(String),
    /// A bulk action was requested with nothing selected.
    EmptySelection(String),
    /// No record carries the requested id.
    ProductNotFound(String),
    /// The field cannot be edited through the requested path.
    FieldNotEditable(String),
    /// Snapshot or export encoding failed.
    Serialization(String),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::Import(msg) => write!(f, "Import error: {}", msg),
            EditorError::DuplicateId(id) => write!(f, "Duplicate id: ID \"{}\" already exists", id),
            EditorError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            EditorError::EmptySelection(msg) => write!(f, "Empty selection: {}", msg),
            EditorError::ProductNotFound(id) => write!(f, "Not found: no product with id \"{}\"", id),
            EditorError::FieldNotEditable(msg) => write!(f, "Field not editable: {}", msg),
            EditorError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for EditorError {}

impl From<SerdeError> for EditorError {
    fn from(err: SerdeError) -> Self {
        EditorError::Serialization(format!("JSON serialization error: {}", err))
    }
}
