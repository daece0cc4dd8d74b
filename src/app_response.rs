use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::editor_error::EditorError;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum AppResponse {
    ImportError(String),
    DuplicateIdError(String),
    InvalidValueError(String),
    EmptySelectionError(String),
    NotFound(String),
    NotEditable(String),
    SerializationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::ImportError(msg) => write!(f, "Import error: {}", msg),
            AppResponse::DuplicateIdError(msg) => write!(f, "Duplicate id: {}", msg),
            AppResponse::InvalidValueError(msg) => write!(f, "Invalid value: {}", msg),
            AppResponse::EmptySelectionError(msg) => write!(f, "Empty selection: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::NotEditable(msg) => write!(f, "Not editable: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<EditorError> for AppResponse {
    fn from(err: EditorError) -> Self {
        let message = err.to_string();
        match err {
            EditorError::Import(_) => AppResponse::ImportError(message),
            EditorError::DuplicateId(_) => AppResponse::DuplicateIdError(message),
            EditorError::InvalidValue(_) => AppResponse::InvalidValueError(message),
            EditorError::EmptySelection(_) => AppResponse::EmptySelectionError(message),
            EditorError::ProductNotFound(_) => AppResponse::NotFound(message),
            EditorError::FieldNotEditable(_) => AppResponse::NotEditable(message),
            EditorError::Serialization(_) => AppResponse::SerializationError(message),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AppResponse::Ok(_))
    }
}
