use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    LoadFailure,
    NotFound,
    Validation,
    Storage,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to load {collection}: {message}")]
    LoadFailure { collection: String, message: String },
    #[error("{collection} record '{id}' not found")]
    NotFound { collection: String, id: RecordId },
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ControllerError {
    pub fn not_found(collection: impl Into<String>, id: &RecordId) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.clone(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::LoadFailure { .. } => ErrorCode::LoadFailure,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::Validation,
            Self::Storage(_) => ErrorCode::Storage,
        }
    }
}

impl From<serde_json::Error> for ControllerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("product '{0}' is out of stock")]
    OutOfStock(RecordId),
    #[error("no more stock available for product '{0}'")]
    StockExhausted(RecordId),
    #[error("product '{0}' is not in the cart")]
    NotInCart(RecordId),
    #[error("storage failure: {0}")]
    Storage(String),
}
