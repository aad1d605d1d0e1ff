use crate::database::StoreError;

/// Outcomes the reservation engine and query service can fail with
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("Present not found: {0}")]
    NotFound(String),
    #[error("Present already reserved: {0}")]
    AlreadyReserved(String),
    #[error("Operation canceled")]
    Canceled,
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl PresentError {
    pub fn required(field: &'static str) -> Self {
        PresentError::Validation {
            field,
            message: format!("{} must not be empty", field),
        }
    }
}

impl From<StoreError> for PresentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Canceled => PresentError::Canceled,
            other => PresentError::Store(other),
        }
    }
}

/// Rejects empty and whitespace-only values
pub fn require(field: &'static str, value: &str) -> Result<(), PresentError> {
    if value.trim().is_empty() {
        return Err(PresentError::required(field));
    }
    Ok(())
}
