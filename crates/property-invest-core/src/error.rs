use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropertyInvestError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PropertyInvestError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PropertyInvestError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PropertyInvestError {
    fn from(e: serde_json::Error) -> Self {
        PropertyInvestError::SerializationError(e.to_string())
    }
}
