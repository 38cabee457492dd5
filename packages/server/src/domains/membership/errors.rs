use thiserror::Error;

/// A CRM record could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing required field {field}")]
    MissingField { field: String },

    #[error("invalid date in {field}: {value:?}")]
    InvalidDate { field: String, value: String },

    #[error("invalid value in {field}: {value:?}")]
    InvalidValue { field: String, value: String },
}

impl DecodeError {
    pub fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn invalid_value(field: &str, value: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
