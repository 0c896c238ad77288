use thiserror::Error;

/// A string that is not a member of the closed value set of an ODM field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {field}")]
pub struct InvalidValue {
    /// Name of the enumerated field (e.g. `TransactionType`).
    pub field: &'static str,
    /// The rejected input, verbatim.
    pub value: String,
}

impl InvalidValue {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InvalidValue>;
