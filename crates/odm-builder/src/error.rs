//! Error types for document construction and serialization.
//!
//! Three families matter to callers: configuration errors (a value outside
//! its domain, raised on assignment), containment errors (raised on
//! attachment) and completeness errors (raised when a node is built before
//! its usage-conditional children are present). [`OdmError::kind`] tells them
//! apart.

use odm_model::{InvalidValue, StepFunction, TransactionType};
use thiserror::Error;

/// Unified error type for the document builder.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OdmError {
    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// A string outside the closed value set of an enumerated field.
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),

    /// A transaction type the concrete element does not support.
    #[error("{element} does not allow TransactionType '{value}'")]
    TransactionTypeNotAllowed {
        /// Tag of the element being configured.
        element: &'static str,
        /// The rejected transaction type.
        value: TransactionType,
    },

    /// A step function outside the subset the step kind supports.
    #[error("{element} does not allow Function '{value}'")]
    FunctionNotAllowed {
        /// Tag of the step element.
        element: &'static str,
        /// The rejected function.
        value: StepFunction,
    },

    // =========================================================================
    // CONTAINMENT ERRORS
    // =========================================================================
    /// The child type is not in the container's accepted set.
    #[error("{container} cannot contain {child}")]
    NotAccepted {
        /// Tag of the container.
        container: &'static str,
        /// Tag of the rejected child.
        child: &'static str,
    },

    /// A singular slot already holds a value.
    #[error("{container} already has a {child}")]
    SlotOccupied {
        /// Tag of the container.
        container: &'static str,
        /// Tag of the slot's element type.
        child: &'static str,
    },

    /// A keyed slot already holds a child with the same key.
    #[error("{container} already contains a {child} with key '{key}'")]
    DuplicateKey {
        /// Tag of the container.
        container: &'static str,
        /// Tag of the child type.
        child: &'static str,
        /// The duplicated key.
        key: String,
    },

    // =========================================================================
    // COMPLETENESS ERRORS
    // =========================================================================
    /// A node was built while a mandatory child or attribute was missing.
    #[error("{element} is missing required {missing}")]
    Incomplete {
        /// Tag of the incomplete element.
        element: &'static str,
        /// Name of the missing element or attribute.
        missing: &'static str,
    },

    // =========================================================================
    // OUTPUT ERRORS
    // =========================================================================
    /// I/O error from the underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Rendered bytes were not valid UTF-8.
    #[error("encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Coarse classification of an [`OdmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Containment,
    Completeness,
    Output,
}

impl OdmError {
    /// Returns which error family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidValue(_)
            | Self::TransactionTypeNotAllowed { .. }
            | Self::FunctionNotAllowed { .. } => ErrorKind::Configuration,
            Self::NotAccepted { .. } | Self::SlotOccupied { .. } | Self::DuplicateKey { .. } => {
                ErrorKind::Containment
            }
            Self::Incomplete { .. } => ErrorKind::Completeness,
            Self::Io(_) | Self::Xml(_) | Self::Encoding(_) => ErrorKind::Output,
        }
    }

    pub(crate) fn incomplete(element: &'static str, missing: &'static str) -> Self {
        Self::Incomplete { element, missing }
    }
}

/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, OdmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_classified() {
        let err: OdmError = InvalidValue::new("TransactionType", "Merge").into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "'Merge' is not a valid TransactionType");

        let err = OdmError::SlotOccupied {
            container: "ClinicalData",
            child: "SubjectData",
        };
        assert_eq!(err.kind(), ErrorKind::Containment);
        assert_eq!(err.to_string(), "ClinicalData already has a SubjectData");

        let err = OdmError::incomplete("AuditRecord", "LocationRef");
        assert_eq!(err.kind(), ErrorKind::Completeness);
        assert_eq!(err.to_string(), "AuditRecord is missing required LocationRef");
    }
}
