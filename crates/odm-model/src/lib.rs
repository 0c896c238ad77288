//! CDISC ODM 1.3 value sets.
//!
//! Every enumerated attribute the document builder writes is modelled here as
//! a closed Rust enum. Parsing a string outside a set fails with
//! [`InvalidValue`], naming the field.

#[macro_use]
mod macros;

pub mod checks;
pub mod enums;
pub mod error;

pub use checks::{
    ActionType, CustomFunctionLanguage, DERIVATION_STEP_FUNCTIONS, LogicalRecordPosition,
    StepFunction,
};
pub use enums::{
    BoolStyle, CodeListDataType, ConfirmationStyle, ControlType, DataType, EditPoint, FileType,
    Granularity, LocationOidType, LocationType, ProjectType, ProtocolDeviationStatus,
    QueryStatus, RangeCheckComparator, RangeCheckType, SponsorOrSite, StudyEventType,
    SubjectKeyType, TransactionType, UserType,
};
pub use error::{InvalidValue, Result};

/// A closed set of permitted string values for one ODM field.
pub trait ValueSet: Copy + Sized + 'static {
    /// Field name used in error messages.
    const FIELD: &'static str;

    /// Every member, in declaration order.
    fn all() -> &'static [Self];

    /// The member's wire value.
    fn as_str(&self) -> &'static str;

    /// Wire values of every member.
    fn wire_values() -> Vec<&'static str> {
        Self::all().iter().map(Self::as_str).collect()
    }
}

/// ODM version written to `ODM/@ODMVersion`.
pub const ODM_VERSION: &str = "1.3";

/// Default namespace of an ODM 1.3 document.
pub const ODM_NS: &str = "http://www.cdisc.org/ns/odm/v1.3";

/// mdsol vendor extension namespace.
pub const MDSOL_NS: &str = "http://www.mdsol.com/ns/odm/metadata";
