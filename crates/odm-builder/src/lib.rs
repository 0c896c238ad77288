//! Typed construction and serialization of CDISC ODM 1.3 documents.
//!
//! A document is a strictly owned tree of element nodes rooted at [`Odm`].
//! Each node type encodes its own slice of the schema:
//!
//! - which children it accepts, as a sum type per container (`*Child`), so a
//!   wrong child type is a compile error on the typed `attach` path and a
//!   [`OdmError::NotAccepted`] on the dynamic [`AnyElement::attach`] path;
//! - whether each child slot is singular or repeated;
//! - the emission order of its slots, declared once as [`Composite::ORDER`];
//! - enumerated attribute domains, via the value sets of [`odm_model`];
//! - usage-conditional mandatory children, checked when the node is built.
//!
//! # Example
//!
//! ```
//! use odm_builder::{ClinicalData, Odm, ItemData, ItemGroupData, FormData,
//!     StudyEventData, SubjectData, RenderOptions};
//!
//! let mut group = ItemGroupData::new();
//! group.attach(ItemData::new("SUBJINIT", "AAA"))?;
//!
//! let mut form = FormData::new("DM");
//! form.attach(group)?;
//! let mut event = StudyEventData::new("SCREENING");
//! event.attach(form)?;
//! let mut subject = SubjectData::new("SITE01", "001");
//! subject.attach(event)?;
//! let mut clinical = ClinicalData::new("Mediflex", "Prod");
//! clinical.attach(subject)?;
//!
//! let mut odm = Odm::new("example").with_file_oid("F1");
//! odm.attach(clinical)?;
//! let xml = odm.to_xml(&RenderOptions::compact())?;
//! assert!(xml.contains(r#"<ItemData ItemOID="SUBJINIT" Value="AAA" />"#));
//! # Ok::<(), odm_builder::OdmError>(())
//! ```
//!
//! A child is moved into its parent, so the same node cannot be attached
//! twice:
//!
//! ```compile_fail
//! use odm_builder::{ClinicalData, SubjectData};
//!
//! let subject = SubjectData::new("SITE01", "001");
//! let mut first = ClinicalData::new("Mediflex", "Prod");
//! let mut second = ClinicalData::new("Mediflex", "Prod");
//! first.attach(subject).unwrap();
//! second.attach(subject).unwrap();
//! ```

/// Declares the sum type of children a container accepts.
///
/// Variant names must match both the child type names and the
/// [`AnyElement`] variants, so the dynamic conversion can route them.
macro_rules! children {
    (
        $(#[$meta:meta])*
        pub enum $name:ident for $container:ident {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $($variant($ty),)+
        }

        impl $name {
            /// Tag of the wrapped child.
            pub fn tag(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as $crate::element::Element>::TAG,)+
                }
            }

            /// Logs the routing of `child` into its container.
            pub(crate) fn traced(child: Self) -> Self {
                ::tracing::trace!(
                    container = <$container as $crate::element::Element>::TAG,
                    child = child.tag(),
                    "attaching element"
                );
                child
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+

        impl TryFrom<$crate::any::AnyElement> for $name {
            type Error = $crate::error::OdmError;

            fn try_from(
                element: $crate::any::AnyElement,
            ) -> ::std::result::Result<Self, Self::Error> {
                match element {
                    $($crate::any::AnyElement::$variant(value) => Ok(Self::$variant(value)),)+
                    other => Err($crate::error::OdmError::NotAccepted {
                        container: <$container as $crate::element::Element>::TAG,
                        child: other.tag(),
                    }),
                }
            }
        }
    };
}

pub mod admin;
pub mod any;
pub mod clinical;
pub mod element;
pub mod error;
pub mod metadata;
pub mod mixins;
pub mod odm;
pub mod sink;
pub mod transaction;

pub use admin::{AdminData, Address, Location, MetaDataVersionRef, User};
pub use any::AnyElement;
pub use clinical::{
    Annotation, Annotations, AuditRecord, ClinicalData, Comment, DateTimeStamp, Flag, FlagType,
    FlagValue, FormData, ItemData, ItemGroupData, LocationRef, MdsolProtocolDeviation, MdsolQuery,
    MeasurementUnitRef, ReasonForChange, Signature, SignatureRef, SiteRef, SourceId,
    StudyEventData, SubjectData, UserRef,
};
pub use element::{Attributes, Composite, Element, emit_children, format_date, format_datetime};
pub use error::{ErrorKind, OdmError, Result};
pub use metadata::{
    Alias, BasicDefinitions, CheckValue, CodeList, CodeListItem, CodeListRef, Decode, FormDef,
    FormRef, GlobalVariables, ItemDef, ItemGroupDef, ItemGroupRef, ItemRef, MdsolAttribute,
    MdsolCheckAction, MdsolCheckStep, MdsolConfirmationMessage, MdsolCustomFunctionDef,
    MdsolDerivationDef, MdsolDerivationStep, MdsolEditCheckDef, MdsolEntryRestriction,
    MdsolHelpText, MdsolLabelDef, MdsolLabelRef, MdsolReviewGroup, MdsolViewRestriction,
    MeasurementUnit, MetaDataVersion, Protocol, Question, RangeCheck, Study, StudyEventDef,
    StudyEventRef, Symbol, TranslatedText,
};
pub use mixins::{HasMilestones, LastUpdate, LastUpdateTime, Milestones};
pub use odm::Odm;
pub use sink::{EventLog, RenderOptions, SinkEvent, XmlSink, XmlWriter, render, to_xml_string};
pub use transaction::Transactional;

pub use odm_model as model;
