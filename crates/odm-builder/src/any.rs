//! A dynamically typed element.
//!
//! [`AnyElement`] wraps any node that can appear below the document root.
//! It is the runtime counterpart of the typed `attach` methods: attaching a
//! child the container does not accept yields [`OdmError::NotAccepted`]
//! naming both tags, instead of a compile error.
//!
//! [`OdmError::NotAccepted`]: crate::error::OdmError::NotAccepted

use std::io::Write;

use crate::admin::{Address, AdminData, Location, MetaDataVersionRef, User};
use crate::clinical::{
    Annotation, Annotations, AuditRecord, ClinicalData, Comment, DateTimeStamp, Flag, FlagType,
    FlagValue, FormData, ItemData, ItemGroupData, LocationRef, MdsolProtocolDeviation, MdsolQuery,
    MeasurementUnitRef, ReasonForChange, Signature, SignatureRef, SiteRef, SourceId,
    StudyEventData, SubjectData, UserRef,
};
use crate::element::Element;
use crate::error::Result;
use crate::metadata::{
    Alias, BasicDefinitions, CheckValue, CodeList, CodeListItem, CodeListRef, Decode, FormDef,
    FormRef, GlobalVariables, ItemDef, ItemGroupDef, ItemGroupRef, ItemRef, MdsolAttribute,
    MdsolCheckAction, MdsolCheckStep, MdsolConfirmationMessage, MdsolCustomFunctionDef,
    MdsolDerivationDef, MdsolDerivationStep, MdsolEditCheckDef, MdsolEntryRestriction,
    MdsolHelpText, MdsolLabelDef, MdsolLabelRef, MdsolReviewGroup, MdsolViewRestriction,
    MeasurementUnit, MetaDataVersion, Protocol, Question, RangeCheck, Study, StudyEventDef,
    StudyEventRef, Symbol, TranslatedText,
};
use crate::sink::{RenderOptions, XmlSink, write_with};

macro_rules! any_element {
    ($($variant:ident),+ $(,)?) => {
        /// Any element that may be attached below the document root.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyElement {
            $($variant($variant),)+
        }

        impl AnyElement {
            /// Tag of the wrapped element.
            pub fn tag(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$variant as Element>::TAG,)+
                }
            }

            fn accept(&mut self, child: AnyElement) -> Result<()> {
                match self {
                    $(Self::$variant(node) => node.accept(child),)+
                }
            }

            /// Writes the wrapped element and its subtree into `sink`.
            pub fn build(&self, sink: &mut dyn XmlSink) -> Result<()> {
                match self {
                    $(Self::$variant(node) => node.build(sink),)+
                }
            }
        }

        $(
            impl From<$variant> for AnyElement {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

any_element! {
    // clinical data
    ClinicalData,
    SubjectData,
    SiteRef,
    StudyEventData,
    FormData,
    ItemGroupData,
    ItemData,
    AuditRecord,
    UserRef,
    LocationRef,
    DateTimeStamp,
    ReasonForChange,
    SourceId,
    Signature,
    SignatureRef,
    MeasurementUnitRef,
    Annotations,
    Annotation,
    Comment,
    Flag,
    FlagValue,
    FlagType,
    MdsolQuery,
    MdsolProtocolDeviation,
    // metadata
    Study,
    GlobalVariables,
    BasicDefinitions,
    MeasurementUnit,
    Symbol,
    TranslatedText,
    MetaDataVersion,
    Protocol,
    StudyEventRef,
    StudyEventDef,
    FormRef,
    FormDef,
    ItemGroupRef,
    ItemGroupDef,
    ItemRef,
    MdsolAttribute,
    ItemDef,
    Question,
    CodeListRef,
    Alias,
    RangeCheck,
    CheckValue,
    CodeList,
    CodeListItem,
    Decode,
    MdsolHelpText,
    MdsolViewRestriction,
    MdsolEntryRestriction,
    MdsolReviewGroup,
    MdsolConfirmationMessage,
    MdsolLabelDef,
    MdsolLabelRef,
    MdsolEditCheckDef,
    MdsolCheckStep,
    MdsolCheckAction,
    MdsolDerivationDef,
    MdsolDerivationStep,
    MdsolCustomFunctionDef,
    // administrative data
    AdminData,
    User,
    Address,
    Location,
    MetaDataVersionRef,
}

impl AnyElement {
    /// Attaches `child`, routing it to the matching slot of the wrapped
    /// container.
    pub fn attach(&mut self, child: impl Into<AnyElement>) -> Result<&mut Self> {
        self.accept(child.into())?;
        Ok(self)
    }

    /// Whether the element belongs to the mdsol extension namespace.
    pub fn is_extension(&self) -> bool {
        self.tag().starts_with("mdsol:")
    }

    /// Writes the element to `out`.
    pub fn write_to<W: Write>(&self, out: W, options: &RenderOptions) -> Result<W> {
        write_with(out, options, |sink| self.build(sink))
    }

    /// Renders the element to a string.
    pub fn to_xml(&self, options: &RenderOptions) -> Result<String> {
        let bytes = self.write_to(Vec::new(), options)?;
        Ok(String::from_utf8(bytes)?)
    }
}
