//! Study metadata: global variables, measurement units, the metadata version
//! with its definitions, and the mdsol edit-check and derivation extensions.

mod codelist;
mod definitions;
mod edit_checks;
mod extensions;
mod study;
mod version;

pub use codelist::{
    CodeList, CodeListChild, CodeListItem, CodeListItemChild, CodeListItemSlot, CodeListSlot,
    Decode, DecodeChild,
};
pub use definitions::{
    Alias, CheckValue, CodeListRef, FormDef, FormDefChild, FormDefSlot, FormRef, ItemDef,
    ItemDefChild, ItemDefSlot, ItemGroupDef, ItemGroupDefChild, ItemGroupDefSlot, ItemGroupRef,
    ItemRef, ItemRefChild, MdsolAttribute, Question, QuestionChild, RangeCheck, RangeCheckChild,
    RangeCheckSlot, StudyEventDef, StudyEventDefChild,
};
pub use edit_checks::{
    MdsolCheckAction, MdsolCheckStep, MdsolDerivationDef, MdsolDerivationDefChild,
    MdsolDerivationStep, MdsolEditCheckDef, MdsolEditCheckDefChild, MdsolEditCheckDefSlot,
};
pub use extensions::{
    MdsolConfirmationMessage, MdsolCustomFunctionDef, MdsolEntryRestriction, MdsolHelpText,
    MdsolLabelDef, MdsolLabelDefChild, MdsolLabelDefSlot, MdsolLabelRef, MdsolReviewGroup,
    MdsolViewRestriction,
};
pub use study::{
    BasicDefinitions, BasicDefinitionsChild, GlobalVariables, MeasurementUnit,
    MeasurementUnitChild, Study, StudyChild, StudySlot, Symbol, SymbolChild, TranslatedText,
};
pub use version::{
    MetaDataVersion, MetaDataVersionChild, MetaDataVersionSlot, Protocol, ProtocolChild,
    StudyEventRef,
};
