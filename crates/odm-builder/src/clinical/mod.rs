//! Clinical data: subject, event, form, item group and item values, with
//! their audit records, signatures, annotations and vendor extensions.

mod annotation;
mod audit;
mod data;
mod extensions;

pub use annotation::{
    Annotation, AnnotationChild, AnnotationSlot, Annotations, AnnotationsChild, Comment, Flag,
    FlagChild, FlagSlot, FlagType, FlagValue,
};
pub use audit::{
    AuditRecord, AuditRecordChild, AuditRecordSlot, DateTimeStamp, LocationRef,
    MeasurementUnitRef, ReasonForChange, Signature, SignatureChild, SignatureRef, SignatureSlot,
    SourceId, UserRef,
};
pub use data::{
    ClinicalData, ClinicalDataChild, ClinicalDataSlot, FormData, FormDataChild, FormDataSlot,
    ItemData, ItemDataChild, ItemDataSlot, ItemGroupData, ItemGroupDataChild, ItemGroupDataSlot,
    SiteRef, StudyEventData, StudyEventDataChild, StudyEventDataSlot, SubjectData,
    SubjectDataChild, SubjectDataSlot,
};
pub use extensions::{MdsolProtocolDeviation, MdsolQuery};
