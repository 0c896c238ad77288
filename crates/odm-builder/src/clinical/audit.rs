//! Audit records, signatures and the reference nodes they are made of.
//!
//! An [`AuditRecord`] or [`Signature`] may be assembled piecemeal, but once
//! one is placed in a tree every one of its mandatory parts must be present
//! by the time the tree is built.

use std::borrow::Cow;

use chrono::NaiveDateTime;
use odm_model::{BoolStyle, EditPoint};

use crate::any::AnyElement;
use crate::element::{
    Attributes, Composite, Element, emit_children, emit_opt, fill_slot, format_datetime,
};
use crate::error::{OdmError, Result};
use crate::sink::XmlSink;

/// `UserRef`: points at a `User` in the administrative data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub user_oid: String,
}

impl UserRef {
    pub fn new(user_oid: impl Into<String>) -> Self {
        Self {
            user_oid: user_oid.into(),
        }
    }
}

impl Element for UserRef {
    const TAG: &'static str = "UserRef";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("UserOID", self.user_oid.as_str())
    }
}

/// `LocationRef`: points at a `Location` in the administrative data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRef {
    pub location_oid: String,
}

impl LocationRef {
    pub fn new(location_oid: impl Into<String>) -> Self {
        Self {
            location_oid: location_oid.into(),
        }
    }
}

impl Element for LocationRef {
    const TAG: &'static str = "LocationRef";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("LocationOID", self.location_oid.as_str())
    }
}

/// `SignatureRef`: points at a signature definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRef {
    pub signature_oid: String,
}

impl SignatureRef {
    pub fn new(signature_oid: impl Into<String>) -> Self {
        Self {
            signature_oid: signature_oid.into(),
        }
    }
}

impl Element for SignatureRef {
    const TAG: &'static str = "SignatureRef";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("SignatureOID", self.signature_oid.as_str())
    }
}

/// `MeasurementUnitRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementUnitRef {
    pub measurement_unit_oid: String,
}

impl MeasurementUnitRef {
    pub fn new(measurement_unit_oid: impl Into<String>) -> Self {
        Self {
            measurement_unit_oid: measurement_unit_oid.into(),
        }
    }
}

impl Element for MeasurementUnitRef {
    const TAG: &'static str = "MeasurementUnitRef";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("MeasurementUnitOID", self.measurement_unit_oid.as_str())
    }
}

/// `DateTimeStamp`: when an audited action or signature happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeStamp {
    pub date_time: NaiveDateTime,
}

impl DateTimeStamp {
    pub fn new(date_time: NaiveDateTime) -> Self {
        Self { date_time }
    }
}

impl Element for DateTimeStamp {
    const TAG: &'static str = "DateTimeStamp";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(format_datetime(&self.date_time)))
    }
}

/// `ReasonForChange`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonForChange {
    pub reason: String,
}

impl ReasonForChange {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Element for ReasonForChange {
    const TAG: &'static str = "ReasonForChange";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.reason))
    }
}

/// `SourceID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    pub source_id: String,
}

impl SourceId {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
        }
    }
}

impl Element for SourceId {
    const TAG: &'static str = "SourceID";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.source_id))
    }
}

children! {
    /// Children accepted by [`AuditRecord`].
    pub enum AuditRecordChild for AuditRecord {
        UserRef(UserRef),
        LocationRef(LocationRef),
        DateTimeStamp(DateTimeStamp),
        ReasonForChange(ReasonForChange),
        SourceId(SourceId),
    }
}

/// Emission order of [`AuditRecord`] children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditRecordSlot {
    UserRef,
    LocationRef,
    DateTimeStamp,
    ReasonForChange,
    SourceId,
}

/// `AuditRecord`: who changed a value, where, and when.
///
/// `UserRef`, `LocationRef` and `DateTimeStamp` become mandatory once the
/// record is used; building an incomplete record fails with
/// [`OdmError::Incomplete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditRecord {
    pub edit_point: Option<EditPoint>,
    pub used_imputation_method: Option<bool>,
    pub id: Option<String>,
    user_ref: Option<UserRef>,
    location_ref: Option<LocationRef>,
    date_time_stamp: Option<DateTimeStamp>,
    reason_for_change: Option<ReasonForChange>,
    source_id: Option<SourceId>,
}

impl AuditRecord {
    /// A complete record.
    pub fn new(user_ref: UserRef, location_ref: LocationRef, date_time_stamp: DateTimeStamp) -> Self {
        Self {
            user_ref: Some(user_ref),
            location_ref: Some(location_ref),
            date_time_stamp: Some(date_time_stamp),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_edit_point(mut self, edit_point: EditPoint) -> Self {
        self.edit_point = Some(edit_point);
        self
    }

    #[must_use]
    pub fn with_used_imputation_method(mut self, used: bool) -> Self {
        self.used_imputation_method = Some(used);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<AuditRecordChild>) -> Result<&mut Self> {
        match AuditRecordChild::traced(child.into()) {
            AuditRecordChild::UserRef(node) => fill_slot(Self::TAG, &mut self.user_ref, node)?,
            AuditRecordChild::LocationRef(node) => {
                fill_slot(Self::TAG, &mut self.location_ref, node)?
            }
            AuditRecordChild::DateTimeStamp(node) => {
                fill_slot(Self::TAG, &mut self.date_time_stamp, node)?
            }
            AuditRecordChild::ReasonForChange(node) => {
                fill_slot(Self::TAG, &mut self.reason_for_change, node)?
            }
            AuditRecordChild::SourceId(node) => fill_slot(Self::TAG, &mut self.source_id, node)?,
        }
        Ok(self)
    }

    pub fn user_ref(&self) -> Option<&UserRef> {
        self.user_ref.as_ref()
    }

    pub fn location_ref(&self) -> Option<&LocationRef> {
        self.location_ref.as_ref()
    }

    pub fn date_time_stamp(&self) -> Option<&DateTimeStamp> {
        self.date_time_stamp.as_ref()
    }

    pub fn reason_for_change(&self) -> Option<&ReasonForChange> {
        self.reason_for_change.as_ref()
    }

    pub fn source_id(&self) -> Option<&SourceId> {
        self.source_id.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Element for AuditRecord {
    const TAG: &'static str = "AuditRecord";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with_opt("EditPoint", self.edit_point)
            .with_opt_bool(
                "UsedImputationMethod",
                self.used_imputation_method,
                BoolStyle::YesNo,
            )
            .with_opt("ID", self.id.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if self.user_ref.is_none() {
            return Err(OdmError::incomplete(Self::TAG, UserRef::TAG));
        }
        if self.location_ref.is_none() {
            return Err(OdmError::incomplete(Self::TAG, LocationRef::TAG));
        }
        if self.date_time_stamp.is_none() {
            return Err(OdmError::incomplete(Self::TAG, DateTimeStamp::TAG));
        }
        Ok(())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(AuditRecordChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for AuditRecord {
    type Slot = AuditRecordSlot;

    const ORDER: &'static [AuditRecordSlot] = &[
        AuditRecordSlot::UserRef,
        AuditRecordSlot::LocationRef,
        AuditRecordSlot::DateTimeStamp,
        AuditRecordSlot::ReasonForChange,
        AuditRecordSlot::SourceId,
    ];

    fn emit(&self, slot: AuditRecordSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            AuditRecordSlot::UserRef => emit_opt(self.user_ref.as_ref(), sink),
            AuditRecordSlot::LocationRef => emit_opt(self.location_ref.as_ref(), sink),
            AuditRecordSlot::DateTimeStamp => emit_opt(self.date_time_stamp.as_ref(), sink),
            AuditRecordSlot::ReasonForChange => emit_opt(self.reason_for_change.as_ref(), sink),
            AuditRecordSlot::SourceId => emit_opt(self.source_id.as_ref(), sink),
        }
    }
}

children! {
    /// Children accepted by [`Signature`].
    pub enum SignatureChild for Signature {
        UserRef(UserRef),
        LocationRef(LocationRef),
        SignatureRef(SignatureRef),
        DateTimeStamp(DateTimeStamp),
    }
}

/// Emission order of [`Signature`] children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureSlot {
    UserRef,
    LocationRef,
    SignatureRef,
    DateTimeStamp,
}

/// `Signature`: an electronic signature over the enclosing data.
///
/// All four children are mandatory at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub id: Option<String>,
    user_ref: Option<UserRef>,
    location_ref: Option<LocationRef>,
    signature_ref: Option<SignatureRef>,
    date_time_stamp: Option<DateTimeStamp>,
}

impl Signature {
    /// A complete signature.
    pub fn new(
        user_ref: UserRef,
        location_ref: LocationRef,
        signature_ref: SignatureRef,
        date_time_stamp: DateTimeStamp,
    ) -> Self {
        Self {
            id: None,
            user_ref: Some(user_ref),
            location_ref: Some(location_ref),
            signature_ref: Some(signature_ref),
            date_time_stamp: Some(date_time_stamp),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<SignatureChild>) -> Result<&mut Self> {
        match SignatureChild::traced(child.into()) {
            SignatureChild::UserRef(node) => fill_slot(Self::TAG, &mut self.user_ref, node)?,
            SignatureChild::LocationRef(node) => {
                fill_slot(Self::TAG, &mut self.location_ref, node)?
            }
            SignatureChild::SignatureRef(node) => {
                fill_slot(Self::TAG, &mut self.signature_ref, node)?
            }
            SignatureChild::DateTimeStamp(node) => {
                fill_slot(Self::TAG, &mut self.date_time_stamp, node)?
            }
        }
        Ok(self)
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Element for Signature {
    const TAG: &'static str = "Signature";

    fn attributes(&self) -> Attributes {
        Attributes::new().with_opt("ID", self.id.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if self.user_ref.is_none() {
            return Err(OdmError::incomplete(Self::TAG, UserRef::TAG));
        }
        if self.location_ref.is_none() {
            return Err(OdmError::incomplete(Self::TAG, LocationRef::TAG));
        }
        if self.signature_ref.is_none() {
            return Err(OdmError::incomplete(Self::TAG, SignatureRef::TAG));
        }
        if self.date_time_stamp.is_none() {
            return Err(OdmError::incomplete(Self::TAG, DateTimeStamp::TAG));
        }
        Ok(())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(SignatureChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for Signature {
    type Slot = SignatureSlot;

    const ORDER: &'static [SignatureSlot] = &[
        SignatureSlot::UserRef,
        SignatureSlot::LocationRef,
        SignatureSlot::SignatureRef,
        SignatureSlot::DateTimeStamp,
    ];

    fn emit(&self, slot: SignatureSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            SignatureSlot::UserRef => emit_opt(self.user_ref.as_ref(), sink),
            SignatureSlot::LocationRef => emit_opt(self.location_ref.as_ref(), sink),
            SignatureSlot::SignatureRef => emit_opt(self.signature_ref.as_ref(), sink),
            SignatureSlot::DateTimeStamp => emit_opt(self.date_time_stamp.as_ref(), sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sink::to_xml_string;
    use chrono::NaiveDate;

    fn stamp() -> DateTimeStamp {
        DateTimeStamp::new(
            NaiveDate::from_ymd_opt(2023, 11, 2)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn audit_record_emits_in_schema_order() {
        let mut record = AuditRecord::default().with_edit_point(EditPoint::Monitoring);
        record
            .attach(ReasonForChange::new("Data entry error"))
            .unwrap()
            .attach(stamp())
            .unwrap()
            .attach(LocationRef::new("SITE01"))
            .unwrap()
            .attach(UserRef::new("isparks"))
            .unwrap();

        let xml = to_xml_string(&record).unwrap();
        assert_eq!(
            xml,
            "<AuditRecord EditPoint=\"Monitoring\"><UserRef UserOID=\"isparks\" />\
             <LocationRef LocationOID=\"SITE01\" />\
             <DateTimeStamp>2023-11-02T14:30:00</DateTimeStamp>\
             <ReasonForChange>Data entry error</ReasonForChange></AuditRecord>"
        );
    }

    #[test]
    fn incomplete_audit_record_fails_at_build_not_attach() {
        let mut record = AuditRecord::default();
        record.attach(UserRef::new("isparks")).unwrap();
        assert!(!record.is_complete());

        let err = to_xml_string(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Completeness);
        assert!(matches!(
            err,
            OdmError::Incomplete {
                element: "AuditRecord",
                missing: "LocationRef"
            }
        ));
    }

    #[test]
    fn second_user_ref_is_rejected_and_first_kept() {
        let mut record = AuditRecord::default();
        record.attach(UserRef::new("first")).unwrap();
        let err = record.attach(UserRef::new("second")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
        assert_eq!(record.user_ref().unwrap().user_oid, "first");
    }

    #[test]
    fn signature_requires_signature_ref() {
        let mut signature = Signature::default();
        signature
            .attach(UserRef::new("u"))
            .unwrap()
            .attach(LocationRef::new("l"))
            .unwrap()
            .attach(stamp())
            .unwrap();
        let err = to_xml_string(&signature).unwrap_err();
        assert!(matches!(
            err,
            OdmError::Incomplete {
                missing: "SignatureRef",
                ..
            }
        ));

        signature.attach(SignatureRef::new("SIG1")).unwrap();
        let xml = to_xml_string(&signature).unwrap();
        assert!(xml.starts_with("<Signature><UserRef UserOID=\"u\" /><LocationRef"));
        assert!(xml.contains("<SignatureRef SignatureOID=\"SIG1\" /><DateTimeStamp>"));
    }
}
