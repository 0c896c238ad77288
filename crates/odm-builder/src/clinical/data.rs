//! The clinical data chain: `ClinicalData → SubjectData → StudyEventData →
//! FormData → ItemGroupData → ItemData`.

use odm_model::{BoolStyle, LocationOidType, SubjectKeyType, TransactionType};

use crate::any::AnyElement;
use crate::clinical::{
    Annotation, Annotations, AuditRecord, MdsolProtocolDeviation, MdsolQuery, MeasurementUnitRef,
    Signature,
};
use crate::element::{
    Attributes, Composite, Element, emit_all, emit_children, emit_opt, fill_slot, write_node,
};
use crate::error::{OdmError, Result};
use crate::mixins::{HasMilestones, LastUpdate, LastUpdateTime, Milestones};
use crate::sink::XmlSink;
use crate::transaction::{ALL_TRANSACTION_TYPES, Transactional};

const SUBJECT_TRANSACTION_TYPES: &[TransactionType] = &[
    TransactionType::Insert,
    TransactionType::Update,
    TransactionType::Upsert,
    TransactionType::Context,
];

// =============================================================================
// ItemData
// =============================================================================

children! {
    /// Children accepted by [`ItemData`].
    pub enum ItemDataChild for ItemData {
        AuditRecord(AuditRecord),
        MeasurementUnitRef(MeasurementUnitRef),
        MdsolQuery(MdsolQuery),
        MdsolProtocolDeviation(MdsolProtocolDeviation),
        Annotation(Annotation),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDataSlot {
    AuditRecord,
    MeasurementUnitRef,
    Queries,
    ProtocolDeviations,
    Annotations,
}

/// `ItemData`: one captured value.
///
/// An empty value is written as `IsNull="Yes"` with no `Value` attribute.
/// The item OID is fixed at construction because item groups key their
/// items by it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemData {
    item_oid: String,
    pub value: String,
    pub specify_value: Option<String>,
    pub lock: Option<bool>,
    pub freeze: Option<bool>,
    pub verify: Option<bool>,
    transaction_type: Option<TransactionType>,
    last_update: LastUpdate,
    milestones: Milestones,
    audit_record: Option<AuditRecord>,
    measurement_unit_ref: Option<MeasurementUnitRef>,
    queries: Vec<MdsolQuery>,
    deviations: Vec<MdsolProtocolDeviation>,
    annotations: Vec<Annotation>,
}

impl ItemData {
    pub fn new(item_oid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            item_oid: item_oid.into(),
            value: value.into(),
            specify_value: None,
            lock: None,
            freeze: None,
            verify: None,
            transaction_type: None,
            last_update: LastUpdate::default(),
            milestones: Milestones::default(),
            audit_record: None,
            measurement_unit_ref: None,
            queries: Vec::new(),
            deviations: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// An item with no value.
    pub fn null(item_oid: impl Into<String>) -> Self {
        Self::new(item_oid, String::new())
    }

    pub fn item_oid(&self) -> &str {
        &self.item_oid
    }

    pub fn is_null(&self) -> bool {
        self.value.is_empty()
    }

    #[must_use]
    pub fn with_specify_value(mut self, specify_value: impl Into<String>) -> Self {
        self.specify_value = Some(specify_value.into());
        self
    }

    #[must_use]
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = Some(lock);
        self
    }

    #[must_use]
    pub fn with_freeze(mut self, freeze: bool) -> Self {
        self.freeze = Some(freeze);
        self
    }

    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    pub fn attach(&mut self, child: impl Into<ItemDataChild>) -> Result<&mut Self> {
        match ItemDataChild::traced(child.into()) {
            ItemDataChild::AuditRecord(node) => fill_slot(Self::TAG, &mut self.audit_record, node)?,
            ItemDataChild::MeasurementUnitRef(node) => {
                fill_slot(Self::TAG, &mut self.measurement_unit_ref, node)?
            }
            ItemDataChild::MdsolQuery(node) => self.queries.push(node),
            ItemDataChild::MdsolProtocolDeviation(node) => self.deviations.push(node),
            ItemDataChild::Annotation(node) => self.annotations.push(node),
        }
        Ok(self)
    }

    pub fn audit_record(&self) -> Option<&AuditRecord> {
        self.audit_record.as_ref()
    }

    pub fn measurement_unit_ref(&self) -> Option<&MeasurementUnitRef> {
        self.measurement_unit_ref.as_ref()
    }

    pub fn queries(&self) -> &[MdsolQuery] {
        &self.queries
    }

    pub fn protocol_deviations(&self) -> &[MdsolProtocolDeviation] {
        &self.deviations
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Element for ItemData {
    const TAG: &'static str = "ItemData";

    fn attributes(&self) -> Attributes {
        let attributes = Attributes::new().with("ItemOID", self.item_oid.as_str());
        let attributes = if self.is_null() {
            attributes.with("IsNull", BoolStyle::YesNo.render(true))
        } else {
            attributes.with("Value", self.value.as_str())
        };
        let attributes = attributes
            .with_opt("TransactionType", self.transaction_type)
            .with_opt("mdsol:SpecifyValue", self.specify_value.as_deref())
            .with_opt_bool("mdsol:Lock", self.lock, BoolStyle::YesNo)
            .with_opt_bool("mdsol:Freeze", self.freeze, BoolStyle::YesNo)
            .with_opt_bool("mdsol:Verify", self.verify, BoolStyle::YesNo);
        self.last_update.apply(attributes)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ItemDataChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for ItemData {
    type Slot = ItemDataSlot;

    const ORDER: &'static [ItemDataSlot] = &[
        ItemDataSlot::AuditRecord,
        ItemDataSlot::MeasurementUnitRef,
        ItemDataSlot::Queries,
        ItemDataSlot::ProtocolDeviations,
        ItemDataSlot::Annotations,
    ];

    fn emit(&self, slot: ItemDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            ItemDataSlot::AuditRecord => emit_opt(self.audit_record.as_ref(), sink),
            ItemDataSlot::MeasurementUnitRef => emit_opt(self.measurement_unit_ref.as_ref(), sink),
            ItemDataSlot::Queries => emit_all(&self.queries, sink),
            ItemDataSlot::ProtocolDeviations => emit_all(&self.deviations, sink),
            ItemDataSlot::Annotations => {
                emit_all(&self.annotations, sink)?;
                self.milestones.build(sink)
            }
        }
    }
}

// =============================================================================
// ItemGroupData
// =============================================================================

children! {
    /// Children accepted by [`ItemGroupData`].
    pub enum ItemGroupDataChild for ItemGroupData {
        AuditRecord(AuditRecord),
        Signature(Signature),
        Annotation(Annotation),
        ItemData(ItemData),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemGroupDataSlot {
    AuditRecord,
    Signature,
    Annotations,
    Items,
}

/// `ItemGroupData`: items in insertion order, unique by `ItemOID`.
///
/// Without an explicit OID the group takes the OID of the form it is written
/// under; built on its own it must have one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemGroupData {
    pub item_group_oid: Option<String>,
    pub item_group_repeat_key: Option<String>,
    /// Written as `mdsol:Submission="WholeItemGroup"` when set.
    pub whole_item_group: bool,
    transaction_type: Option<TransactionType>,
    last_update: LastUpdate,
    audit_record: Option<AuditRecord>,
    signature: Option<Signature>,
    annotations: Vec<Annotation>,
    items: Vec<ItemData>,
}

impl ItemGroupData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_item_group_oid(mut self, item_group_oid: impl Into<String>) -> Self {
        self.item_group_oid = Some(item_group_oid.into());
        self
    }

    #[must_use]
    pub fn with_repeat_key(mut self, repeat_key: impl Into<String>) -> Self {
        self.item_group_repeat_key = Some(repeat_key.into());
        self
    }

    #[must_use]
    pub fn with_whole_item_group(mut self, whole_item_group: bool) -> Self {
        self.whole_item_group = whole_item_group;
        self
    }

    /// Attaches a child. A second item with an `ItemOID` already present is
    /// rejected with [`OdmError::DuplicateKey`].
    pub fn attach(&mut self, child: impl Into<ItemGroupDataChild>) -> Result<&mut Self> {
        match ItemGroupDataChild::traced(child.into()) {
            ItemGroupDataChild::AuditRecord(node) => {
                fill_slot(Self::TAG, &mut self.audit_record, node)?
            }
            ItemGroupDataChild::Signature(node) => fill_slot(Self::TAG, &mut self.signature, node)?,
            ItemGroupDataChild::Annotation(node) => self.annotations.push(node),
            ItemGroupDataChild::ItemData(node) => {
                if self.item(node.item_oid()).is_some() {
                    return Err(OdmError::DuplicateKey {
                        container: Self::TAG,
                        child: ItemData::TAG,
                        key: node.item_oid,
                    });
                }
                self.items.push(node);
            }
        }
        Ok(self)
    }

    pub fn item(&self, item_oid: &str) -> Option<&ItemData> {
        self.items.iter().find(|item| item.item_oid == item_oid)
    }

    pub fn item_mut(&mut self, item_oid: &str) -> Option<&mut ItemData> {
        self.items.iter_mut().find(|item| item.item_oid == item_oid)
    }

    pub fn items(&self) -> &[ItemData] {
        &self.items
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn attributes_with(&self, item_group_oid: &str) -> Attributes {
        let submission = if self.whole_item_group {
            "WholeItemGroup"
        } else {
            "SpecifiedItemsOnly"
        };
        let attributes = Attributes::new()
            .with("ItemGroupOID", item_group_oid)
            .with_opt("ItemGroupRepeatKey", self.item_group_repeat_key.as_deref())
            .with_opt("TransactionType", self.transaction_type)
            .with("mdsol:Submission", submission);
        self.last_update.apply(attributes)
    }

    /// Builds the group under the form `form_oid`, which supplies the
    /// `ItemGroupOID` when none was set.
    pub(crate) fn build_in_form(&self, form_oid: &str, sink: &mut dyn XmlSink) -> Result<()> {
        let item_group_oid = self.item_group_oid.as_deref().unwrap_or(form_oid);
        write_node(self, &self.attributes_with(item_group_oid), sink)
    }
}

impl Element for ItemGroupData {
    const TAG: &'static str = "ItemGroupData";

    fn attributes(&self) -> Attributes {
        self.attributes_with(self.item_group_oid.as_deref().unwrap_or_default())
    }

    fn validate(&self) -> Result<()> {
        match self.item_group_oid {
            Some(_) => Ok(()),
            None => Err(OdmError::incomplete(Self::TAG, "ItemGroupOID")),
        }
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ItemGroupDataChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for ItemGroupData {
    type Slot = ItemGroupDataSlot;

    const ORDER: &'static [ItemGroupDataSlot] = &[
        ItemGroupDataSlot::AuditRecord,
        ItemGroupDataSlot::Signature,
        ItemGroupDataSlot::Annotations,
        ItemGroupDataSlot::Items,
    ];

    fn emit(&self, slot: ItemGroupDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            ItemGroupDataSlot::AuditRecord => emit_opt(self.audit_record.as_ref(), sink),
            ItemGroupDataSlot::Signature => emit_opt(self.signature.as_ref(), sink),
            ItemGroupDataSlot::Annotations => emit_all(&self.annotations, sink),
            ItemGroupDataSlot::Items => emit_all(&self.items, sink),
        }
    }
}

// =============================================================================
// FormData
// =============================================================================

children! {
    /// Children accepted by [`FormData`].
    pub enum FormDataChild for FormData {
        AuditRecord(AuditRecord),
        Signature(Signature),
        Annotation(Annotation),
        ItemGroupData(ItemGroupData),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormDataSlot {
    AuditRecord,
    Signature,
    Annotations,
    ItemGroups,
}

/// `FormData`.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    pub form_oid: String,
    pub form_repeat_key: Option<String>,
    transaction_type: Option<TransactionType>,
    last_update: LastUpdate,
    milestones: Milestones,
    audit_record: Option<AuditRecord>,
    signature: Option<Signature>,
    annotations: Vec<Annotation>,
    item_groups: Vec<ItemGroupData>,
}

impl FormData {
    pub fn new(form_oid: impl Into<String>) -> Self {
        Self {
            form_oid: form_oid.into(),
            form_repeat_key: None,
            transaction_type: None,
            last_update: LastUpdate::default(),
            milestones: Milestones::default(),
            audit_record: None,
            signature: None,
            annotations: Vec::new(),
            item_groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repeat_key(mut self, repeat_key: impl Into<String>) -> Self {
        self.form_repeat_key = Some(repeat_key.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<FormDataChild>) -> Result<&mut Self> {
        match FormDataChild::traced(child.into()) {
            FormDataChild::AuditRecord(node) => fill_slot(Self::TAG, &mut self.audit_record, node)?,
            FormDataChild::Signature(node) => fill_slot(Self::TAG, &mut self.signature, node)?,
            FormDataChild::Annotation(node) => self.annotations.push(node),
            FormDataChild::ItemGroupData(node) => self.item_groups.push(node),
        }
        Ok(self)
    }

    pub fn item_groups(&self) -> &[ItemGroupData] {
        &self.item_groups
    }

    pub fn item_groups_mut(&mut self) -> &mut [ItemGroupData] {
        &mut self.item_groups
    }
}

impl Element for FormData {
    const TAG: &'static str = "FormData";

    fn attributes(&self) -> Attributes {
        let attributes = Attributes::new()
            .with("FormOID", self.form_oid.as_str())
            .with_opt("FormRepeatKey", self.form_repeat_key.as_deref())
            .with_opt("TransactionType", self.transaction_type);
        self.last_update.apply(attributes)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(FormDataChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for FormData {
    type Slot = FormDataSlot;

    const ORDER: &'static [FormDataSlot] = &[
        FormDataSlot::AuditRecord,
        FormDataSlot::Signature,
        FormDataSlot::Annotations,
        FormDataSlot::ItemGroups,
    ];

    fn emit(&self, slot: FormDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            FormDataSlot::AuditRecord => emit_opt(self.audit_record.as_ref(), sink),
            FormDataSlot::Signature => emit_opt(self.signature.as_ref(), sink),
            FormDataSlot::Annotations => {
                emit_all(&self.annotations, sink)?;
                self.milestones.build(sink)
            }
            FormDataSlot::ItemGroups => {
                for group in &self.item_groups {
                    group.build_in_form(&self.form_oid, sink)?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// StudyEventData
// =============================================================================

children! {
    /// Children accepted by [`StudyEventData`].
    pub enum StudyEventDataChild for StudyEventData {
        AuditRecord(AuditRecord),
        Signature(Signature),
        Annotation(Annotation),
        FormData(FormData),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyEventDataSlot {
    AuditRecord,
    Signature,
    Annotations,
    Forms,
}

/// `StudyEventData`.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyEventData {
    pub study_event_oid: String,
    pub study_event_repeat_key: Option<String>,
    transaction_type: Option<TransactionType>,
    last_update: LastUpdate,
    milestones: Milestones,
    audit_record: Option<AuditRecord>,
    signature: Option<Signature>,
    annotations: Vec<Annotation>,
    forms: Vec<FormData>,
}

impl StudyEventData {
    pub fn new(study_event_oid: impl Into<String>) -> Self {
        Self {
            study_event_oid: study_event_oid.into(),
            study_event_repeat_key: None,
            transaction_type: None,
            last_update: LastUpdate::default(),
            milestones: Milestones::default(),
            audit_record: None,
            signature: None,
            annotations: Vec::new(),
            forms: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repeat_key(mut self, repeat_key: impl Into<String>) -> Self {
        self.study_event_repeat_key = Some(repeat_key.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<StudyEventDataChild>) -> Result<&mut Self> {
        match StudyEventDataChild::traced(child.into()) {
            StudyEventDataChild::AuditRecord(node) => {
                fill_slot(Self::TAG, &mut self.audit_record, node)?
            }
            StudyEventDataChild::Signature(node) => {
                fill_slot(Self::TAG, &mut self.signature, node)?
            }
            StudyEventDataChild::Annotation(node) => self.annotations.push(node),
            StudyEventDataChild::FormData(node) => self.forms.push(node),
        }
        Ok(self)
    }

    pub fn forms(&self) -> &[FormData] {
        &self.forms
    }

    pub fn forms_mut(&mut self) -> &mut [FormData] {
        &mut self.forms
    }
}

impl Element for StudyEventData {
    const TAG: &'static str = "StudyEventData";

    fn attributes(&self) -> Attributes {
        let attributes = Attributes::new()
            .with("StudyEventOID", self.study_event_oid.as_str())
            .with_opt(
                "StudyEventRepeatKey",
                self.study_event_repeat_key.as_deref(),
            )
            .with_opt("TransactionType", self.transaction_type);
        self.last_update.apply(attributes)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(StudyEventDataChild::try_from(child)?)
            .map(|_| ())
    }
}

impl Composite for StudyEventData {
    type Slot = StudyEventDataSlot;

    const ORDER: &'static [StudyEventDataSlot] = &[
        StudyEventDataSlot::AuditRecord,
        StudyEventDataSlot::Signature,
        StudyEventDataSlot::Annotations,
        StudyEventDataSlot::Forms,
    ];

    fn emit(&self, slot: StudyEventDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            StudyEventDataSlot::AuditRecord => emit_opt(self.audit_record.as_ref(), sink),
            StudyEventDataSlot::Signature => emit_opt(self.signature.as_ref(), sink),
            StudyEventDataSlot::Annotations => {
                emit_all(&self.annotations, sink)?;
                self.milestones.build(sink)
            }
            StudyEventDataSlot::Forms => emit_all(&self.forms, sink),
        }
    }
}

// =============================================================================
// SubjectData
// =============================================================================

/// `SiteRef`: the site a subject is enrolled at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    pub location_oid: String,
    pub location_oid_type: Option<LocationOidType>,
}

impl SiteRef {
    pub fn new(location_oid: impl Into<String>) -> Self {
        Self {
            location_oid: location_oid.into(),
            location_oid_type: None,
        }
    }

    #[must_use]
    pub fn with_location_oid_type(mut self, location_oid_type: LocationOidType) -> Self {
        self.location_oid_type = Some(location_oid_type);
        self
    }
}

impl Element for SiteRef {
    const TAG: &'static str = "SiteRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("LocationOID", self.location_oid.as_str())
            .with_opt("mdsol:LocationOIDType", self.location_oid_type)
    }
}

children! {
    /// Children accepted by [`SubjectData`].
    pub enum SubjectDataChild for SubjectData {
        AuditRecord(AuditRecord),
        Signature(Signature),
        Annotation(Annotation),
        StudyEventData(StudyEventData),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectDataSlot {
    AuditRecord,
    Signature,
    SiteRef,
    Annotations,
    StudyEvents,
}

/// `SubjectData`. Its `SiteRef` is fixed at construction and always written.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectData {
    pub subject_key: String,
    pub subject_key_type: SubjectKeyType,
    site_ref: SiteRef,
    transaction_type: Option<TransactionType>,
    last_update: LastUpdate,
    milestones: Milestones,
    audit_record: Option<AuditRecord>,
    signature: Option<Signature>,
    annotations: Vec<Annotation>,
    study_events: Vec<StudyEventData>,
}

impl SubjectData {
    pub fn new(site_location_oid: impl Into<String>, subject_key: impl Into<String>) -> Self {
        Self {
            subject_key: subject_key.into(),
            subject_key_type: SubjectKeyType::SubjectName,
            site_ref: SiteRef::new(site_location_oid),
            transaction_type: None,
            last_update: LastUpdate::default(),
            milestones: Milestones::default(),
            audit_record: None,
            signature: None,
            annotations: Vec::new(),
            study_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_subject_key_type(mut self, subject_key_type: SubjectKeyType) -> Self {
        self.subject_key_type = subject_key_type;
        self
    }

    pub fn site_ref(&self) -> &SiteRef {
        &self.site_ref
    }

    pub fn site_ref_mut(&mut self) -> &mut SiteRef {
        &mut self.site_ref
    }

    pub fn attach(&mut self, child: impl Into<SubjectDataChild>) -> Result<&mut Self> {
        match SubjectDataChild::traced(child.into()) {
            SubjectDataChild::AuditRecord(node) => {
                fill_slot(Self::TAG, &mut self.audit_record, node)?
            }
            SubjectDataChild::Signature(node) => fill_slot(Self::TAG, &mut self.signature, node)?,
            SubjectDataChild::Annotation(node) => self.annotations.push(node),
            SubjectDataChild::StudyEventData(node) => self.study_events.push(node),
        }
        Ok(self)
    }

    pub fn study_events(&self) -> &[StudyEventData] {
        &self.study_events
    }

    pub fn study_events_mut(&mut self) -> &mut [StudyEventData] {
        &mut self.study_events
    }
}

impl Element for SubjectData {
    const TAG: &'static str = "SubjectData";

    fn attributes(&self) -> Attributes {
        let attributes = Attributes::new()
            .with("SubjectKey", self.subject_key.as_str())
            .with("mdsol:SubjectKeyType", self.subject_key_type.as_str())
            .with_opt("TransactionType", self.transaction_type);
        self.last_update.apply(attributes)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(SubjectDataChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for SubjectData {
    type Slot = SubjectDataSlot;

    const ORDER: &'static [SubjectDataSlot] = &[
        SubjectDataSlot::AuditRecord,
        SubjectDataSlot::Signature,
        SubjectDataSlot::SiteRef,
        SubjectDataSlot::Annotations,
        SubjectDataSlot::StudyEvents,
    ];

    fn emit(&self, slot: SubjectDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            SubjectDataSlot::AuditRecord => emit_opt(self.audit_record.as_ref(), sink),
            SubjectDataSlot::Signature => emit_opt(self.signature.as_ref(), sink),
            SubjectDataSlot::SiteRef => self.site_ref.build(sink),
            SubjectDataSlot::Annotations => {
                emit_all(&self.annotations, sink)?;
                self.milestones.build(sink)
            }
            SubjectDataSlot::StudyEvents => emit_all(&self.study_events, sink),
        }
    }
}

// =============================================================================
// ClinicalData
// =============================================================================

children! {
    /// Children accepted by [`ClinicalData`].
    pub enum ClinicalDataChild for ClinicalData {
        SubjectData(SubjectData),
        Annotations(Annotations),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicalDataSlot {
    SubjectData,
    Annotations,
}

/// `ClinicalData` for one subject of one study environment.
///
/// `StudyOID` is written as `project(environment)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalData {
    pub project_name: String,
    pub environment: String,
    pub metadata_version_oid: String,
    subject_data: Option<SubjectData>,
    annotations: Option<Annotations>,
}

impl ClinicalData {
    pub fn new(project_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            environment: environment.into(),
            metadata_version_oid: "1".to_string(),
            subject_data: None,
            annotations: None,
        }
    }

    #[must_use]
    pub fn with_metadata_version_oid(mut self, oid: impl Into<String>) -> Self {
        self.metadata_version_oid = oid.into();
        self
    }

    pub fn study_oid(&self) -> String {
        format!("{}({})", self.project_name, self.environment)
    }

    pub fn attach(&mut self, child: impl Into<ClinicalDataChild>) -> Result<&mut Self> {
        match ClinicalDataChild::traced(child.into()) {
            ClinicalDataChild::SubjectData(node) => {
                fill_slot(Self::TAG, &mut self.subject_data, node)?
            }
            ClinicalDataChild::Annotations(node) => {
                fill_slot(Self::TAG, &mut self.annotations, node)?
            }
        }
        Ok(self)
    }

    pub fn subject_data(&self) -> Option<&SubjectData> {
        self.subject_data.as_ref()
    }

    pub fn subject_data_mut(&mut self) -> Option<&mut SubjectData> {
        self.subject_data.as_mut()
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }
}

impl Element for ClinicalData {
    const TAG: &'static str = "ClinicalData";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("StudyOID", self.study_oid())
            .with("MetaDataVersionOID", self.metadata_version_oid.as_str())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ClinicalDataChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for ClinicalData {
    type Slot = ClinicalDataSlot;

    const ORDER: &'static [ClinicalDataSlot] =
        &[ClinicalDataSlot::SubjectData, ClinicalDataSlot::Annotations];

    fn emit(&self, slot: ClinicalDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            ClinicalDataSlot::SubjectData => emit_opt(self.subject_data.as_ref(), sink),
            ClinicalDataSlot::Annotations => emit_opt(self.annotations.as_ref(), sink),
        }
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

impl Transactional for SubjectData {
    const TRANSACTION_TYPES: &'static [TransactionType] = SUBJECT_TRANSACTION_TYPES;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

impl Transactional for StudyEventData {
    const TRANSACTION_TYPES: &'static [TransactionType] = ALL_TRANSACTION_TYPES;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

impl Transactional for FormData {
    const TRANSACTION_TYPES: &'static [TransactionType] = ALL_TRANSACTION_TYPES;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

impl Transactional for ItemGroupData {
    const TRANSACTION_TYPES: &'static [TransactionType] = ALL_TRANSACTION_TYPES;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

impl Transactional for ItemData {
    const TRANSACTION_TYPES: &'static [TransactionType] = ALL_TRANSACTION_TYPES;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

impl LastUpdateTime for SubjectData {
    fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    fn last_update_mut(&mut self) -> &mut LastUpdate {
        &mut self.last_update
    }
}

impl LastUpdateTime for StudyEventData {
    fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    fn last_update_mut(&mut self) -> &mut LastUpdate {
        &mut self.last_update
    }
}

impl LastUpdateTime for FormData {
    fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    fn last_update_mut(&mut self) -> &mut LastUpdate {
        &mut self.last_update
    }
}

impl LastUpdateTime for ItemGroupData {
    fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    fn last_update_mut(&mut self) -> &mut LastUpdate {
        &mut self.last_update
    }
}

impl LastUpdateTime for ItemData {
    fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    fn last_update_mut(&mut self) -> &mut LastUpdate {
        &mut self.last_update
    }
}

impl HasMilestones for SubjectData {
    fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    fn milestones_mut(&mut self) -> &mut Milestones {
        &mut self.milestones
    }
}

impl HasMilestones for StudyEventData {
    fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    fn milestones_mut(&mut self) -> &mut Milestones {
        &mut self.milestones
    }
}

impl HasMilestones for FormData {
    fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    fn milestones_mut(&mut self) -> &mut Milestones {
        &mut self.milestones
    }
}

impl HasMilestones for ItemData {
    fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    fn milestones_mut(&mut self) -> &mut Milestones {
        &mut self.milestones
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use odm_model::QueryStatus;

    use super::*;
    use crate::clinical::{Comment, DateTimeStamp, LocationRef, UserRef};
    use crate::error::ErrorKind;
    use crate::sink::{EventLog, to_xml_string};

    fn audit_record() -> AuditRecord {
        AuditRecord::new(
            UserRef::new("isparks"),
            LocationRef::new("MDSOL"),
            DateTimeStamp::new(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            ),
        )
    }

    #[test]
    fn item_with_value_has_no_null_marker() {
        let item = ItemData::new("SUBJINIT", "AAA");
        assert_eq!(
            to_xml_string(&item).unwrap(),
            r#"<ItemData ItemOID="SUBJINIT" Value="AAA" />"#
        );
    }

    #[test]
    fn empty_item_is_null() {
        let item = ItemData::new("SUBJINIT", "");
        assert!(item.is_null());
        assert_eq!(
            to_xml_string(&item).unwrap(),
            r#"<ItemData ItemOID="SUBJINIT" IsNull="Yes" />"#
        );
        assert_eq!(ItemData::null("SUBJINIT"), item);
    }

    #[test]
    fn item_children_follow_schema_order_not_attach_order() {
        let mut item = ItemData::new("VSDT", "01 Jan 2024").with_verify(true);
        item.attach(Annotation::new())
            .unwrap()
            .attach(MdsolProtocolDeviation::new(
                "Late visit",
                odm_model::ProtocolDeviationStatus::Open,
            ))
            .unwrap()
            .attach(MdsolQuery::new().with_status(QueryStatus::Open))
            .unwrap()
            .attach(MeasurementUnitRef::new("KG"))
            .unwrap()
            .attach(audit_record())
            .unwrap();

        let mut log = EventLog::new();
        item.build(&mut log).unwrap();
        assert_eq!(
            log.start_tags(),
            vec![
                "ItemData",
                "AuditRecord",
                "UserRef",
                "LocationRef",
                "DateTimeStamp",
                "MeasurementUnitRef",
                "mdsol:Query",
                "mdsol:ProtocolDeviation",
                "Annotation",
            ]
        );
        assert_eq!(
            log.attributes_of("ItemData").unwrap().get("mdsol:Verify"),
            Some("Yes")
        );
    }

    #[test]
    fn duplicate_item_oid_is_rejected() {
        let mut group = ItemGroupData::new();
        group.attach(ItemData::new("AGE", "42")).unwrap();
        let err = group.attach(ItemData::new("AGE", "43")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
        assert_eq!(
            err.to_string(),
            "ItemGroupData already contains a ItemData with key 'AGE'"
        );
        assert_eq!(group.items().len(), 1);
        assert_eq!(group.item("AGE").unwrap().value, "42");
    }

    #[test]
    fn item_group_oid_falls_back_to_form_oid() {
        let mut form = FormData::new("DM").with_repeat_key("1");
        form.attach(ItemGroupData::new()).unwrap();
        form.attach(
            ItemGroupData::new()
                .with_item_group_oid("DM_LOG")
                .with_whole_item_group(true),
        )
        .unwrap();

        assert_eq!(
            to_xml_string(&form).unwrap(),
            "<FormData FormOID=\"DM\" FormRepeatKey=\"1\">\
             <ItemGroupData ItemGroupOID=\"DM\" mdsol:Submission=\"SpecifiedItemsOnly\" />\
             <ItemGroupData ItemGroupOID=\"DM_LOG\" mdsol:Submission=\"WholeItemGroup\" />\
             </FormData>"
        );
    }

    #[test]
    fn standalone_item_group_needs_an_oid() {
        let err = to_xml_string(&ItemGroupData::new()).unwrap_err();
        assert!(matches!(
            err,
            OdmError::Incomplete {
                element: "ItemGroupData",
                missing: "ItemGroupOID"
            }
        ));
    }

    #[test]
    fn clinical_data_holds_one_subject() {
        let mut clinical = ClinicalData::new("Mediflex", "Dev");
        clinical.attach(SubjectData::new("SITE01", "001")).unwrap();
        let err = clinical
            .attach(SubjectData::new("SITE01", "002"))
            .unwrap_err();
        assert!(matches!(
            err,
            OdmError::SlotOccupied {
                container: "ClinicalData",
                child: "SubjectData"
            }
        ));
        assert_eq!(clinical.subject_data().unwrap().subject_key, "001");
    }

    #[test]
    fn subject_writes_site_ref_and_milestones_after_annotations() {
        let mut subject = SubjectData::new("SITE01", "001");
        subject.set_transaction_type(TransactionType::Insert).unwrap();
        subject.add_milestone("Randomized", None);
        let mut annotation = Annotation::new();
        annotation.attach(Comment::new("Consented")).unwrap();
        subject.attach(annotation).unwrap();
        subject
            .set_last_update_time(
                NaiveDate::from_ymd_opt(2024, 2, 1)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            );

        insta::assert_snapshot!(to_xml_string(&subject).unwrap(), @r#"<SubjectData SubjectKey="001" mdsol:SubjectKeyType="SubjectName" TransactionType="Insert" mdsol:LastUpdateTime="2024-02-01T12:00:00"><SiteRef LocationOID="SITE01" /><Annotation SeqNum="1"><Comment>Consented</Comment></Annotation><Annotation SeqNum="1"><Flag><FlagValue CodeListOID="MILESTONES">Randomized</FlagValue></Flag></Annotation></SubjectData>"#);
    }

    #[test]
    fn subject_rejects_remove() {
        let mut subject = SubjectData::new("SITE01", "001");
        subject.set_transaction_type(TransactionType::Update).unwrap();
        let err = subject
            .set_transaction_type(TransactionType::Remove)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(subject.transaction_type(), Some(TransactionType::Update));
    }

    #[test]
    fn invalid_transaction_string_leaves_state_unchanged() {
        let mut event = StudyEventData::new("VISIT1");
        let err = event.set_transaction_type_str("Merge").unwrap_err();
        assert_eq!(err.to_string(), "'Merge' is not a valid TransactionType");
        assert_eq!(event.transaction_type(), None);
    }
}
