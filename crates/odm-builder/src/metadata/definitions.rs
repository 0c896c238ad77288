//! Study event, form, item group and item definitions with their references.

use std::borrow::Cow;

use odm_model::{
    BoolStyle, ConfirmationStyle, ControlType, DataType, RangeCheckComparator, RangeCheckType,
    StudyEventType, TransactionType,
};

use crate::any::AnyElement;
use crate::clinical::MeasurementUnitRef;
use crate::element::{
    Attributes, Composite, Element, emit_all, emit_children, emit_opt, fill_slot,
};
use crate::error::Result;
use crate::metadata::{
    MdsolEntryRestriction, MdsolHelpText, MdsolLabelRef, MdsolReviewGroup, MdsolViewRestriction,
    TranslatedText,
};
use crate::sink::XmlSink;
use crate::transaction::{INSERT_ONLY, Transactional};

// =============================================================================
// STUDY EVENTS
// =============================================================================

/// `FormRef`: a form scheduled within a study event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRef {
    pub form_oid: String,
    pub order_number: u32,
    pub mandatory: bool,
}

impl FormRef {
    pub fn new(form_oid: impl Into<String>, order_number: u32, mandatory: bool) -> Self {
        Self {
            form_oid: form_oid.into(),
            order_number,
            mandatory,
        }
    }
}

impl Element for FormRef {
    const TAG: &'static str = "FormRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("FormOID", self.form_oid.as_str())
            .with("OrderNumber", self.order_number.to_string())
            .with_bool("Mandatory", self.mandatory, BoolStyle::YesNo)
    }
}

children! {
    /// Children accepted by [`StudyEventDef`].
    pub enum StudyEventDefChild for StudyEventDef {
        FormRef(FormRef),
    }
}

/// `StudyEventDef` with the mdsol visit window attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyEventDef {
    pub oid: String,
    pub name: String,
    pub repeating: bool,
    pub event_type: StudyEventType,
    pub category: Option<String>,
    pub access_days: Option<i32>,
    pub start_win_days: Option<i32>,
    pub target_days: Option<i32>,
    pub end_win_days: Option<i32>,
    pub overdue_days: Option<i32>,
    pub close_days: Option<i32>,
    form_refs: Vec<FormRef>,
}

impl StudyEventDef {
    pub fn new(
        oid: impl Into<String>,
        name: impl Into<String>,
        repeating: bool,
        event_type: StudyEventType,
    ) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            repeating,
            event_type,
            category: None,
            access_days: None,
            start_win_days: None,
            target_days: None,
            end_win_days: None,
            overdue_days: None,
            close_days: None,
            form_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the visit window, in days relative to the target day.
    #[must_use]
    pub fn with_window(mut self, start: i32, target: i32, end: i32) -> Self {
        self.start_win_days = Some(start);
        self.target_days = Some(target);
        self.end_win_days = Some(end);
        self
    }

    pub fn attach(&mut self, child: impl Into<StudyEventDefChild>) -> Result<&mut Self> {
        match StudyEventDefChild::traced(child.into()) {
            StudyEventDefChild::FormRef(node) => self.form_refs.push(node),
        }
        Ok(self)
    }

    pub fn form_refs(&self) -> &[FormRef] {
        &self.form_refs
    }
}

impl Element for StudyEventDef {
    const TAG: &'static str = "StudyEventDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with_bool("Repeating", self.repeating, BoolStyle::YesNo)
            .with("Type", self.event_type.as_str())
            .with_opt("Category", self.category.as_deref())
            .with_opt("mdsol:AccessDays", self.access_days)
            .with_opt("mdsol:StartWinDays", self.start_win_days)
            .with_opt("mdsol:TargetDays", self.target_days)
            .with_opt("mdsol:EndWinDays", self.end_win_days)
            .with_opt("mdsol:OverDueDays", self.overdue_days)
            .with_opt("mdsol:CloseDays", self.close_days)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.form_refs, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(StudyEventDefChild::try_from(child)?)
            .map(|_| ())
    }
}

// =============================================================================
// FORMS
// =============================================================================

/// `ItemGroupRef`: an item group placed on a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGroupRef {
    pub item_group_oid: String,
    pub order_number: Option<u32>,
    pub mandatory: bool,
}

impl ItemGroupRef {
    pub fn new(item_group_oid: impl Into<String>, order_number: Option<u32>, mandatory: bool) -> Self {
        Self {
            item_group_oid: item_group_oid.into(),
            order_number,
            mandatory,
        }
    }
}

impl Element for ItemGroupRef {
    const TAG: &'static str = "ItemGroupRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("ItemGroupOID", self.item_group_oid.as_str())
            .with_opt("OrderNumber", self.order_number)
            .with_bool("Mandatory", self.mandatory, BoolStyle::YesNo)
    }
}

children! {
    /// Children accepted by [`FormDef`].
    pub enum FormDefChild for FormDef {
        ItemGroupRef(ItemGroupRef),
        MdsolHelpText(MdsolHelpText),
        MdsolViewRestriction(MdsolViewRestriction),
        MdsolEntryRestriction(MdsolEntryRestriction),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormDefSlot {
    ItemGroupRefs,
    HelpTexts,
    ViewRestrictions,
    EntryRestrictions,
}

/// `FormDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDef {
    pub oid: String,
    pub name: String,
    pub repeating: bool,
    pub order_number: Option<u32>,
    pub active: bool,
    pub template: bool,
    pub signature_required: bool,
    pub log_form: bool,
    pub confirmation_style: Option<ConfirmationStyle>,
    pub link_study_event_oid: Option<String>,
    pub link_form_oid: Option<String>,
    item_group_refs: Vec<ItemGroupRef>,
    help_texts: Vec<MdsolHelpText>,
    view_restrictions: Vec<MdsolViewRestriction>,
    entry_restrictions: Vec<MdsolEntryRestriction>,
}

impl FormDef {
    /// A non-repeating, active form.
    pub fn new(oid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            repeating: false,
            order_number: None,
            active: true,
            template: false,
            signature_required: false,
            log_form: false,
            confirmation_style: None,
            link_study_event_oid: None,
            link_form_oid: None,
            item_group_refs: Vec::new(),
            help_texts: Vec::new(),
            view_restrictions: Vec::new(),
            entry_restrictions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repeating(mut self, repeating: bool) -> Self {
        self.repeating = repeating;
        self
    }

    #[must_use]
    pub fn with_order_number(mut self, order_number: u32) -> Self {
        self.order_number = Some(order_number);
        self
    }

    #[must_use]
    pub fn with_log_form(mut self, log_form: bool) -> Self {
        self.log_form = log_form;
        self
    }

    #[must_use]
    pub fn with_confirmation_style(mut self, style: ConfirmationStyle) -> Self {
        self.confirmation_style = Some(style);
        self
    }

    /// Links the form to another form, typically with
    /// [`ConfirmationStyle::LinkCustom`].
    #[must_use]
    pub fn with_link(
        mut self,
        study_event_oid: impl Into<String>,
        form_oid: impl Into<String>,
    ) -> Self {
        self.link_study_event_oid = Some(study_event_oid.into());
        self.link_form_oid = Some(form_oid.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<FormDefChild>) -> Result<&mut Self> {
        match FormDefChild::traced(child.into()) {
            FormDefChild::ItemGroupRef(node) => self.item_group_refs.push(node),
            FormDefChild::MdsolHelpText(node) => self.help_texts.push(node),
            FormDefChild::MdsolViewRestriction(node) => self.view_restrictions.push(node),
            FormDefChild::MdsolEntryRestriction(node) => self.entry_restrictions.push(node),
        }
        Ok(self)
    }

    pub fn item_group_refs(&self) -> &[ItemGroupRef] {
        &self.item_group_refs
    }
}

impl Element for FormDef {
    const TAG: &'static str = "FormDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with_bool("Repeating", self.repeating, BoolStyle::YesNo)
            .with_opt("mdsol:OrderNumber", self.order_number)
            .with_bool("mdsol:Active", self.active, BoolStyle::YesNo)
            .with_bool("mdsol:Template", self.template, BoolStyle::YesNo)
            .with_bool(
                "mdsol:SignatureRequired",
                self.signature_required,
                BoolStyle::YesNo,
            )
            .with_bool("mdsol:LogForm", self.log_form, BoolStyle::YesNo)
            .with_opt("mdsol:ConfirmationStyle", self.confirmation_style)
            .with_opt(
                "mdsol:LinkStudyEventOID",
                self.link_study_event_oid.as_deref(),
            )
            .with_opt("mdsol:LinkFormOID", self.link_form_oid.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(FormDefChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for FormDef {
    type Slot = FormDefSlot;

    const ORDER: &'static [FormDefSlot] = &[
        FormDefSlot::ItemGroupRefs,
        FormDefSlot::HelpTexts,
        FormDefSlot::ViewRestrictions,
        FormDefSlot::EntryRestrictions,
    ];

    fn emit(&self, slot: FormDefSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            FormDefSlot::ItemGroupRefs => emit_all(&self.item_group_refs, sink),
            FormDefSlot::HelpTexts => emit_all(&self.help_texts, sink),
            FormDefSlot::ViewRestrictions => emit_all(&self.view_restrictions, sink),
            FormDefSlot::EntryRestrictions => emit_all(&self.entry_restrictions, sink),
        }
    }
}

// =============================================================================
// ITEM GROUPS
// =============================================================================

/// `mdsol:Attribute`: a free-form attribute on an item reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolAttribute {
    pub namespace: String,
    pub name: String,
    pub value: String,
    transaction_type: Option<TransactionType>,
}

impl MdsolAttribute {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
            transaction_type: None,
        }
    }
}

impl Element for MdsolAttribute {
    const TAG: &'static str = "mdsol:Attribute";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("Namespace", self.namespace.as_str())
            .with("Name", self.name.as_str())
            .with("Value", self.value.as_str())
            .with_opt("TransactionType", self.transaction_type)
    }
}

impl Transactional for MdsolAttribute {
    const TRANSACTION_TYPES: &'static [TransactionType] = INSERT_ONLY;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

children! {
    /// Children accepted by [`ItemRef`].
    pub enum ItemRefChild for ItemRef {
        MdsolAttribute(MdsolAttribute),
    }
}

/// `ItemRef`: an item placed in an item group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub item_oid: String,
    pub order_number: Option<u32>,
    pub mandatory: bool,
    pub key_sequence: Option<u32>,
    pub imputation_method_oid: Option<String>,
    pub role: Option<String>,
    pub role_codelist_oid: Option<String>,
    mdsol_attributes: Vec<MdsolAttribute>,
}

impl ItemRef {
    pub fn new(item_oid: impl Into<String>, order_number: Option<u32>, mandatory: bool) -> Self {
        Self {
            item_oid: item_oid.into(),
            order_number,
            mandatory,
            key_sequence: None,
            imputation_method_oid: None,
            role: None,
            role_codelist_oid: None,
            mdsol_attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_key_sequence(mut self, key_sequence: u32) -> Self {
        self.key_sequence = Some(key_sequence);
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>, codelist_oid: Option<&str>) -> Self {
        self.role = Some(role.into());
        self.role_codelist_oid = codelist_oid.map(str::to_string);
        self
    }

    pub fn attach(&mut self, child: impl Into<ItemRefChild>) -> Result<&mut Self> {
        match ItemRefChild::traced(child.into()) {
            ItemRefChild::MdsolAttribute(node) => self.mdsol_attributes.push(node),
        }
        Ok(self)
    }
}

impl Element for ItemRef {
    const TAG: &'static str = "ItemRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("ItemOID", self.item_oid.as_str())
            .with_opt("OrderNumber", self.order_number)
            .with_bool("Mandatory", self.mandatory, BoolStyle::YesNo)
            .with_opt("KeySequence", self.key_sequence)
            .with_opt(
                "ImputationMethodOID",
                self.imputation_method_oid.as_deref(),
            )
            .with_opt("Role", self.role.as_deref())
            .with_opt("RoleCodeListOID", self.role_codelist_oid.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.mdsol_attributes, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ItemRefChild::try_from(child)?).map(|_| ())
    }
}

children! {
    /// Children accepted by [`ItemGroupDef`].
    pub enum ItemGroupDefChild for ItemGroupDef {
        ItemRef(ItemRef),
        MdsolLabelRef(MdsolLabelRef),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemGroupDefSlot {
    ItemRefs,
    LabelRefs,
}

/// `ItemGroupDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGroupDef {
    pub oid: String,
    pub name: String,
    pub repeating: bool,
    pub is_reference_data: Option<bool>,
    pub sas_dataset_name: Option<String>,
    pub domain: Option<String>,
    pub origin: Option<String>,
    pub role: Option<String>,
    pub purpose: Option<String>,
    pub comment: Option<String>,
    item_refs: Vec<ItemRef>,
    label_refs: Vec<MdsolLabelRef>,
}

impl ItemGroupDef {
    pub fn new(oid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            repeating: false,
            is_reference_data: None,
            sas_dataset_name: None,
            domain: None,
            origin: None,
            role: None,
            purpose: None,
            comment: None,
            item_refs: Vec::new(),
            label_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repeating(mut self, repeating: bool) -> Self {
        self.repeating = repeating;
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_sas_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.sas_dataset_name = Some(name.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<ItemGroupDefChild>) -> Result<&mut Self> {
        match ItemGroupDefChild::traced(child.into()) {
            ItemGroupDefChild::ItemRef(node) => self.item_refs.push(node),
            ItemGroupDefChild::MdsolLabelRef(node) => self.label_refs.push(node),
        }
        Ok(self)
    }

    pub fn item_refs(&self) -> &[ItemRef] {
        &self.item_refs
    }
}

impl Element for ItemGroupDef {
    const TAG: &'static str = "ItemGroupDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with_bool("Repeating", self.repeating, BoolStyle::YesNo)
            .with_opt_bool("IsReferenceData", self.is_reference_data, BoolStyle::YesNo)
            .with_opt("SASDatasetName", self.sas_dataset_name.as_deref())
            .with_opt("Domain", self.domain.as_deref())
            .with_opt("Origin", self.origin.as_deref())
            .with_opt("Role", self.role.as_deref())
            .with_opt("Purpose", self.purpose.as_deref())
            .with_opt("Comment", self.comment.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ItemGroupDefChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for ItemGroupDef {
    type Slot = ItemGroupDefSlot;

    const ORDER: &'static [ItemGroupDefSlot] =
        &[ItemGroupDefSlot::ItemRefs, ItemGroupDefSlot::LabelRefs];

    fn emit(&self, slot: ItemGroupDefSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            ItemGroupDefSlot::ItemRefs => emit_all(&self.item_refs, sink),
            ItemGroupDefSlot::LabelRefs => emit_all(&self.label_refs, sink),
        }
    }
}

// =============================================================================
// ITEMS
// =============================================================================

children! {
    /// Children accepted by [`Question`].
    pub enum QuestionChild for Question {
        TranslatedText(TranslatedText),
    }
}

/// `Question`: the prompt shown for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Question {
    translations: Vec<TranslatedText>,
}

impl Question {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, child: impl Into<QuestionChild>) -> Result<&mut Self> {
        match QuestionChild::traced(child.into()) {
            QuestionChild::TranslatedText(node) => self.translations.push(node),
        }
        Ok(self)
    }
}

impl Element for Question {
    const TAG: &'static str = "Question";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.translations, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(QuestionChild::try_from(child)?).map(|_| ())
    }
}

/// `CodeListRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListRef {
    pub codelist_oid: String,
}

impl CodeListRef {
    pub fn new(codelist_oid: impl Into<String>) -> Self {
        Self {
            codelist_oid: codelist_oid.into(),
        }
    }
}

impl Element for CodeListRef {
    const TAG: &'static str = "CodeListRef";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("CodeListOID", self.codelist_oid.as_str())
    }
}

/// `Alias`: a name for the parent in another context, e.g. `SDTM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub context: String,
    pub name: String,
}

impl Alias {
    pub fn new(context: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            name: name.into(),
        }
    }
}

impl Element for Alias {
    const TAG: &'static str = "Alias";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("Context", self.context.as_str())
            .with("Name", self.name.as_str())
    }
}

/// `CheckValue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckValue {
    pub value: String,
}

impl CheckValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Element for CheckValue {
    const TAG: &'static str = "CheckValue";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.value))
    }
}

children! {
    /// Children accepted by [`RangeCheck`].
    pub enum RangeCheckChild for RangeCheck {
        CheckValue(CheckValue),
        MeasurementUnitRef(MeasurementUnitRef),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheckSlot {
    CheckValue,
    MeasurementUnitRef,
}

/// `RangeCheck`: a soft or hard bound on an item value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCheck {
    pub comparator: RangeCheckComparator,
    pub soft_hard: RangeCheckType,
    check_value: Option<CheckValue>,
    measurement_unit_ref: Option<MeasurementUnitRef>,
}

impl RangeCheck {
    pub fn new(comparator: RangeCheckComparator, soft_hard: RangeCheckType) -> Self {
        Self {
            comparator,
            soft_hard,
            check_value: None,
            measurement_unit_ref: None,
        }
    }

    pub fn attach(&mut self, child: impl Into<RangeCheckChild>) -> Result<&mut Self> {
        match RangeCheckChild::traced(child.into()) {
            RangeCheckChild::CheckValue(node) => fill_slot(Self::TAG, &mut self.check_value, node)?,
            RangeCheckChild::MeasurementUnitRef(node) => {
                fill_slot(Self::TAG, &mut self.measurement_unit_ref, node)?
            }
        }
        Ok(self)
    }
}

impl Element for RangeCheck {
    const TAG: &'static str = "RangeCheck";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("Comparator", self.comparator.as_str())
            .with("SoftHard", self.soft_hard.as_str())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(RangeCheckChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for RangeCheck {
    type Slot = RangeCheckSlot;

    const ORDER: &'static [RangeCheckSlot] =
        &[RangeCheckSlot::CheckValue, RangeCheckSlot::MeasurementUnitRef];

    fn emit(&self, slot: RangeCheckSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            RangeCheckSlot::CheckValue => emit_opt(self.check_value.as_ref(), sink),
            RangeCheckSlot::MeasurementUnitRef => {
                emit_opt(self.measurement_unit_ref.as_ref(), sink)
            }
        }
    }
}

children! {
    /// Children accepted by [`ItemDef`].
    pub enum ItemDefChild for ItemDef {
        Question(Question),
        MeasurementUnitRef(MeasurementUnitRef),
        RangeCheck(RangeCheck),
        CodeListRef(CodeListRef),
        Alias(Alias),
        MdsolHelpText(MdsolHelpText),
        MdsolViewRestriction(MdsolViewRestriction),
        MdsolEntryRestriction(MdsolEntryRestriction),
        MdsolReviewGroup(MdsolReviewGroup),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDefSlot {
    Question,
    MeasurementUnitRefs,
    RangeChecks,
    CodeListRef,
    Aliases,
    HelpTexts,
    ViewRestrictions,
    EntryRestrictions,
    ReviewGroups,
}

/// `ItemDef`: a data field, with the mdsol field presentation attributes.
///
/// Boolean presentation flags are always written; only `visible` defaults to
/// true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDef {
    pub oid: String,
    pub name: String,
    pub data_type: DataType,
    pub length: Option<u32>,
    pub significant_digits: Option<u32>,
    pub sas_field_name: Option<String>,
    pub sds_var_name: Option<String>,
    pub origin: Option<String>,
    pub comment: Option<String>,
    pub control_type: Option<ControlType>,
    pub acceptable_file_extensions: Option<String>,
    pub indent_level: u32,
    pub source_document_verify: bool,
    pub default_value: Option<String>,
    pub sas_format: Option<String>,
    pub sas_label: Option<String>,
    pub query_future_date: bool,
    pub visible: bool,
    pub translation_required: bool,
    pub query_non_conformance: bool,
    pub other_visits: bool,
    pub can_set_item_group_date: bool,
    pub can_set_form_date: bool,
    pub can_set_study_event_date: bool,
    pub can_set_subject_date: bool,
    pub visual_verify: bool,
    pub does_not_break_signature: bool,
    pub date_time_format: Option<String>,
    pub field_number: Option<String>,
    pub variable_oid: Option<String>,
    question: Option<Question>,
    measurement_unit_refs: Vec<MeasurementUnitRef>,
    range_checks: Vec<RangeCheck>,
    codelist_ref: Option<CodeListRef>,
    aliases: Vec<Alias>,
    help_texts: Vec<MdsolHelpText>,
    view_restrictions: Vec<MdsolViewRestriction>,
    entry_restrictions: Vec<MdsolEntryRestriction>,
    review_groups: Vec<MdsolReviewGroup>,
}

impl ItemDef {
    pub fn new(oid: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            data_type,
            length: None,
            significant_digits: None,
            sas_field_name: None,
            sds_var_name: None,
            origin: None,
            comment: None,
            control_type: None,
            acceptable_file_extensions: None,
            indent_level: 0,
            source_document_verify: false,
            default_value: None,
            sas_format: None,
            sas_label: None,
            query_future_date: false,
            visible: true,
            translation_required: false,
            query_non_conformance: false,
            other_visits: false,
            can_set_item_group_date: false,
            can_set_form_date: false,
            can_set_study_event_date: false,
            can_set_subject_date: false,
            visual_verify: false,
            does_not_break_signature: false,
            date_time_format: None,
            field_number: None,
            variable_oid: None,
            question: None,
            measurement_unit_refs: Vec::new(),
            range_checks: Vec::new(),
            codelist_ref: None,
            aliases: Vec::new(),
            help_texts: Vec::new(),
            view_restrictions: Vec::new(),
            entry_restrictions: Vec::new(),
            review_groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = Some(control_type);
        self
    }

    #[must_use]
    pub fn with_sas_field_name(mut self, name: impl Into<String>) -> Self {
        self.sas_field_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = Some(format.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<ItemDefChild>) -> Result<&mut Self> {
        match ItemDefChild::traced(child.into()) {
            ItemDefChild::Question(node) => fill_slot(Self::TAG, &mut self.question, node)?,
            ItemDefChild::MeasurementUnitRef(node) => self.measurement_unit_refs.push(node),
            ItemDefChild::RangeCheck(node) => self.range_checks.push(node),
            ItemDefChild::CodeListRef(node) => fill_slot(Self::TAG, &mut self.codelist_ref, node)?,
            ItemDefChild::Alias(node) => self.aliases.push(node),
            ItemDefChild::MdsolHelpText(node) => self.help_texts.push(node),
            ItemDefChild::MdsolViewRestriction(node) => self.view_restrictions.push(node),
            ItemDefChild::MdsolEntryRestriction(node) => self.entry_restrictions.push(node),
            ItemDefChild::MdsolReviewGroup(node) => self.review_groups.push(node),
        }
        Ok(self)
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn codelist_ref(&self) -> Option<&CodeListRef> {
        self.codelist_ref.as_ref()
    }

    pub fn range_checks(&self) -> &[RangeCheck] {
        &self.range_checks
    }
}

impl Element for ItemDef {
    const TAG: &'static str = "ItemDef";

    fn attributes(&self) -> Attributes {
        let yes_no = BoolStyle::YesNo;
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with("DataType", self.data_type.as_str())
            .with_opt("Length", self.length)
            .with_opt("SignificantDigits", self.significant_digits)
            .with_opt("SASFieldName", self.sas_field_name.as_deref())
            .with_opt("SDSVarName", self.sds_var_name.as_deref())
            .with_opt("Origin", self.origin.as_deref())
            .with_opt("Comment", self.comment.as_deref())
            .with_opt("mdsol:ControlType", self.control_type)
            .with_opt(
                "mdsol:AcceptableFileExtensions",
                self.acceptable_file_extensions.as_deref(),
            )
            .with("mdsol:IndentLevel", self.indent_level.to_string())
            .with_bool("mdsol:SourceDocument", self.source_document_verify, yes_no)
            .with_opt("mdsol:DefaultValue", self.default_value.as_deref())
            .with_opt("mdsol:SASFormat", self.sas_format.as_deref())
            .with_opt("mdsol:SASLabel", self.sas_label.as_deref())
            .with_bool("mdsol:QueryFutureDate", self.query_future_date, yes_no)
            .with_bool("mdsol:Visible", self.visible, yes_no)
            .with_bool("mdsol:TranslationRequired", self.translation_required, yes_no)
            .with_bool("mdsol:QueryNonConformance", self.query_non_conformance, yes_no)
            .with_bool("mdsol:OtherVisits", self.other_visits, yes_no)
            .with_bool("mdsol:CanSetItemGroupDate", self.can_set_item_group_date, yes_no)
            .with_bool("mdsol:CanSetFormDate", self.can_set_form_date, yes_no)
            .with_bool("mdsol:CanSetStudyEventDate", self.can_set_study_event_date, yes_no)
            .with_bool("mdsol:CanSetSubjectDate", self.can_set_subject_date, yes_no)
            .with_bool("mdsol:VisualVerify", self.visual_verify, yes_no)
            .with_bool("mdsol:DoesNotBreakSignature", self.does_not_break_signature, yes_no)
            .with_opt("mdsol:DateTimeFormat", self.date_time_format.as_deref())
            .with_opt("mdsol:FieldNumber", self.field_number.as_deref())
            .with_opt("mdsol:VariableOID", self.variable_oid.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ItemDefChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for ItemDef {
    type Slot = ItemDefSlot;

    const ORDER: &'static [ItemDefSlot] = &[
        ItemDefSlot::Question,
        ItemDefSlot::MeasurementUnitRefs,
        ItemDefSlot::RangeChecks,
        ItemDefSlot::CodeListRef,
        ItemDefSlot::Aliases,
        ItemDefSlot::HelpTexts,
        ItemDefSlot::ViewRestrictions,
        ItemDefSlot::EntryRestrictions,
        ItemDefSlot::ReviewGroups,
    ];

    fn emit(&self, slot: ItemDefSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            ItemDefSlot::Question => emit_opt(self.question.as_ref(), sink),
            ItemDefSlot::MeasurementUnitRefs => emit_all(&self.measurement_unit_refs, sink),
            ItemDefSlot::RangeChecks => emit_all(&self.range_checks, sink),
            ItemDefSlot::CodeListRef => emit_opt(self.codelist_ref.as_ref(), sink),
            ItemDefSlot::Aliases => emit_all(&self.aliases, sink),
            ItemDefSlot::HelpTexts => emit_all(&self.help_texts, sink),
            ItemDefSlot::ViewRestrictions => emit_all(&self.view_restrictions, sink),
            ItemDefSlot::EntryRestrictions => emit_all(&self.entry_restrictions, sink),
            ItemDefSlot::ReviewGroups => emit_all(&self.review_groups, sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{EventLog, to_xml_string};

    #[test]
    fn study_event_def_renders_yes_no_and_type() {
        let mut event = StudyEventDef::new("VISIT1", "Visit 1", true, StudyEventType::Scheduled);
        event.attach(FormRef::new("DM", 1, true)).unwrap();
        assert_eq!(
            to_xml_string(&event).unwrap(),
            r#"<StudyEventDef OID="VISIT1" Name="Visit 1" Repeating="Yes" Type="Scheduled"><FormRef FormOID="DM" OrderNumber="1" Mandatory="Yes" /></StudyEventDef>"#
        );
    }

    #[test]
    fn form_def_defaults() {
        let form = FormDef::new("DM", "Demography")
            .with_order_number(1)
            .with_confirmation_style(ConfirmationStyle::NotLink);
        insta::assert_snapshot!(to_xml_string(&form).unwrap(), @r#"<FormDef OID="DM" Name="Demography" Repeating="No" mdsol:OrderNumber="1" mdsol:Active="Yes" mdsol:Template="No" mdsol:SignatureRequired="No" mdsol:LogForm="No" mdsol:ConfirmationStyle="NotLink" />"#);
    }

    #[test]
    fn item_ref_carries_insert_only_attributes() {
        let mut attribute = MdsolAttribute::new("NS", "Key", "Value");
        attribute.set_transaction_type(TransactionType::Insert).unwrap();
        assert!(attribute.set_transaction_type(TransactionType::Remove).is_err());

        let mut item_ref = ItemRef::new("AGE", Some(2), false).with_key_sequence(1);
        item_ref.attach(attribute).unwrap();
        assert_eq!(
            to_xml_string(&item_ref).unwrap(),
            r#"<ItemRef ItemOID="AGE" OrderNumber="2" Mandatory="No" KeySequence="1"><mdsol:Attribute Namespace="NS" Name="Key" Value="Value" TransactionType="Insert" /></ItemRef>"#
        );
    }

    #[test]
    fn item_def_children_follow_schema_order() {
        let mut question = Question::new();
        question.attach(TranslatedText::new("Age").with_lang("en")).unwrap();
        let mut range = RangeCheck::new(RangeCheckComparator::GreaterThanEqualTo, RangeCheckType::Soft);
        range.attach(CheckValue::new("18")).unwrap();

        let mut item = ItemDef::new("AGE", "Age", DataType::Integer)
            .with_length(3)
            .with_control_type(ControlType::Text);
        item.attach(MdsolReviewGroup::new("Monitor"))
            .unwrap()
            .attach(CodeListRef::new("CL1"))
            .unwrap()
            .attach(Alias::new("SDTM", "AGE"))
            .unwrap()
            .attach(range)
            .unwrap()
            .attach(question)
            .unwrap()
            .attach(MeasurementUnitRef::new("YEARS"))
            .unwrap();

        let mut log = EventLog::new();
        item.build(&mut log).unwrap();
        assert_eq!(
            log.start_tags(),
            vec![
                "ItemDef",
                "Question",
                "TranslatedText",
                "MeasurementUnitRef",
                "RangeCheck",
                "CheckValue",
                "CodeListRef",
                "Alias",
                "mdsol:ReviewGroup",
            ]
        );
        let attributes = log.attributes_of("ItemDef").unwrap();
        assert_eq!(attributes.get("mdsol:Visible"), Some("Yes"));
        assert_eq!(attributes.get("mdsol:IndentLevel"), Some("0"));
        assert_eq!(attributes.get("mdsol:ControlType"), Some("Text"));
        assert!(item.attach(CodeListRef::new("CL2")).is_err());
    }
}
