//! `MetaDataVersion` and its protocol.

use odm_model::BoolStyle;

use crate::any::AnyElement;
use crate::element::{Attributes, Composite, Element, emit_all, emit_children, emit_opt, fill_slot};
use crate::error::Result;
use crate::metadata::{
    CodeList, FormDef, ItemDef, ItemGroupDef, MdsolConfirmationMessage, MdsolCustomFunctionDef,
    MdsolDerivationDef, MdsolEditCheckDef, MdsolLabelDef, StudyEventDef,
};
use crate::sink::XmlSink;

/// `StudyEventRef`: a study event scheduled by the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyEventRef {
    pub study_event_oid: String,
    pub order_number: u32,
    pub mandatory: bool,
}

impl StudyEventRef {
    pub fn new(study_event_oid: impl Into<String>, order_number: u32, mandatory: bool) -> Self {
        Self {
            study_event_oid: study_event_oid.into(),
            order_number,
            mandatory,
        }
    }
}

impl Element for StudyEventRef {
    const TAG: &'static str = "StudyEventRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("StudyEventOID", self.study_event_oid.as_str())
            .with("OrderNumber", self.order_number.to_string())
            .with_bool("Mandatory", self.mandatory, BoolStyle::YesNo)
    }
}

children! {
    /// Children accepted by [`Protocol`].
    pub enum ProtocolChild for Protocol {
        StudyEventRef(StudyEventRef),
    }
}

/// `Protocol`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protocol {
    study_event_refs: Vec<StudyEventRef>,
}

impl Protocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, child: impl Into<ProtocolChild>) -> Result<&mut Self> {
        match ProtocolChild::traced(child.into()) {
            ProtocolChild::StudyEventRef(node) => self.study_event_refs.push(node),
        }
        Ok(self)
    }

    pub fn study_event_refs(&self) -> &[StudyEventRef] {
        &self.study_event_refs
    }
}

impl Element for Protocol {
    const TAG: &'static str = "Protocol";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.study_event_refs, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(ProtocolChild::try_from(child)?).map(|_| ())
    }
}

children! {
    /// Children accepted by [`MetaDataVersion`].
    pub enum MetaDataVersionChild for MetaDataVersion {
        Protocol(Protocol),
        StudyEventDef(StudyEventDef),
        FormDef(FormDef),
        ItemGroupDef(ItemGroupDef),
        ItemDef(ItemDef),
        CodeList(CodeList),
        MdsolConfirmationMessage(MdsolConfirmationMessage),
        MdsolLabelDef(MdsolLabelDef),
        MdsolEditCheckDef(MdsolEditCheckDef),
        MdsolDerivationDef(MdsolDerivationDef),
        MdsolCustomFunctionDef(MdsolCustomFunctionDef),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaDataVersionSlot {
    Protocol,
    StudyEventDefs,
    FormDefs,
    ItemGroupDefs,
    ItemDefs,
    CodeLists,
    ConfirmationMessage,
    LabelDefs,
    EditCheckDefs,
    DerivationDefs,
    CustomFunctionDefs,
}

impl MetaDataVersionSlot {
    /// Whether the slot holds vendor extension elements.
    pub fn is_extension(self) -> bool {
        matches!(
            self,
            Self::ConfirmationMessage
                | Self::LabelDefs
                | Self::EditCheckDefs
                | Self::DerivationDefs
                | Self::CustomFunctionDefs
        )
    }
}

/// `MetaDataVersion`: the full design of one study build.
///
/// Core ODM definitions are always written before the mdsol extension
/// definitions, whatever order they were attached in.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaDataVersion {
    pub oid: String,
    pub name: String,
    pub description: Option<String>,
    pub primary_form_oid: Option<String>,
    pub default_matrix_oid: Option<String>,
    pub delete_existing: Option<bool>,
    pub signature_prompt: Option<String>,
    protocol: Option<Protocol>,
    study_event_defs: Vec<StudyEventDef>,
    form_defs: Vec<FormDef>,
    item_group_defs: Vec<ItemGroupDef>,
    item_defs: Vec<ItemDef>,
    codelists: Vec<CodeList>,
    confirmation_message: Option<MdsolConfirmationMessage>,
    label_defs: Vec<MdsolLabelDef>,
    edit_check_defs: Vec<MdsolEditCheckDef>,
    derivation_defs: Vec<MdsolDerivationDef>,
    custom_function_defs: Vec<MdsolCustomFunctionDef>,
}

impl MetaDataVersion {
    pub fn new(oid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            description: None,
            primary_form_oid: None,
            default_matrix_oid: None,
            delete_existing: None,
            signature_prompt: None,
            protocol: None,
            study_event_defs: Vec::new(),
            form_defs: Vec::new(),
            item_group_defs: Vec::new(),
            item_defs: Vec::new(),
            codelists: Vec::new(),
            confirmation_message: None,
            label_defs: Vec::new(),
            edit_check_defs: Vec::new(),
            derivation_defs: Vec::new(),
            custom_function_defs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_primary_form_oid(mut self, oid: impl Into<String>) -> Self {
        self.primary_form_oid = Some(oid.into());
        self
    }

    #[must_use]
    pub fn with_default_matrix_oid(mut self, oid: impl Into<String>) -> Self {
        self.default_matrix_oid = Some(oid.into());
        self
    }

    #[must_use]
    pub fn with_delete_existing(mut self, delete_existing: bool) -> Self {
        self.delete_existing = Some(delete_existing);
        self
    }

    #[must_use]
    pub fn with_signature_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.signature_prompt = Some(prompt.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<MetaDataVersionChild>) -> Result<&mut Self> {
        match MetaDataVersionChild::traced(child.into()) {
            MetaDataVersionChild::Protocol(node) => fill_slot(Self::TAG, &mut self.protocol, node)?,
            MetaDataVersionChild::StudyEventDef(node) => self.study_event_defs.push(node),
            MetaDataVersionChild::FormDef(node) => self.form_defs.push(node),
            MetaDataVersionChild::ItemGroupDef(node) => self.item_group_defs.push(node),
            MetaDataVersionChild::ItemDef(node) => self.item_defs.push(node),
            MetaDataVersionChild::CodeList(node) => self.codelists.push(node),
            MetaDataVersionChild::MdsolConfirmationMessage(node) => {
                fill_slot(Self::TAG, &mut self.confirmation_message, node)?
            }
            MetaDataVersionChild::MdsolLabelDef(node) => self.label_defs.push(node),
            MetaDataVersionChild::MdsolEditCheckDef(node) => self.edit_check_defs.push(node),
            MetaDataVersionChild::MdsolDerivationDef(node) => self.derivation_defs.push(node),
            MetaDataVersionChild::MdsolCustomFunctionDef(node) => {
                self.custom_function_defs.push(node)
            }
        }
        Ok(self)
    }

    pub fn protocol(&self) -> Option<&Protocol> {
        self.protocol.as_ref()
    }

    pub fn form_defs(&self) -> &[FormDef] {
        &self.form_defs
    }

    pub fn item_defs(&self) -> &[ItemDef] {
        &self.item_defs
    }

    pub fn codelists(&self) -> &[CodeList] {
        &self.codelists
    }

    pub fn edit_check_defs(&self) -> &[MdsolEditCheckDef] {
        &self.edit_check_defs
    }
}

impl Element for MetaDataVersion {
    const TAG: &'static str = "MetaDataVersion";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with_opt("Description", self.description.as_deref())
            .with_opt("mdsol:PrimaryFormOID", self.primary_form_oid.as_deref())
            .with_opt("mdsol:DefaultMatrixOID", self.default_matrix_oid.as_deref())
            .with_opt_bool("mdsol:DeleteExisting", self.delete_existing, BoolStyle::YesNo)
            .with_opt("mdsol:SignaturePrompt", self.signature_prompt.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(MetaDataVersionChild::try_from(child)?)
            .map(|_| ())
    }
}

impl Composite for MetaDataVersion {
    type Slot = MetaDataVersionSlot;

    const ORDER: &'static [MetaDataVersionSlot] = &[
        MetaDataVersionSlot::Protocol,
        MetaDataVersionSlot::StudyEventDefs,
        MetaDataVersionSlot::FormDefs,
        MetaDataVersionSlot::ItemGroupDefs,
        MetaDataVersionSlot::ItemDefs,
        MetaDataVersionSlot::CodeLists,
        MetaDataVersionSlot::ConfirmationMessage,
        MetaDataVersionSlot::LabelDefs,
        MetaDataVersionSlot::EditCheckDefs,
        MetaDataVersionSlot::DerivationDefs,
        MetaDataVersionSlot::CustomFunctionDefs,
    ];

    fn emit(&self, slot: MetaDataVersionSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            MetaDataVersionSlot::Protocol => emit_opt(self.protocol.as_ref(), sink),
            MetaDataVersionSlot::StudyEventDefs => emit_all(&self.study_event_defs, sink),
            MetaDataVersionSlot::FormDefs => emit_all(&self.form_defs, sink),
            MetaDataVersionSlot::ItemGroupDefs => emit_all(&self.item_group_defs, sink),
            MetaDataVersionSlot::ItemDefs => emit_all(&self.item_defs, sink),
            MetaDataVersionSlot::CodeLists => emit_all(&self.codelists, sink),
            MetaDataVersionSlot::ConfirmationMessage => {
                emit_opt(self.confirmation_message.as_ref(), sink)
            }
            MetaDataVersionSlot::LabelDefs => emit_all(&self.label_defs, sink),
            MetaDataVersionSlot::EditCheckDefs => emit_all(&self.edit_check_defs, sink),
            MetaDataVersionSlot::DerivationDefs => emit_all(&self.derivation_defs, sink),
            MetaDataVersionSlot::CustomFunctionDefs => emit_all(&self.custom_function_defs, sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{EventLog, to_xml_string};
    use odm_model::{CodeListDataType, DataType};

    #[test]
    fn core_slots_precede_extension_slots() {
        let first_extension = MetaDataVersion::ORDER
            .iter()
            .position(|slot| slot.is_extension())
            .unwrap();
        assert!(
            MetaDataVersion::ORDER[first_extension..]
                .iter()
                .all(|slot| slot.is_extension())
        );
        assert_eq!(MetaDataVersion::ORDER.len(), 11);
    }

    #[test]
    fn extension_attached_first_is_still_written_last() {
        let mut mdv = MetaDataVersion::new("MDV1", "Draft 1");
        mdv.attach(MdsolLabelDef::new("LBL1", "Header"))
            .unwrap()
            .attach(MdsolCustomFunctionDef::new("CF1", "return true;"))
            .unwrap()
            .attach(FormDef::new("DM", "Demography"))
            .unwrap()
            .attach(ItemDef::new("AGE", "Age", DataType::Integer))
            .unwrap()
            .attach(CodeList::new("CL_SEX", "Sex", CodeListDataType::Text))
            .unwrap();

        let mut log = EventLog::new();
        mdv.build(&mut log).unwrap();
        let children: Vec<&str> = log.start_tags().into_iter().skip(1).collect();
        let form = children.iter().position(|tag| *tag == "FormDef").unwrap();
        let item = children.iter().position(|tag| *tag == "ItemDef").unwrap();
        let codelist = children.iter().position(|tag| *tag == "CodeList").unwrap();
        let label = children.iter().position(|tag| *tag == "mdsol:LabelDef").unwrap();
        let function = children
            .iter()
            .position(|tag| *tag == "mdsol:CustomFunctionDef")
            .unwrap();
        assert!(form < item && item < codelist);
        assert!(codelist < label && label < function);
    }

    #[test]
    fn protocol_is_singular_and_written_first() {
        let mut protocol = Protocol::new();
        protocol
            .attach(StudyEventRef::new("SCREENING", 1, true))
            .unwrap();

        let mut mdv = MetaDataVersion::new("MDV1", "Draft 1").with_delete_existing(false);
        mdv.attach(StudyEventDef::new(
            "SCREENING",
            "Screening",
            false,
            odm_model::StudyEventType::Scheduled,
        ))
        .unwrap()
        .attach(protocol)
        .unwrap();
        assert!(mdv.attach(Protocol::new()).is_err());

        let xml = to_xml_string(&mdv).unwrap();
        assert!(xml.starts_with(
            r#"<MetaDataVersion OID="MDV1" Name="Draft 1" mdsol:DeleteExisting="No"><Protocol><StudyEventRef StudyEventOID="SCREENING" OrderNumber="1" Mandatory="Yes" /></Protocol><StudyEventDef "#
        ));
    }
}
