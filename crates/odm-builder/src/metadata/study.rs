//! `Study` and its study-wide definitions.

use std::borrow::Cow;

use odm_model::{BoolStyle, ProjectType};

use crate::any::AnyElement;
use crate::element::{
    Attributes, Composite, Element, emit_all, emit_children, emit_opt, emit_text, fill_slot,
};
use crate::error::Result;
use crate::metadata::MetaDataVersion;
use crate::sink::XmlSink;

/// `TranslatedText`: text in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    pub text: String,
    pub lang: Option<String>,
}

impl TranslatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: None,
        }
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Element for TranslatedText {
    const TAG: &'static str = "TranslatedText";

    fn attributes(&self) -> Attributes {
        Attributes::new().with_opt("xml:lang", self.lang.as_deref())
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.text))
    }
}

children! {
    /// Children accepted by [`Symbol`].
    pub enum SymbolChild for Symbol {
        TranslatedText(TranslatedText),
    }
}

/// `Symbol`: the printable form of a measurement unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbol {
    translations: Vec<TranslatedText>,
}

impl Symbol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, child: impl Into<SymbolChild>) -> Result<&mut Self> {
        match SymbolChild::traced(child.into()) {
            SymbolChild::TranslatedText(node) => self.translations.push(node),
        }
        Ok(self)
    }

    pub fn translations(&self) -> &[TranslatedText] {
        &self.translations
    }
}

impl Element for Symbol {
    const TAG: &'static str = "Symbol";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.translations, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(SymbolChild::try_from(child)?).map(|_| ())
    }
}

children! {
    /// Children accepted by [`MeasurementUnit`].
    pub enum MeasurementUnitChild for MeasurementUnit {
        Symbol(Symbol),
    }
}

/// `MeasurementUnit` with the mdsol unit conversion constants.
///
/// The constants default to A=1, B=1, C=0, K=0.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementUnit {
    pub oid: String,
    pub name: String,
    pub constant_a: f64,
    pub constant_b: f64,
    pub constant_c: f64,
    pub constant_k: f64,
    pub standard_unit: bool,
    pub unit_dictionary_name: Option<String>,
    symbol: Option<Symbol>,
}

impl MeasurementUnit {
    pub fn new(oid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            constant_a: 1.0,
            constant_b: 1.0,
            constant_c: 0.0,
            constant_k: 0.0,
            standard_unit: false,
            unit_dictionary_name: None,
            symbol: None,
        }
    }

    #[must_use]
    pub fn with_constants(mut self, a: f64, b: f64, c: f64, k: f64) -> Self {
        self.constant_a = a;
        self.constant_b = b;
        self.constant_c = c;
        self.constant_k = k;
        self
    }

    #[must_use]
    pub fn with_standard_unit(mut self, standard_unit: bool) -> Self {
        self.standard_unit = standard_unit;
        self
    }

    #[must_use]
    pub fn with_unit_dictionary_name(mut self, name: impl Into<String>) -> Self {
        self.unit_dictionary_name = Some(name.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<MeasurementUnitChild>) -> Result<&mut Self> {
        match MeasurementUnitChild::traced(child.into()) {
            MeasurementUnitChild::Symbol(node) => fill_slot(Self::TAG, &mut self.symbol, node)?,
        }
        Ok(self)
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }
}

impl Element for MeasurementUnit {
    const TAG: &'static str = "MeasurementUnit";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with("mdsol:ConstantA", self.constant_a.to_string())
            .with("mdsol:ConstantB", self.constant_b.to_string())
            .with("mdsol:ConstantC", self.constant_c.to_string())
            .with("mdsol:ConstantK", self.constant_k.to_string())
            .with_bool("mdsol:StandardUnit", self.standard_unit, BoolStyle::YesNo)
            .with_opt(
                "mdsol:UnitDictionaryName",
                self.unit_dictionary_name.as_deref(),
            )
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_opt(self.symbol.as_ref(), sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(MeasurementUnitChild::try_from(child)?)
            .map(|_| ())
    }
}

children! {
    /// Children accepted by [`BasicDefinitions`].
    pub enum BasicDefinitionsChild for BasicDefinitions {
        MeasurementUnit(MeasurementUnit),
    }
}

/// `BasicDefinitions`: the study's measurement units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicDefinitions {
    measurement_units: Vec<MeasurementUnit>,
}

impl BasicDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, child: impl Into<BasicDefinitionsChild>) -> Result<&mut Self> {
        match BasicDefinitionsChild::traced(child.into()) {
            BasicDefinitionsChild::MeasurementUnit(node) => self.measurement_units.push(node),
        }
        Ok(self)
    }

    pub fn measurement_units(&self) -> &[MeasurementUnit] {
        &self.measurement_units
    }
}

impl Element for BasicDefinitions {
    const TAG: &'static str = "BasicDefinitions";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.measurement_units, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(BasicDefinitionsChild::try_from(child)?)
            .map(|_| ())
    }
}

/// `GlobalVariables`: study and protocol names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalVariables {
    pub study_name: String,
    pub study_description: String,
    pub protocol_name: String,
}

impl GlobalVariables {
    /// Study name defaults to the protocol name, description to empty.
    pub fn new(protocol_name: impl Into<String>) -> Self {
        let protocol_name = protocol_name.into();
        Self {
            study_name: protocol_name.clone(),
            study_description: String::new(),
            protocol_name,
        }
    }

    #[must_use]
    pub fn with_study_name(mut self, study_name: impl Into<String>) -> Self {
        self.study_name = study_name.into();
        self
    }

    #[must_use]
    pub fn with_study_description(mut self, description: impl Into<String>) -> Self {
        self.study_description = description.into();
        self
    }
}

impl Element for GlobalVariables {
    const TAG: &'static str = "GlobalVariables";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_text(sink, "StudyName", &self.study_name)?;
        emit_text(sink, "StudyDescription", &self.study_description)?;
        emit_text(sink, "ProtocolName", &self.protocol_name)
    }
}

children! {
    /// Children accepted by [`Study`].
    pub enum StudyChild for Study {
        GlobalVariables(GlobalVariables),
        BasicDefinitions(BasicDefinitions),
        MetaDataVersion(MetaDataVersion),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudySlot {
    GlobalVariables,
    BasicDefinitions,
    MetaDataVersion,
}

/// `Study`: the metadata root.
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    pub oid: String,
    pub project_type: Option<ProjectType>,
    global_variables: Option<GlobalVariables>,
    basic_definitions: Option<BasicDefinitions>,
    metadata_version: Option<MetaDataVersion>,
}

impl Study {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            project_type: None,
            global_variables: None,
            basic_definitions: None,
            metadata_version: None,
        }
    }

    #[must_use]
    pub fn with_project_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = Some(project_type);
        self
    }

    pub fn attach(&mut self, child: impl Into<StudyChild>) -> Result<&mut Self> {
        match StudyChild::traced(child.into()) {
            StudyChild::GlobalVariables(node) => {
                fill_slot(Self::TAG, &mut self.global_variables, node)?
            }
            StudyChild::BasicDefinitions(node) => {
                fill_slot(Self::TAG, &mut self.basic_definitions, node)?
            }
            StudyChild::MetaDataVersion(node) => {
                fill_slot(Self::TAG, &mut self.metadata_version, node)?
            }
        }
        Ok(self)
    }

    pub fn global_variables(&self) -> Option<&GlobalVariables> {
        self.global_variables.as_ref()
    }

    pub fn basic_definitions(&self) -> Option<&BasicDefinitions> {
        self.basic_definitions.as_ref()
    }

    pub fn metadata_version(&self) -> Option<&MetaDataVersion> {
        self.metadata_version.as_ref()
    }

    pub fn metadata_version_mut(&mut self) -> Option<&mut MetaDataVersion> {
        self.metadata_version.as_mut()
    }
}

impl Element for Study {
    const TAG: &'static str = "Study";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with_opt("mdsol:ProjectType", self.project_type)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(StudyChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for Study {
    type Slot = StudySlot;

    const ORDER: &'static [StudySlot] = &[
        StudySlot::GlobalVariables,
        StudySlot::BasicDefinitions,
        StudySlot::MetaDataVersion,
    ];

    fn emit(&self, slot: StudySlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            StudySlot::GlobalVariables => emit_opt(self.global_variables.as_ref(), sink),
            StudySlot::BasicDefinitions => emit_opt(self.basic_definitions.as_ref(), sink),
            StudySlot::MetaDataVersion => emit_opt(self.metadata_version.as_ref(), sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::to_xml_string;

    #[test]
    fn global_variables_default_study_name() {
        let globals = GlobalVariables::new("Mediflex");
        assert_eq!(
            to_xml_string(&globals).unwrap(),
            "<GlobalVariables><StudyName>Mediflex</StudyName><StudyDescription />\
             <ProtocolName>Mediflex</ProtocolName></GlobalVariables>"
        );
    }

    #[test]
    fn measurement_unit_writes_identity_constants() {
        let mut symbol = Symbol::new();
        symbol.attach(TranslatedText::new("kg").with_lang("en")).unwrap();
        let mut unit = MeasurementUnit::new("MU.KG", "kg").with_standard_unit(true);
        unit.attach(symbol).unwrap();

        insta::assert_snapshot!(to_xml_string(&unit).unwrap(), @r#"<MeasurementUnit OID="MU.KG" Name="kg" mdsol:ConstantA="1" mdsol:ConstantB="1" mdsol:ConstantC="0" mdsol:ConstantK="0" mdsol:StandardUnit="Yes"><Symbol><TranslatedText xml:lang="en">kg</TranslatedText></Symbol></MeasurementUnit>"#);
    }

    #[test]
    fn study_orders_sections() {
        let mut study = Study::new("Mediflex").with_project_type(ProjectType::Project);
        study.attach(BasicDefinitions::new()).unwrap();
        study.attach(GlobalVariables::new("Mediflex")).unwrap();
        let xml = to_xml_string(&study).unwrap();
        assert!(xml.starts_with(r#"<Study OID="Mediflex" mdsol:ProjectType="Project"><GlobalVariables>"#));
        assert!(xml.ends_with("<BasicDefinitions /></Study>"));
        assert!(study.attach(GlobalVariables::new("Other")).is_err());
    }
}
