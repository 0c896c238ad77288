//! mdsol metadata extensions: help text, role restrictions, labels,
//! confirmation messages and custom functions.

use std::borrow::Cow;

use odm_model::CustomFunctionLanguage;

use crate::any::AnyElement;
use crate::element::{Attributes, Composite, Element, emit_all, emit_children};
use crate::error::Result;
use crate::metadata::TranslatedText;
use crate::sink::XmlSink;

/// `mdsol:HelpText`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolHelpText {
    pub lang: String,
    pub text: String,
}

impl MdsolHelpText {
    pub fn new(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            text: text.into(),
        }
    }
}

impl Element for MdsolHelpText {
    const TAG: &'static str = "mdsol:HelpText";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("xml:lang", self.lang.as_str())
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.text))
    }
}

/// `mdsol:ViewRestriction`: a role that may not see the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolViewRestriction {
    pub role: String,
}

impl MdsolViewRestriction {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Element for MdsolViewRestriction {
    const TAG: &'static str = "mdsol:ViewRestriction";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.role))
    }
}

/// `mdsol:EntryRestriction`: a role that may not enter data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolEntryRestriction {
    pub role: String,
}

impl MdsolEntryRestriction {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Element for MdsolEntryRestriction {
    const TAG: &'static str = "mdsol:EntryRestriction";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.role))
    }
}

/// `mdsol:ReviewGroup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolReviewGroup {
    pub name: String,
}

impl MdsolReviewGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Element for MdsolReviewGroup {
    const TAG: &'static str = "mdsol:ReviewGroup";

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.name))
    }
}

/// `mdsol:ConfirmationMessage`: shown after a form is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolConfirmationMessage {
    pub message: String,
    pub lang: Option<String>,
}

impl MdsolConfirmationMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            lang: None,
        }
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Element for MdsolConfirmationMessage {
    const TAG: &'static str = "mdsol:ConfirmationMessage";

    fn attributes(&self) -> Attributes {
        Attributes::new().with_opt("xml:lang", self.lang.as_deref())
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.message))
    }
}

children! {
    /// Children accepted by [`MdsolLabelDef`].
    pub enum MdsolLabelDefChild for MdsolLabelDef {
        TranslatedText(TranslatedText),
        MdsolViewRestriction(MdsolViewRestriction),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdsolLabelDefSlot {
    TranslatedText,
    ViewRestrictions,
}

/// `mdsol:LabelDef`: a label shown between the fields of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolLabelDef {
    pub oid: String,
    pub name: String,
    pub field_number: Option<u32>,
    translations: Vec<TranslatedText>,
    view_restrictions: Vec<MdsolViewRestriction>,
}

impl MdsolLabelDef {
    pub fn new(oid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            field_number: None,
            translations: Vec::new(),
            view_restrictions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field_number(mut self, field_number: u32) -> Self {
        self.field_number = Some(field_number);
        self
    }

    pub fn attach(&mut self, child: impl Into<MdsolLabelDefChild>) -> Result<&mut Self> {
        match MdsolLabelDefChild::traced(child.into()) {
            MdsolLabelDefChild::TranslatedText(node) => self.translations.push(node),
            MdsolLabelDefChild::MdsolViewRestriction(node) => self.view_restrictions.push(node),
        }
        Ok(self)
    }
}

impl Element for MdsolLabelDef {
    const TAG: &'static str = "mdsol:LabelDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with_opt("FieldNumber", self.field_number)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(MdsolLabelDefChild::try_from(child)?)
            .map(|_| ())
    }
}

impl Composite for MdsolLabelDef {
    type Slot = MdsolLabelDefSlot;

    const ORDER: &'static [MdsolLabelDefSlot] = &[
        MdsolLabelDefSlot::TranslatedText,
        MdsolLabelDefSlot::ViewRestrictions,
    ];

    fn emit(&self, slot: MdsolLabelDefSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            MdsolLabelDefSlot::TranslatedText => emit_all(&self.translations, sink),
            MdsolLabelDefSlot::ViewRestrictions => emit_all(&self.view_restrictions, sink),
        }
    }
}

/// `mdsol:LabelRef`: places a label within an item group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolLabelRef {
    pub label_oid: String,
    pub order_number: u32,
}

impl MdsolLabelRef {
    pub fn new(label_oid: impl Into<String>, order_number: u32) -> Self {
        Self {
            label_oid: label_oid.into(),
            order_number,
        }
    }
}

impl Element for MdsolLabelRef {
    const TAG: &'static str = "mdsol:LabelRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("LabelOID", self.label_oid.as_str())
            .with("OrderNumber", self.order_number.to_string())
    }
}

/// `mdsol:CustomFunctionDef`: source code of a custom function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolCustomFunctionDef {
    pub oid: String,
    pub code: String,
    pub language: CustomFunctionLanguage,
}

impl MdsolCustomFunctionDef {
    pub fn new(oid: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            code: code.into(),
            language: CustomFunctionLanguage::default(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: CustomFunctionLanguage) -> Self {
        self.language = language;
        self
    }
}

impl Element for MdsolCustomFunctionDef {
    const TAG: &'static str = "mdsol:CustomFunctionDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Language", self.language.as_str())
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::to_xml_string;

    #[test]
    fn label_def_orders_text_before_restrictions() {
        let mut label = MdsolLabelDef::new("LBL1", "Vital signs").with_field_number(2);
        label
            .attach(MdsolViewRestriction::new("Monitor"))
            .unwrap()
            .attach(TranslatedText::new("Vital signs").with_lang("en"))
            .unwrap();
        assert_eq!(
            to_xml_string(&label).unwrap(),
            "<mdsol:LabelDef OID=\"LBL1\" Name=\"Vital signs\" FieldNumber=\"2\">\
             <TranslatedText xml:lang=\"en\">Vital signs</TranslatedText>\
             <mdsol:ViewRestriction>Monitor</mdsol:ViewRestriction></mdsol:LabelDef>"
        );
    }

    #[test]
    fn custom_function_code_is_escaped_text() {
        let function = MdsolCustomFunctionDef::new("CF_AGE", "return a < b;")
            .with_language(CustomFunctionLanguage::Sql);
        assert_eq!(
            to_xml_string(&function).unwrap(),
            r#"<mdsol:CustomFunctionDef OID="CF_AGE" Language="SQL">return a &lt; b;</mdsol:CustomFunctionDef>"#
        );
    }
}
