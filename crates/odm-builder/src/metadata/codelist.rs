//! Codelists.

use odm_model::{BoolStyle, CodeListDataType};

use crate::any::AnyElement;
use crate::element::{Attributes, Composite, Element, emit_all, emit_children, emit_opt, fill_slot};
use crate::error::Result;
use crate::metadata::{Alias, TranslatedText};
use crate::sink::XmlSink;

children! {
    /// Children accepted by [`Decode`].
    pub enum DecodeChild for Decode {
        TranslatedText(TranslatedText),
    }
}

/// `Decode`: the display text of a coded value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decode {
    translations: Vec<TranslatedText>,
}

impl Decode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, child: impl Into<DecodeChild>) -> Result<&mut Self> {
        match DecodeChild::traced(child.into()) {
            DecodeChild::TranslatedText(node) => self.translations.push(node),
        }
        Ok(self)
    }
}

impl Element for Decode {
    const TAG: &'static str = "Decode";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.translations, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(DecodeChild::try_from(child)?).map(|_| ())
    }
}

children! {
    /// Children accepted by [`CodeListItem`].
    pub enum CodeListItemChild for CodeListItem {
        Decode(Decode),
        Alias(Alias),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeListItemSlot {
    Decode,
    Aliases,
}

/// `CodeListItem`: one permitted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListItem {
    pub coded_value: String,
    pub order_number: Option<u32>,
    /// Whether the entry asks for a free-text "specify" value.
    pub specify: bool,
    decode: Option<Decode>,
    aliases: Vec<Alias>,
}

impl CodeListItem {
    pub fn new(coded_value: impl Into<String>) -> Self {
        Self {
            coded_value: coded_value.into(),
            order_number: None,
            specify: false,
            decode: None,
            aliases: Vec::new(),
        }
    }

    /// An item whose decode is a single untagged translation.
    pub fn with_decode_text(coded_value: impl Into<String>, decode: impl Into<String>) -> Self {
        let mut text = Decode::new();
        text.translations.push(TranslatedText::new(decode));
        Self {
            decode: Some(text),
            ..Self::new(coded_value)
        }
    }

    #[must_use]
    pub fn with_order_number(mut self, order_number: u32) -> Self {
        self.order_number = Some(order_number);
        self
    }

    #[must_use]
    pub fn with_specify(mut self, specify: bool) -> Self {
        self.specify = specify;
        self
    }

    pub fn attach(&mut self, child: impl Into<CodeListItemChild>) -> Result<&mut Self> {
        match CodeListItemChild::traced(child.into()) {
            CodeListItemChild::Decode(node) => fill_slot(Self::TAG, &mut self.decode, node)?,
            CodeListItemChild::Alias(node) => self.aliases.push(node),
        }
        Ok(self)
    }

    pub fn decode(&self) -> Option<&Decode> {
        self.decode.as_ref()
    }
}

impl Element for CodeListItem {
    const TAG: &'static str = "CodeListItem";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("CodedValue", self.coded_value.as_str())
            .with_opt("mdsol:OrderNumber", self.order_number)
            .with_bool("mdsol:Specify", self.specify, BoolStyle::YesNo)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(CodeListItemChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for CodeListItem {
    type Slot = CodeListItemSlot;

    const ORDER: &'static [CodeListItemSlot] = &[CodeListItemSlot::Decode, CodeListItemSlot::Aliases];

    fn emit(&self, slot: CodeListItemSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            CodeListItemSlot::Decode => emit_opt(self.decode.as_ref(), sink),
            CodeListItemSlot::Aliases => emit_all(&self.aliases, sink),
        }
    }
}

children! {
    /// Children accepted by [`CodeList`].
    pub enum CodeListChild for CodeList {
        CodeListItem(CodeListItem),
        Alias(Alias),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeListSlot {
    Items,
    Aliases,
}

/// `CodeList`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeList {
    pub oid: String,
    pub name: String,
    pub data_type: CodeListDataType,
    pub sas_format_name: Option<String>,
    items: Vec<CodeListItem>,
    aliases: Vec<Alias>,
}

impl CodeList {
    pub fn new(oid: impl Into<String>, name: impl Into<String>, data_type: CodeListDataType) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            data_type,
            sas_format_name: None,
            items: Vec::new(),
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sas_format_name(mut self, name: impl Into<String>) -> Self {
        self.sas_format_name = Some(name.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<CodeListChild>) -> Result<&mut Self> {
        match CodeListChild::traced(child.into()) {
            CodeListChild::CodeListItem(node) => self.items.push(node),
            CodeListChild::Alias(node) => self.aliases.push(node),
        }
        Ok(self)
    }

    pub fn items(&self) -> &[CodeListItem] {
        &self.items
    }
}

impl Element for CodeList {
    const TAG: &'static str = "CodeList";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with("DataType", self.data_type.as_str())
            .with_opt("SASFormatName", self.sas_format_name.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(CodeListChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for CodeList {
    type Slot = CodeListSlot;

    const ORDER: &'static [CodeListSlot] = &[CodeListSlot::Items, CodeListSlot::Aliases];

    fn emit(&self, slot: CodeListSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            CodeListSlot::Items => emit_all(&self.items, sink),
            CodeListSlot::Aliases => emit_all(&self.aliases, sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::to_xml_string;

    #[test]
    fn codelist_renders_items_then_aliases() {
        let mut codelist = CodeList::new("CL_SEX", "Sex", CodeListDataType::Text);
        codelist
            .attach(Alias::new("SDTM", "SEX"))
            .unwrap()
            .attach(CodeListItem::with_decode_text("M", "Male").with_order_number(1))
            .unwrap()
            .attach(CodeListItem::with_decode_text("U", "Unknown").with_specify(true))
            .unwrap();

        insta::assert_snapshot!(to_xml_string(&codelist).unwrap(), @r#"<CodeList OID="CL_SEX" Name="Sex" DataType="text"><CodeListItem CodedValue="M" mdsol:OrderNumber="1" mdsol:Specify="No"><Decode><TranslatedText>Male</TranslatedText></Decode></CodeListItem><CodeListItem CodedValue="U" mdsol:Specify="Yes"><Decode><TranslatedText>Unknown</TranslatedText></Decode></CodeListItem><Alias Context="SDTM" Name="SEX" /></CodeList>"#);
    }

    #[test]
    fn codelist_item_has_one_decode() {
        let mut item = CodeListItem::with_decode_text("M", "Male");
        assert!(item.attach(Decode::new()).is_err());
    }
}
