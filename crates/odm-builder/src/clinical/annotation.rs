//! Annotations: comments and coded flags attached to clinical data.

use std::borrow::Cow;

use odm_model::{SponsorOrSite, TransactionType};

use crate::any::AnyElement;
use crate::element::{Attributes, Composite, Element, emit_all, emit_children, emit_opt, fill_slot};
use crate::error::{OdmError, Result};
use crate::sink::XmlSink;
use crate::transaction::{ALL_TRANSACTION_TYPES, Transactional};

/// `Comment`, written by the sponsor or the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub sponsor_or_site: Option<SponsorOrSite>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sponsor_or_site: None,
        }
    }

    #[must_use]
    pub fn with_sponsor_or_site(mut self, author: SponsorOrSite) -> Self {
        self.sponsor_or_site = Some(author);
        self
    }
}

impl Element for Comment {
    const TAG: &'static str = "Comment";

    fn attributes(&self) -> Attributes {
        Attributes::new().with_opt("SponsorOrSite", self.sponsor_or_site)
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.text))
    }
}

/// `FlagValue`: a coded value drawn from a codelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagValue {
    pub value: String,
    pub codelist_oid: String,
}

impl FlagValue {
    pub fn new(value: impl Into<String>, codelist_oid: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            codelist_oid: codelist_oid.into(),
        }
    }
}

impl Element for FlagValue {
    const TAG: &'static str = "FlagValue";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("CodeListOID", self.codelist_oid.as_str())
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.value))
    }
}

/// `FlagType`: what kind of flag a [`FlagValue`] is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagType {
    pub flag_type: String,
    pub codelist_oid: String,
}

impl FlagType {
    pub fn new(flag_type: impl Into<String>, codelist_oid: impl Into<String>) -> Self {
        Self {
            flag_type: flag_type.into(),
            codelist_oid: codelist_oid.into(),
        }
    }
}

impl Element for FlagType {
    const TAG: &'static str = "FlagType";

    fn attributes(&self) -> Attributes {
        Attributes::new().with("CodeListOID", self.codelist_oid.as_str())
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.flag_type))
    }
}

children! {
    /// Children accepted by [`Flag`].
    pub enum FlagChild for Flag {
        FlagValue(FlagValue),
        FlagType(FlagType),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSlot {
    FlagValue,
    FlagType,
}

/// `Flag`. The `FlagValue` is mandatory at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flag {
    flag_value: Option<FlagValue>,
    flag_type: Option<FlagType>,
}

impl Flag {
    pub fn new(flag_value: FlagValue) -> Self {
        Self {
            flag_value: Some(flag_value),
            flag_type: None,
        }
    }

    pub fn attach(&mut self, child: impl Into<FlagChild>) -> Result<&mut Self> {
        match FlagChild::traced(child.into()) {
            FlagChild::FlagValue(node) => fill_slot(Self::TAG, &mut self.flag_value, node)?,
            FlagChild::FlagType(node) => fill_slot(Self::TAG, &mut self.flag_type, node)?,
        }
        Ok(self)
    }

    pub fn flag_value(&self) -> Option<&FlagValue> {
        self.flag_value.as_ref()
    }

    pub fn flag_type(&self) -> Option<&FlagType> {
        self.flag_type.as_ref()
    }
}

impl Element for Flag {
    const TAG: &'static str = "Flag";

    fn validate(&self) -> Result<()> {
        match self.flag_value {
            Some(_) => Ok(()),
            None => Err(OdmError::incomplete(Self::TAG, FlagValue::TAG)),
        }
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(FlagChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for Flag {
    type Slot = FlagSlot;

    const ORDER: &'static [FlagSlot] = &[FlagSlot::FlagValue, FlagSlot::FlagType];

    fn emit(&self, slot: FlagSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            FlagSlot::FlagValue => emit_opt(self.flag_value.as_ref(), sink),
            FlagSlot::FlagType => emit_opt(self.flag_type.as_ref(), sink),
        }
    }
}

children! {
    /// Children accepted by [`Annotation`].
    pub enum AnnotationChild for Annotation {
        Comment(Comment),
        Flag(Flag),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationSlot {
    Comment,
    Flags,
}

/// `Annotation`: a comment and/or flags on the enclosing element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub id: Option<String>,
    pub seq_num: u32,
    transaction_type: Option<TransactionType>,
    comment: Option<Comment>,
    pub(crate) flags: Vec<Flag>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            id: None,
            seq_num: 1,
            transaction_type: None,
            comment: None,
            flags: Vec::new(),
        }
    }
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_seq_num(mut self, seq_num: u32) -> Self {
        self.seq_num = seq_num;
        self
    }

    pub fn attach(&mut self, child: impl Into<AnnotationChild>) -> Result<&mut Self> {
        match AnnotationChild::traced(child.into()) {
            AnnotationChild::Comment(node) => fill_slot(Self::TAG, &mut self.comment, node)?,
            AnnotationChild::Flag(node) => self.flags.push(node),
        }
        Ok(self)
    }

    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }
}

impl Element for Annotation {
    const TAG: &'static str = "Annotation";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("SeqNum", self.seq_num.to_string())
            .with_opt("TransactionType", self.transaction_type)
            .with_opt("ID", self.id.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(AnnotationChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for Annotation {
    type Slot = AnnotationSlot;

    const ORDER: &'static [AnnotationSlot] = &[AnnotationSlot::Comment, AnnotationSlot::Flags];

    fn emit(&self, slot: AnnotationSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            AnnotationSlot::Comment => emit_opt(self.comment.as_ref(), sink),
            AnnotationSlot::Flags => emit_all(&self.flags, sink),
        }
    }
}

impl Transactional for Annotation {
    const TRANSACTION_TYPES: &'static [TransactionType] = ALL_TRANSACTION_TYPES;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

children! {
    /// Children accepted by [`Annotations`].
    pub enum AnnotationsChild for Annotations {
        Annotation(Annotation),
    }
}

/// `Annotations`: the clinical-data level annotation container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    annotations: Vec<Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, child: impl Into<AnnotationsChild>) -> Result<&mut Self> {
        match AnnotationsChild::traced(child.into()) {
            AnnotationsChild::Annotation(node) => self.annotations.push(node),
        }
        Ok(self)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Element for Annotations {
    const TAG: &'static str = "Annotations";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.annotations, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(AnnotationsChild::try_from(child)?).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::to_xml_string;

    #[test]
    fn annotation_orders_comment_before_flags() {
        let mut flag = Flag::default();
        flag.attach(FlagType::new("Review", "FLAG_TYPE"))
            .unwrap()
            .attach(FlagValue::new("Reviewed", "REVIEW"))
            .unwrap();

        let mut annotation = Annotation::new().with_id("A1");
        annotation
            .attach(flag)
            .unwrap()
            .attach(Comment::new("Checked against source").with_sponsor_or_site(SponsorOrSite::Site))
            .unwrap();
        annotation.set_transaction_type(TransactionType::Insert).unwrap();

        insta::assert_snapshot!(to_xml_string(&annotation).unwrap(), @r#"<Annotation SeqNum="1" TransactionType="Insert" ID="A1"><Comment SponsorOrSite="Site">Checked against source</Comment><Flag><FlagValue CodeListOID="REVIEW">Reviewed</FlagValue><FlagType CodeListOID="FLAG_TYPE">Review</FlagType></Flag></Annotation>"#);
    }

    #[test]
    fn flag_without_value_is_incomplete() {
        let mut flag = Flag::default();
        flag.attach(FlagType::new("Review", "FLAG_TYPE")).unwrap();
        let err = to_xml_string(&flag).unwrap_err();
        assert_eq!(err.to_string(), "Flag is missing required FlagValue");
    }

    #[test]
    fn second_comment_is_rejected() {
        let mut annotation = Annotation::new();
        annotation.attach(Comment::new("one")).unwrap();
        assert!(annotation.attach(Comment::new("two")).is_err());
        assert_eq!(annotation.comment().unwrap().text, "one");
    }
}
