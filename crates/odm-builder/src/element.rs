//! The node protocol shared by every element of an ODM document.
//!
//! A node knows its tag, its attribute map, optional text content, and how to
//! emit its children. Containers declare the emission order of their child
//! slots once, as an ordering table ([`Composite::ORDER`]); [`emit_children`]
//! is the single traversal that consults it, so the order children were
//! attached in never affects output.

use std::borrow::Cow;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use odm_model::BoolStyle;

use crate::any::AnyElement;
use crate::error::{OdmError, Result};
use crate::sink::XmlSink;

/// Timestamp format used for every date-time attribute and text node.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date format used for date-only attributes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a timestamp at second precision with no timezone suffix.
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Ordered attribute map of a single element.
///
/// Attributes are written in insertion order. Optional values that are
/// `None` are skipped rather than written empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(&'static str, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.push((name, value.into()));
        self
    }

    /// Appends an attribute when `value` is present.
    #[must_use]
    pub fn with_opt<V: fmt::Display>(mut self, name: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.push((name, value.to_string()));
        }
        self
    }

    /// Appends a boolean rendered in the element family's style.
    #[must_use]
    pub fn with_bool(self, name: &'static str, value: bool, style: BoolStyle) -> Self {
        self.with(name, style.render(value))
    }

    /// Appends a boolean when present.
    #[must_use]
    pub fn with_opt_bool(self, name: &'static str, value: Option<bool>, style: BoolStyle) -> Self {
        self.with_opt(name, value.map(|flag| style.render(flag)))
    }

    /// Returns the value of the named attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A node of an ODM document.
pub trait Element {
    /// Element name as written, including any namespace prefix.
    const TAG: &'static str;

    /// Attribute map in emission order.
    fn attributes(&self) -> Attributes {
        Attributes::new()
    }

    /// Character content of text-only elements.
    fn text(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Checks usage-conditional mandatory content before the node is written.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Emits child elements. Containers delegate to [`emit_children`].
    fn build_children(&self, _sink: &mut dyn XmlSink) -> Result<()> {
        Ok(())
    }

    /// Routes a dynamically typed child into the matching slot.
    ///
    /// Elements without child slots reject every attachment.
    fn accept(&mut self, child: AnyElement) -> Result<()> {
        Err(OdmError::NotAccepted {
            container: Self::TAG,
            child: child.tag(),
        })
    }

    /// Writes this node and its subtree, pre-order, into `sink`.
    ///
    /// The tree is not modified; building twice yields identical events.
    fn build(&self, sink: &mut dyn XmlSink) -> Result<()>
    where
        Self: Sized,
    {
        self.validate()?;
        write_node(self, &self.attributes(), sink)
    }
}

/// Writes `node` with an explicit attribute map.
///
/// Used directly by parents that supply context-dependent attributes.
pub(crate) fn write_node<E: Element>(
    node: &E,
    attributes: &Attributes,
    sink: &mut dyn XmlSink,
) -> Result<()> {
    sink.start(E::TAG, attributes)?;
    if let Some(text) = node.text() {
        sink.data(&text)?;
    }
    node.build_children(sink)?;
    sink.end(E::TAG)
}

/// An element with declared child slots and a fixed emission order.
pub trait Composite: Element {
    /// Identifier of one child slot.
    type Slot: Copy + fmt::Debug + PartialEq + 'static;

    /// Emission order of the slots, as mandated by the schema.
    const ORDER: &'static [Self::Slot];

    /// Emits the occupants of one slot.
    fn emit(&self, slot: Self::Slot, sink: &mut dyn XmlSink) -> Result<()>;
}

/// Emits every slot of `node` in its declared order.
pub fn emit_children<C: Composite>(node: &C, sink: &mut dyn XmlSink) -> Result<()> {
    for slot in C::ORDER {
        node.emit(*slot, sink)?;
    }
    Ok(())
}

pub(crate) fn emit_opt<E: Element>(node: Option<&E>, sink: &mut dyn XmlSink) -> Result<()> {
    match node {
        Some(node) => node.build(sink),
        None => Ok(()),
    }
}

pub(crate) fn emit_all<E: Element>(nodes: &[E], sink: &mut dyn XmlSink) -> Result<()> {
    for node in nodes {
        node.build(sink)?;
    }
    Ok(())
}

/// Writes a text-only child that has no node type of its own.
pub(crate) fn emit_text(sink: &mut dyn XmlSink, tag: &'static str, text: &str) -> Result<()> {
    sink.start(tag, &Attributes::new())?;
    sink.data(text)?;
    sink.end(tag)
}

pub(crate) fn emit_opt_text(
    sink: &mut dyn XmlSink,
    tag: &'static str,
    text: Option<&str>,
) -> Result<()> {
    match text {
        Some(text) => emit_text(sink, tag, text),
        None => Ok(()),
    }
}

/// Places `value` into a singular slot, failing if it is occupied.
///
/// On failure the existing occupant is left untouched.
pub(crate) fn fill_slot<T: Element>(
    container: &'static str,
    slot: &mut Option<T>,
    value: T,
) -> Result<()> {
    if slot.is_some() {
        return Err(OdmError::SlotOccupied {
            container,
            child: T::TAG,
        });
    }
    *slot = Some(value);
    Ok(())
}
