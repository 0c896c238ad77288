//! Serialization targets driven by [`Element::build`].
//!
//! [`XmlWriter`] streams quick-xml events; [`EventLog`] records the same
//! start/data/end stream as values, for consumers that want the serialized
//! tree rather than bytes.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::element::{Attributes, Element};
use crate::error::Result;

/// Streaming consumer of a document traversal.
pub trait XmlSink {
    /// Opens an element.
    fn start(&mut self, tag: &str, attributes: &Attributes) -> Result<()>;

    /// Character content of the innermost open element.
    fn data(&mut self, text: &str) -> Result<()>;

    /// Closes the innermost open element.
    fn end(&mut self, tag: &str) -> Result<()>;
}

/// Writes XML through quick-xml.
///
/// A start tag is held back until the element is known to have content, so
/// elements without children or text are written as `<Tag />`.
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
    pending: Option<BytesStart<'static>>,
}

impl<W: Write> XmlWriter<W> {
    /// Un-indented output.
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
            pending: None,
        }
    }

    /// Indented output, `size` spaces per level.
    pub fn with_indent(inner: W, size: usize) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', size),
            pending: None,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_pending()?;
        Ok(self.writer.into_inner())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl<W: Write> XmlSink for XmlWriter<W> {
    fn start(&mut self, tag: &str, attributes: &Attributes) -> Result<()> {
        self.flush_pending()?;
        let mut start = BytesStart::new(tag.to_owned());
        for (name, value) in attributes.iter() {
            start.push_attribute((name, value));
        }
        self.pending = Some(start);
        Ok(())
    }

    fn data(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn end(&mut self, tag: &str) -> Result<()> {
        match self.pending.take() {
            Some(start) => {
                // quick-xml closes empty tags with a bare "/>"; ODM output uses " />".
                let mut content = String::from_utf8(start.to_vec())?;
                content.push(' ');
                let start = BytesStart::from_content(content, tag.len());
                self.writer.write_event(Event::Empty(start))?
            }
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(tag.to_owned())))?,
        }
        Ok(())
    }
}

/// One recorded traversal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Start {
        tag: String,
        attributes: Attributes,
    },
    Data(String),
    End(String),
}

/// Records traversal events in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<SinkEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SinkEvent> {
        self.events
    }

    /// Tags of every opened element, in document order.
    pub fn start_tags(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Start { tag, .. } => Some(tag.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Attributes of the first element with the given tag.
    pub fn attributes_of(&self, tag: &str) -> Option<&Attributes> {
        self.events.iter().find_map(|event| match event {
            SinkEvent::Start {
                tag: start,
                attributes,
            } if start == tag => Some(attributes),
            _ => None,
        })
    }
}

impl XmlSink for EventLog {
    fn start(&mut self, tag: &str, attributes: &Attributes) -> Result<()> {
        self.events.push(SinkEvent::Start {
            tag: tag.to_owned(),
            attributes: attributes.clone(),
        });
        Ok(())
    }

    fn data(&mut self, text: &str) -> Result<()> {
        self.events.push(SinkEvent::Data(text.to_owned()));
        Ok(())
    }

    fn end(&mut self, tag: &str) -> Result<()> {
        self.events.push(SinkEvent::End(tag.to_owned()));
        Ok(())
    }
}

/// Output formatting for rendered documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indent nested elements.
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set.
    pub indent: usize,
    /// Encoding named in a leading XML declaration; `None` omits it.
    pub declaration: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
            declaration: Some("utf-8".to_string()),
        }
    }
}

impl RenderOptions {
    /// Un-indented output with no declaration.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: 0,
            declaration: None,
        }
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Emit a declaration naming `encoding`.
    #[must_use]
    pub fn with_declaration(mut self, encoding: impl Into<String>) -> Self {
        self.declaration = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn without_declaration(mut self) -> Self {
        self.declaration = None;
        self
    }
}

/// Writes `node` and its subtree to `out`.
pub fn write_to<E: Element, W: Write>(node: &E, out: W, options: &RenderOptions) -> Result<W> {
    write_with(out, options, |sink| node.build(sink))
}

/// Writes the optional declaration, then drives `build` against a writer
/// configured from `options`.
pub(crate) fn write_with<W, F>(mut out: W, options: &RenderOptions, build: F) -> Result<W>
where
    W: Write,
    F: FnOnce(&mut dyn XmlSink) -> Result<()>,
{
    if let Some(encoding) = options.declaration.as_deref() {
        write!(out, "<?xml version=\"1.0\" encoding=\"{encoding}\" ?>")?;
        if options.pretty {
            out.write_all(b"\n")?;
        }
    }
    let mut sink = if options.pretty {
        XmlWriter::with_indent(out, options.indent)
    } else {
        XmlWriter::new(out)
    };
    build(&mut sink)?;
    sink.into_inner()
}

/// Renders `node` and its subtree to a string.
pub fn render<E: Element>(node: &E, options: &RenderOptions) -> Result<String> {
    let bytes = write_to(node, Vec::new(), options)?;
    Ok(String::from_utf8(bytes)?)
}

/// Renders `node` un-indented, without a declaration.
pub fn to_xml_string<E: Element>(node: &E) -> Result<String> {
    render(node, &RenderOptions::compact())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(sink: &mut dyn XmlSink) -> Result<()> {
        sink.start("Outer", &Attributes::new().with("OID", "A&B"))?;
        sink.start("Empty", &Attributes::new())?;
        sink.end("Empty")?;
        sink.start("Text", &Attributes::new())?;
        sink.data("1 < 2")?;
        sink.end("Text")?;
        sink.end("Outer")
    }

    #[test]
    fn writer_collapses_empty_elements_and_escapes() {
        let mut writer = XmlWriter::new(Vec::new());
        drive(&mut writer).unwrap();
        let xml = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<Outer OID="A&amp;B"><Empty /><Text>1 &lt; 2</Text></Outer>"#
        );
    }

    #[test]
    fn empty_text_collapses_element() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start("StudyDescription", &Attributes::new()).unwrap();
        writer.data("").unwrap();
        writer.end("StudyDescription").unwrap();
        let xml = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(xml, "<StudyDescription />");
    }

    #[test]
    fn pretty_empty_elements_keep_space_before_slash() {
        let mut writer = XmlWriter::with_indent(Vec::new(), 2);
        writer
            .start("ItemGroupData", &Attributes::new().with("ItemGroupOID", "DM"))
            .unwrap();
        writer
            .start("ItemData", &Attributes::new().with("ItemOID", "SUBJINIT").with("IsNull", "Yes"))
            .unwrap();
        writer.end("ItemData").unwrap();
        writer.end("ItemGroupData").unwrap();
        let xml = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            xml,
            "<ItemGroupData ItemGroupOID=\"DM\">\n  <ItemData ItemOID=\"SUBJINIT\" IsNull=\"Yes\" />\n</ItemGroupData>"
        );
    }

    #[test]
    fn event_log_records_stream() {
        let mut log = EventLog::new();
        drive(&mut log).unwrap();
        assert_eq!(log.start_tags(), vec!["Outer", "Empty", "Text"]);
        assert_eq!(log.attributes_of("Outer").unwrap().get("OID"), Some("A&B"));
        assert_eq!(log.events().len(), 7);
        assert_eq!(log.events()[4], SinkEvent::Data("1 < 2".to_string()));
    }
}
