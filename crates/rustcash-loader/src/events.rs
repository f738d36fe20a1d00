//! Element events consumed by the loader.
//!
//! The loader never touches bytes directly: it pulls [`XmlEvent`]s from an
//! [`EventSource`]. [`XmlEvents`] is the `quick-xml` implementation used for
//! real files; tests may feed any other source.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::LoadError;

/// One step of the element stream.
///
/// Names are local names: the `act:` in `act:name` is stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element was opened.
    Start(String),
    /// An element was closed.
    End(String),
    /// Character data, already unescaped and untrimmed.
    Text(String),
    /// End of input.
    Eof,
}

/// A pull parser over element events.
pub trait EventSource {
    /// Advance to the next event.
    fn next_event(&mut self) -> Result<XmlEvent, LoadError>;

    /// Read the text of the element just started and consume its end tag.
    ///
    /// Text inside nested elements is ignored.
    fn read_text(&mut self) -> Result<String, LoadError> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                XmlEvent::Text(t) if depth == 0 => text.push_str(&t),
                XmlEvent::Text(_) => {}
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End(_) if depth == 0 => return Ok(text),
                XmlEvent::End(_) => depth -= 1,
                XmlEvent::Eof => return Err(LoadError::UnexpectedEof),
            }
        }
    }

    /// Consume the element just started, including all of its descendants.
    fn skip_element(&mut self) -> Result<(), LoadError> {
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End(_) if depth == 0 => return Ok(()),
                XmlEvent::End(_) => depth -= 1,
                XmlEvent::Text(_) => {}
                XmlEvent::Eof => return Err(LoadError::UnexpectedEof),
            }
        }
    }
}

/// [`EventSource`] backed by a `quick-xml` reader.
pub struct XmlEvents<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// End event owed for the last `<empty/>` element.
    pending_end: Option<String>,
}

impl<R: BufRead> XmlEvents<R> {
    /// Wrap a buffered reader of (already decompressed) XML.
    pub fn new(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::new(),
            pending_end: None,
        }
    }
}

fn xml_error<R>(reader: &Reader<R>, source: quick_xml::Error) -> LoadError {
    LoadError::Xml {
        position: reader.buffer_position(),
        source,
    }
}

impl<R: BufRead> std::fmt::Debug for XmlEvents<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlEvents")
            .field("position", &self.reader.buffer_position())
            .finish_non_exhaustive()
    }
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl<R: BufRead> EventSource for XmlEvents<R> {
    fn next_event(&mut self) -> Result<XmlEvent, LoadError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(XmlEvent::End(name));
        }
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => return Err(xml_error(&self.reader, e)),
            };
            let next = match event {
                Event::Start(e) => XmlEvent::Start(utf8(e.local_name().as_ref())),
                Event::End(e) => XmlEvent::End(utf8(e.local_name().as_ref())),
                Event::Empty(e) => {
                    let name = utf8(e.local_name().as_ref());
                    self.pending_end = Some(name.clone());
                    XmlEvent::Start(name)
                }
                Event::Text(t) => match t.unescape() {
                    Ok(text) => XmlEvent::Text(text.into_owned()),
                    Err(e) => return Err(xml_error(&self.reader, e)),
                },
                Event::CData(c) => XmlEvent::Text(utf8(&c.into_inner())),
                Event::Eof => XmlEvent::Eof,
                // Declarations, comments, processing instructions, doctype.
                _ => continue,
            };
            return Ok(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(xml: &str) -> Vec<XmlEvent> {
        let mut src = XmlEvents::new(xml.as_bytes());
        let mut out = Vec::new();
        loop {
            let ev = src.next_event().unwrap();
            let done = ev == XmlEvent::Eof;
            out.push(ev);
            if done {
                return out;
            }
        }
    }

    fn start(s: &str) -> XmlEvent {
        XmlEvent::Start(s.to_string())
    }

    fn end(s: &str) -> XmlEvent {
        XmlEvent::End(s.to_string())
    }

    #[test]
    fn test_prefixes_stripped() {
        let events = collect(
            r#"<?xml version="1.0" encoding="utf-8" ?><gnc:account version="2.0.0"><act:name>Fuel &amp; Oil</act:name></gnc:account>"#,
        );
        assert_eq!(
            events,
            vec![
                start("account"),
                start("name"),
                XmlEvent::Text("Fuel & Oil".to_string()),
                end("name"),
                end("account"),
                XmlEvent::Eof,
            ]
        );
    }

    #[test]
    fn test_text_keeps_surrounding_whitespace() {
        let mut src = XmlEvents::new("<a>\n  <name>  Fuel  </name>\n</a>".as_bytes());
        assert_eq!(src.next_event().unwrap(), start("a"));
        assert_eq!(src.next_event().unwrap(), XmlEvent::Text("\n  ".to_string()));
        assert_eq!(src.next_event().unwrap(), start("name"));
        assert_eq!(src.read_text().unwrap(), "  Fuel  ");
    }

    #[test]
    fn test_empty_element_is_start_and_end() {
        let events = collect("<a><act:non-standard-scu/></a>");
        assert_eq!(
            events,
            vec![
                start("a"),
                start("non-standard-scu"),
                end("non-standard-scu"),
                end("a"),
                XmlEvent::Eof,
            ]
        );
    }

    #[test]
    fn test_read_text_ignores_nested() {
        let mut src = XmlEvents::new("<a>x<b>ignored</b>y</a><c/>".as_bytes());
        assert_eq!(src.next_event().unwrap(), start("a"));
        assert_eq!(src.read_text().unwrap(), "xy");
        assert_eq!(src.next_event().unwrap(), start("c"));
    }

    #[test]
    fn test_skip_element() {
        let mut src = XmlEvents::new("<r><s><t>1</t><t/></s><u>2</u></r>".as_bytes());
        assert_eq!(src.next_event().unwrap(), start("r"));
        assert_eq!(src.next_event().unwrap(), start("s"));
        src.skip_element().unwrap();
        assert_eq!(src.next_event().unwrap(), start("u"));
    }

    #[test]
    fn test_truncated_input() {
        let mut src = XmlEvents::new("<a><b>".as_bytes());
        assert_eq!(src.next_event().unwrap(), start("a"));
        assert!(src.skip_element().is_err());
    }

    #[test]
    fn test_mismatched_tags() {
        let mut src = XmlEvents::new("<a></b>".as_bytes());
        assert_eq!(src.next_event().unwrap(), start("a"));
        assert!(matches!(src.next_event(), Err(LoadError::Xml { .. })));
    }
}
