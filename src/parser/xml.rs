//! Pull cursor over a quick-xml reader.
//!
//! Tracks the element path for diagnostics. Every [`Element`] handed out by
//! the cursor must be consumed exactly once, by [`XmlCursor::read_text`]
//! (leaf), by draining [`XmlCursor::next_child`] until `None` (container), or
//! by [`XmlCursor::capture`] (opaque extension).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};

use ra_metadata::ExtensionElement;

use super::{DocumentKind, ParseDiagnostic, ParseError};

/// An opened element.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Document path of this element, e.g. `/connector/resourceadapter`.
    pub path: String,
    /// 1-based position among same-named siblings.
    pub position: usize,
    empty: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

/// Deepest element nesting accepted in either document.
pub(crate) const MAX_DEPTH: usize = 256;

pub(crate) struct XmlCursor<'a> {
    reader: Reader<&'a [u8]>,
    kind: DocumentKind,
    path: Vec<String>,
    /// Per open element, how many children of each name were seen so far.
    counters: Vec<HashMap<String, usize>>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl<'a> XmlCursor<'a> {
    pub fn new(kind: DocumentKind, input: &'a str) -> Self {
        let mut reader = Reader::from_str(input);
        reader.trim_text(true);
        Self {
            reader,
            kind,
            path: Vec::new(),
            counters: vec![HashMap::new()],
            diagnostics: Vec::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Advance to the document element.
    pub fn root(&mut self) -> Result<Element, ParseError> {
        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => return self.enter(&e, false),
                Ok(Event::Empty(e)) => return self.enter(&e, true),
                Ok(Event::Text(_)) | Ok(Event::CData(_)) => {
                    return Err(self.error("text content before the document element"));
                }
                Ok(Event::Eof) => return Err(self.error("document has no root element")),
                Ok(_) => {}
                Err(err) => return Err(self.error(err.to_string())),
            }
        }
    }

    /// Next child element of `parent`, or `None` once `parent` is closed.
    ///
    /// Stray text inside a container element is ignored.
    pub fn next_child(&mut self, parent: &Element) -> Result<Option<Element>, ParseError> {
        if parent.empty {
            self.leave();
            return Ok(None);
        }
        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => return self.enter(&e, false).map(Some),
                Ok(Event::Empty(e)) => return self.enter(&e, true).map(Some),
                Ok(Event::End(_)) => {
                    self.leave();
                    return Ok(None);
                }
                Ok(Event::Eof) => {
                    return Err(self.error(format!("unexpected end of document inside <{}>", parent.name)));
                }
                Ok(_) => {}
                Err(err) => return Err(self.error(err.to_string())),
            }
        }
    }

    /// Read the trimmed text content of a leaf element.
    pub fn read_text(&mut self, element: Element) -> Result<String, ParseError> {
        let text = self.text_content(&element)?;
        self.leave();
        Ok(text)
    }

    /// Read a leaf element and convert its text, reporting conversion
    /// failures at the element's own path.
    pub fn read_parsed<T>(
        &mut self,
        element: Element,
        convert: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, ParseError> {
        let text = self.text_content(&element)?;
        let value = convert(&text).map_err(|reason| self.error(reason))?;
        self.leave();
        Ok(value)
    }

    pub fn read_bool(&mut self, element: Element) -> Result<bool, ParseError> {
        self.read_parsed(element, parse_bool)
    }

    pub fn read_u32(&mut self, element: Element) -> Result<u32, ParseError> {
        self.read_parsed(element, |text| {
            text.parse::<u32>()
                .map_err(|_| format!("expected a non-negative integer, found '{}'", text))
        })
    }

    /// Preserve an unrecognized element verbatim and record a diagnostic.
    pub fn unknown(&mut self, element: Element) -> Result<ExtensionElement, ParseError> {
        tracing::debug!(path = %element.path, "preserving unrecognized element");
        self.diagnostics.push(ParseDiagnostic::UnknownElement {
            document: self.kind,
            path: element.path.clone(),
            name: element.name.clone(),
        });
        self.capture(element)
    }

    /// Capture an element subtree as opaque extension data.
    pub fn capture(&mut self, element: Element) -> Result<ExtensionElement, ParseError> {
        if element.empty {
            self.leave();
            return Ok(opened(element));
        }
        // Innermost open element last, each with its accumulated text.
        let mut open = vec![(opened(element), String::new())];
        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let child = self.enter(&e, false)?;
                    open.push((opened(child), String::new()));
                }
                Ok(Event::Empty(e)) => {
                    let child = self.enter(&e, true)?;
                    self.leave();
                    if let Some((parent, _)) = open.last_mut() {
                        parent.children.push(opened(child));
                    }
                }
                Ok(Event::Text(t)) => {
                    let value = t.unescape().map_err(|err| self.error(err.to_string()))?;
                    if let Some((_, text)) = open.last_mut() {
                        text.push_str(&value);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some((_, text)) = open.last_mut() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    self.leave();
                    let (mut closed, text) = match open.pop() {
                        Some(entry) => entry,
                        None => return Err(self.error("unbalanced end tag")),
                    };
                    let text = text.trim();
                    if !text.is_empty() {
                        closed.text = Some(text.to_string());
                    }
                    match open.last_mut() {
                        Some((parent, _)) => parent.children.push(closed),
                        None => return Ok(closed),
                    }
                }
                Ok(Event::Eof) => {
                    let name = open.last().map(|(e, _)| e.name.clone()).unwrap_or_default();
                    return Err(self.error(format!("unexpected end of document inside <{}>", name)));
                }
                Ok(_) => {}
                Err(err) => return Err(self.error(err.to_string())),
            }
        }
    }

    /// Require that nothing but comments and whitespace follow the root.
    pub fn finish(mut self) -> Result<Vec<ParseDiagnostic>, ParseError> {
        loop {
            match self.reader.read_event() {
                Ok(Event::Eof) => return Ok(self.diagnostics),
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(self.error(format!("second root element <{}>", name)));
                }
                Ok(Event::Text(_)) | Ok(Event::CData(_)) => {
                    return Err(self.error("text content after the document element"));
                }
                Ok(_) => {}
                Err(err) => return Err(self.error(err.to_string())),
            }
        }
    }

    /// Error at the current path.
    pub fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError {
            document: self.kind,
            path: self.current_path(),
            position: self.reader.buffer_position(),
            reason: reason.into(),
        }
    }

    /// Error at an element's path, e.g. a required child that never appeared.
    pub fn error_at(&self, element: &Element, reason: impl Into<String>) -> ParseError {
        ParseError {
            document: self.kind,
            path: element.path.clone(),
            position: self.reader.buffer_position(),
            reason: reason.into(),
        }
    }

    fn text_content(&mut self, element: &Element) -> Result<String, ParseError> {
        if element.empty {
            return Ok(String::new());
        }
        let mut text = String::new();
        loop {
            match self.reader.read_event() {
                Ok(Event::Text(t)) => {
                    let value = t.unescape().map_err(|err| self.error(err.to_string()))?;
                    text.push_str(&value);
                }
                Ok(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
                Ok(Event::End(_)) => break,
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(self.error(format!(
                        "<{}> must contain text only, found child <{}>",
                        element.name, name
                    )));
                }
                Ok(Event::Eof) => {
                    return Err(self.error(format!("unexpected end of document inside <{}>", element.name)));
                }
                Ok(_) => {}
                Err(err) => return Err(self.error(err.to_string())),
            }
        }
        Ok(text.trim().to_string())
    }

    fn enter(&mut self, start: &BytesStart<'_>, empty: bool) -> Result<Element, ParseError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        if self.path.len() >= MAX_DEPTH {
            return Err(self.error(format!(
                "element nesting deeper than {} levels at <{}>",
                MAX_DEPTH, name
            )));
        }
        let mut attributes = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.error(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| self.error(err.to_string()))?;
            let value = value.trim();
            if !value.is_empty() {
                attributes.insert(key, value.to_string());
            }
        }

        let position = match self.counters.last_mut() {
            Some(counts) => {
                let count = counts.entry(name.clone()).or_insert(0);
                *count += 1;
                *count
            }
            None => 1,
        };
        self.path.push(if position > 1 {
            format!("{}[{}]", name, position)
        } else {
            name.clone()
        });
        self.counters.push(HashMap::new());

        Ok(Element {
            name,
            attributes,
            path: self.current_path(),
            position,
            empty,
        })
    }

    fn leave(&mut self) {
        self.path.pop();
        self.counters.pop();
    }

    fn current_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

fn opened(element: Element) -> ExtensionElement {
    ExtensionElement {
        name: element.name,
        attributes: element.attributes,
        ..Default::default()
    }
}

/// `xsd:boolean` lexical forms.
pub(crate) fn parse_bool(text: &str) -> Result<bool, String> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!(
            "expected a boolean (true, false, 1 or 0), found '{}'",
            other
        )),
    }
}
