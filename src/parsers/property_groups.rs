//! Streaming pass over a project XML document.
//!
//! The same pass either collects the version fields of every property group or
//! rewrites them. When rewriting, every event outside the replaced field
//! contents is copied through unchanged, so comments, attributes, whitespace and
//! line endings survive. The XML declaration is the one exception: it is not
//! re-emitted, nor is the whitespace directly after it.
//!
//! Every text node and attribute value is unescaped and attributes are checked
//! even when the event is copied through untouched, so a file that is not
//! well-formed fails both ways.

use log::debug;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("failed to serialize document: {0}")]
    Write(#[from] std::io::Error),
    #[error("closing tag </{0}> has no matching opening tag")]
    UnexpectedEnd(String),
    #[error("element <{0}> is never closed")]
    UnclosedElement(String),
    #[error("document has no root element")]
    NoRootElement,
    #[error("document has more than one root element (found <{0}>)")]
    MultipleRoots(String),
    #[error("text found outside the root element")]
    ContentOutsideRoot,
    #[error("XML declaration is only allowed at the very start of the document")]
    MisplacedDeclaration,
}

/// Element names the pass looks for.
///
/// `fields` are checked as direct children of `group` elements, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct TagSet<'a> {
    pub group: &'a str,
    pub fields: &'a [&'a str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionField {
    pub tag: String,
    pub value: String,
}

/// A group element and the recognized fields it directly contains
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyGroup {
    fields: Vec<VersionField>,
}

impl PropertyGroup {
    /// Recognized fields in priority order. Only the first occurrence of each
    /// tag name inside the group is reported.
    pub fn fields(&self) -> &[VersionField] {
        &self.fields
    }

    pub fn value(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.tag == tag)
            .map(|field| field.value.as_str())
    }
}

#[derive(Debug)]
pub struct Rewrite {
    /// Serialized document
    pub bytes: Vec<u8>,
    /// Number of field elements whose content was replaced
    pub fields_touched: usize,
}

/// Parses `contents` and returns every group in document order.
pub fn read_groups(contents: &str, tags: TagSet<'_>) -> Result<Vec<PropertyGroup>, MarkupError> {
    let (_, body) = split_bom(contents);
    let output = Pass::new(tags, None).run(body)?;
    Ok(output.groups)
}

/// Replaces the content of every recognized field with `value`.
///
/// Returns `None` when the document has no recognized field at all, in which
/// case nothing should be written back.
pub fn rewrite_groups(
    contents: &str,
    tags: TagSet<'_>,
    value: &str,
) -> Result<Option<Rewrite>, MarkupError> {
    let (bom, body) = split_bom(contents);
    let output = Pass::new(tags, Some(value)).run(body)?;
    if output.touched == 0 {
        return Ok(None);
    }

    let mut bytes = Vec::with_capacity(contents.len() + value.len());
    if bom {
        bytes.extend_from_slice(BOM.to_string().as_bytes());
    }
    bytes.extend(output.bytes.unwrap_or_default());

    Ok(Some(Rewrite { bytes, fields_touched: output.touched }))
}

fn split_bom(contents: &str) -> (bool, &str) {
    match contents.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, contents),
    }
}

struct Frame {
    name: String,
    group: Option<usize>,
}

/// A recognized field currently open; `depth` is the stack length inside it.
///
/// Only the text before the first child element is the field value. Children
/// and everything after them are kept as they are.
struct Capture {
    depth: usize,
    group: usize,
    slot: usize,
    text: String,
    seen_child: bool,
}

impl Capture {
    /// True while events belong to the field value being read or replaced
    fn owns(&self, depth: usize) -> bool {
        depth == self.depth && !self.seen_child
    }
}

struct PassOutput {
    groups: Vec<PropertyGroup>,
    touched: usize,
    bytes: Option<Vec<u8>>,
}

struct Pass<'t> {
    tags: TagSet<'t>,
    replacement: Option<&'t str>,
    writer: Option<Writer<Vec<u8>>>,
    stack: Vec<Frame>,
    groups: Vec<Vec<Option<String>>>,
    capture: Option<Capture>,
    seen_root: bool,
    seen_event: bool,
    after_decl: bool,
    touched: usize,
}

impl<'t> Pass<'t> {
    fn new(tags: TagSet<'t>, replacement: Option<&'t str>) -> Self {
        Pass {
            tags,
            replacement,
            writer: replacement.map(|_| Writer::new(Vec::new())),
            stack: Vec::new(),
            groups: Vec::new(),
            capture: None,
            seen_root: false,
            seen_event: false,
            after_decl: false,
            touched: 0,
        }
    }

    fn run(mut self, body: &str) -> Result<PassOutput, MarkupError> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().check_end_names = true;

        loop {
            let event = reader.read_event()?;
            let first = !std::mem::replace(&mut self.seen_event, true);
            match event {
                Event::Eof => break,
                Event::Start(start) => self.on_start(start, false)?,
                Event::Empty(start) => self.on_start(start, true)?,
                Event::End(end) => self.on_end(end)?,
                Event::Text(text) => self.on_text(text)?,
                Event::CData(cdata) => self.on_cdata(cdata)?,
                Event::Decl(_) if first => self.after_decl = true,
                Event::Decl(_) => return Err(MarkupError::MisplacedDeclaration),
                other => {
                    self.after_decl = false;
                    let depth = self.stack.len();
                    if !self.capture.as_ref().is_some_and(|capture| capture.owns(depth)) {
                        self.emit(other)?;
                    }
                }
            }
        }

        if let Some(frame) = self.stack.last() {
            return Err(MarkupError::UnclosedElement(frame.name.clone()));
        }
        if !self.seen_root {
            return Err(MarkupError::NoRootElement);
        }

        let tags = self.tags;
        let groups = self
            .groups
            .into_iter()
            .map(|slots| PropertyGroup {
                fields: tags
                    .fields
                    .iter()
                    .zip(slots)
                    .filter_map(|(tag, value)| {
                        value.map(|value| VersionField { tag: tag.to_string(), value })
                    })
                    .collect(),
            })
            .collect();

        Ok(PassOutput {
            groups,
            touched: self.touched,
            bytes: self.writer.map(Writer::into_inner),
        })
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), MarkupError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_event(event)?;
        }
        Ok(())
    }

    fn field_slot(&self, local_name: &[u8]) -> Option<usize> {
        self.tags.fields.iter().position(|tag| tag.as_bytes() == local_name)
    }

    fn on_start(&mut self, start: BytesStart<'_>, empty: bool) -> Result<(), MarkupError> {
        self.after_decl = false;
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = start.attributes();
        attributes.with_checks(true);
        for attribute in attributes {
            attribute?.unescape_value()?;
        }

        if self.stack.is_empty() {
            if self.seen_root {
                return Err(MarkupError::MultipleRoots(name));
            }
            self.seen_root = true;
        }

        // Children of a field are copied through but never searched for groups
        if let Some(capture) = self.capture.as_mut() {
            capture.seen_child = true;
            if empty {
                self.emit(Event::Empty(start))?;
            } else {
                self.emit(Event::Start(start))?;
                self.stack.push(Frame { name, group: None });
            }
            return Ok(());
        }

        let local_name = start.local_name();
        // the root element itself never counts as a group
        let is_group =
            !self.stack.is_empty() && local_name.as_ref() == self.tags.group.as_bytes();
        let recognized = self
            .stack
            .last()
            .and_then(|parent| parent.group)
            .zip(self.field_slot(local_name.as_ref()))
            .filter(|&(group, slot)| self.groups[group][slot].is_none());

        if let Some((group, slot)) = recognized {
            self.touched += 1;
            if let Some(value) = self.replacement {
                debug!("Replacing <{}> content with '{}'", name, value);
                self.emit(Event::Start(start.borrow()))?;
                self.emit(Event::Text(BytesText::new(value)))?;
                if empty {
                    self.emit(Event::End(BytesEnd::new(name.clone())))?;
                }
            }
            if empty {
                self.groups[group][slot] = Some(String::new());
            } else {
                self.stack.push(Frame { name, group: None });
                self.capture = Some(Capture {
                    depth: self.stack.len(),
                    group,
                    slot,
                    text: String::new(),
                    seen_child: false,
                });
            }
            return Ok(());
        }

        if empty {
            self.emit(Event::Empty(start))?;
        } else {
            self.emit(Event::Start(start))?;
        }

        let group = if is_group {
            self.groups.push(vec![None; self.tags.fields.len()]);
            Some(self.groups.len() - 1)
        } else {
            None
        };
        if !empty {
            self.stack.push(Frame { name, group });
        }
        Ok(())
    }

    fn on_end(&mut self, end: BytesEnd<'_>) -> Result<(), MarkupError> {
        self.after_decl = false;
        let depth = self.stack.len();
        if self.stack.pop().is_none() {
            let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
            return Err(MarkupError::UnexpectedEnd(name));
        }

        if let Some(capture) = self.capture.take() {
            if depth == capture.depth {
                self.groups[capture.group][capture.slot] = Some(capture.text);
            } else {
                self.capture = Some(capture);
            }
        }
        self.emit(Event::End(end))
    }

    fn on_text(&mut self, text: BytesText<'_>) -> Result<(), MarkupError> {
        let unescaped = text.unescape()?.into_owned();
        if self.stack.is_empty() {
            if !text.iter().all(u8::is_ascii_whitespace) {
                return Err(MarkupError::ContentOutsideRoot);
            }
            if std::mem::take(&mut self.after_decl) {
                return Ok(());
            }
            return self.emit(Event::Text(text));
        }

        let depth = self.stack.len();
        if let Some(capture) = self.capture.as_mut().filter(|capture| capture.owns(depth)) {
            capture.text.push_str(&unescaped);
            return Ok(());
        }
        self.emit(Event::Text(text))
    }

    fn on_cdata(&mut self, cdata: BytesCData<'_>) -> Result<(), MarkupError> {
        self.after_decl = false;
        if self.stack.is_empty() {
            return Err(MarkupError::ContentOutsideRoot);
        }

        let depth = self.stack.len();
        if let Some(capture) = self.capture.as_mut().filter(|capture| capture.owns(depth)) {
            capture.text.push_str(&String::from_utf8_lossy(&cdata));
            return Ok(());
        }
        self.emit(Event::CData(cdata))
    }
}
