//! XML side of the codecs.
//!
//! Documents are read with quick-xml into a small owned [`XmlElement`] tree
//! and then projected onto entities through their field tables. The tree
//! keeps whether an element was written self-closing, because Redmine uses
//! `<description/>` for "no value" and `<description></description>` for an
//! empty string.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::trace;

use super::primitive::{read_bool, read_int, read_nullable_datetime, write_datetime};
use super::{find_field, writable_fields, Field, Resource, Slot};
use crate::error::{RedmineError, Result};
use crate::format::MimeFormat;
use crate::keys;
use crate::types::IdentifiableName;

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    pub self_closing: bool,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `<x/>` with no attributes carries nothing and is treated as absent.
    pub fn is_absent(&self) -> bool {
        self.self_closing && self.attributes.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.attribute(keys::TYPE) == Some("array") || !self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Present children named `item`. Anything else inside a collection is
    /// skipped.
    pub fn items<'a>(&'a self, item: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| {
            if child.name != item {
                trace!(collection = %self.name, element = %child.name, "skipping unknown XML element");
                return false;
            }
            !child.is_absent()
        })
    }

    fn open(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                RedmineError::format(format!("invalid attribute on <{name}>: {e}"))
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if key.starts_with("xmlns") {
                continue;
            }
            let value = unescape_text(&String::from_utf8_lossy(&attr.value))?;
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
            self_closing,
        })
    }
}

fn unescape_text(raw: &str) -> Result<String> {
    unescape(raw)
        .map(|text| text.into_owned())
        .map_err(|e| RedmineError::format(format!("invalid XML escape: {e}")))
}

/// Parse a document and return its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut open: Vec<XmlElement> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| RedmineError::format(format!("invalid XML: {e}")))?;
        let finished = match event {
            Event::Start(start) => {
                open.push(XmlElement::open(&start, false)?);
                None
            }
            Event::Empty(start) => Some(XmlElement::open(&start, true)?),
            Event::End(_) => Some(
                open.pop()
                    .ok_or_else(|| RedmineError::format("unbalanced closing tag"))?,
            ),
            Event::Text(text) => {
                if let Some(current) = open.last_mut() {
                    current
                        .text
                        .push_str(&unescape_text(&String::from_utf8_lossy(&text))?);
                }
                None
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
                None
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = open.last_mut() {
                    let entity = format!("&{};", String::from_utf8_lossy(&reference));
                    current.text.push_str(&unescape_text(&entity)?);
                }
                None
            }
            Event::Eof => {
                return Err(RedmineError::format("document has no complete root element"))
            }
            _ => None,
        };

        if let Some(element) = finished {
            match open.last_mut() {
                Some(parent) => parent.children.push(element),
                None => return Ok(element),
            }
        }
    }
}

/// Thin wrapper over the quick-xml writer with the handful of shapes the
/// Redmine schema uses.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| RedmineError::SerializationError(e.to_string()))
    }

    pub fn declaration(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start(&mut self, name: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    /// Opens `<name type="array">`, the wrapper Redmine expects around
    /// repeated children.
    pub fn start_array(&mut self, name: &str) -> Result<()> {
        let mut element = BytesStart::new(name);
        element.push_attribute((keys::TYPE, "array"));
        self.write(Event::Start(element))
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|e| RedmineError::SerializationError(e.to_string()))
    }
}

/// Read an entity from its element: attributes first, then children.
pub fn read_object<T: Resource>(element: &XmlElement) -> Result<T> {
    let mut target = T::default();

    for (name, value) in &element.attributes {
        match find_field::<T>(name) {
            Some(field) => read_attribute(field, &mut target, value)?,
            None => trace!(entity = T::KEY, attribute = %name, "skipping unknown XML attribute"),
        }
    }

    for child in &element.children {
        if child.is_absent() {
            continue;
        }
        match find_field::<T>(&child.name) {
            Some(field) => read_element(field, &mut target, child)?,
            None => trace!(entity = T::KEY, element = %child.name, "skipping unknown XML element"),
        }
    }

    Ok(target)
}

pub fn read_string(element: &XmlElement) -> String {
    element.text.clone()
}

pub fn read_identifiable_name(element: &XmlElement) -> Result<IdentifiableName> {
    read_object(element)
}

fn read_attribute<T>(field: &Field<T>, target: &mut T, value: &str) -> Result<()> {
    let key = field.key;
    match &field.slot {
        Slot::Int(_, set) | Slot::ReferenceId(_, set) => set(target, read_int(key, value)?),
        Slot::Bool(_, set) => set(target, read_bool(key, value)?),
        Slot::Text(_, set) => set(target, value.to_string()),
        Slot::DateTime(_, set) => {
            if let Some(parsed) = read_nullable_datetime(key, value)? {
                set(target, parsed);
            }
        }
        Slot::Reference(..) | Slot::Values(..) | Slot::Ids(..) | Slot::List(_) => {
            trace!(field = key, "structured field cannot come from an attribute");
        }
    }
    Ok(())
}

fn read_element<T>(field: &Field<T>, target: &mut T, element: &XmlElement) -> Result<()> {
    let key = field.key;
    match &field.slot {
        Slot::Int(_, set) | Slot::ReferenceId(_, set) => set(target, read_int(key, &element.text)?),
        Slot::Bool(_, set) => set(target, read_bool(key, &element.text)?),
        Slot::Text(_, set) => set(target, read_string(element)),
        Slot::DateTime(_, set) => {
            if let Some(parsed) = read_nullable_datetime(key, &element.text)? {
                set(target, parsed);
            }
        }
        Slot::Reference(_, set) => set(target, read_identifiable_name(element)?),
        Slot::Values(_, set) => {
            let values = if element.is_array() {
                element.children.iter().map(read_string).collect()
            } else {
                vec![read_string(element)]
            };
            set(target, values);
        }
        Slot::Ids(item, _, set) => {
            let ids = element
                .items(item)
                .map(|child| read_int(key, &child.text))
                .collect::<Result<Vec<_>>>()?;
            set(target, ids);
        }
        Slot::List(list) => list.read_xml(target, element)?,
    }
    Ok(())
}

/// Write `entity` as `<name>...</name>` with the fields its table allows.
pub fn write_object<T: Resource>(entity: &T, name: &str, writer: &mut XmlWriter) -> Result<()> {
    writer.start(name)?;
    for field in writable_fields(entity, MimeFormat::Xml) {
        write_field(field, entity, writer)?;
    }
    writer.end(name)
}

fn write_field<T>(field: &Field<T>, entity: &T, writer: &mut XmlWriter) -> Result<()> {
    let key = field.key;
    match &field.slot {
        Slot::Int(get, _) => writer.text_element(key, &get(entity).to_string())?,
        Slot::Bool(get, _) => {
            if let Some(value) = get(entity) {
                writer.text_element(key, if value { "true" } else { "false" })?;
            }
        }
        Slot::Text(get, _) => {
            if let Some(value) = get(entity) {
                writer.text_element(key, value)?;
            }
        }
        Slot::DateTime(get, _) => {
            if let Some(value) = get(entity) {
                writer.text_element(key, &write_datetime(&value))?;
            }
        }
        Slot::Reference(get, _) => {
            if let Some(reference) = get(entity) {
                writer.text_element(key, &reference.id.to_string())?;
            }
        }
        Slot::ReferenceId(get, _) => {
            if let Some(id) = get(entity) {
                writer.text_element(key, &id.to_string())?;
            }
        }
        Slot::Values(get, _) => match get(entity) {
            [] => {}
            [single] => writer.text_element(key, single)?,
            values => {
                writer.start_array(key)?;
                for value in values {
                    writer.text_element(key, value)?;
                }
                writer.end(key)?;
            }
        },
        Slot::Ids(item, get, _) => {
            writer.start_array(key)?;
            for id in get(entity) {
                writer.text_element(item, &id.to_string())?;
            }
            writer.end(key)?;
        }
        Slot::List(list) => list.write_xml(entity, key, writer)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <id>1</id>
  <parent id="3" name="Parent &amp; Co"/>
  <trackers type="array"><tracker id="1" name="Bug"/></trackers>
</project>"#,
        )
        .unwrap();
        assert_eq!(root.name, "project");
        assert_eq!(root.child("id").unwrap().text, "1");
        let parent = root.child("parent").unwrap();
        assert!(parent.self_closing);
        assert_eq!(parent.attribute("name"), Some("Parent & Co"));
        let trackers = root.child("trackers").unwrap();
        assert!(trackers.is_array());
        assert_eq!(trackers.children.len(), 1);
    }

    #[test]
    fn self_closing_without_attributes_is_absent() {
        let root = parse_document("<p><a/><b></b><c id=\"1\"/></p>").unwrap();
        assert!(root.child("a").unwrap().is_absent());
        assert!(!root.child("b").unwrap().is_absent());
        assert!(!root.child("c").unwrap().is_absent());
    }

    #[test]
    fn id_arrays_skip_foreign_elements() {
        let root = parse_document(
            r#"<group><id>1</id><user_ids type="array"><user_id>5</user_id><note>x</note><user_id>8</user_id></user_ids></group>"#,
        )
        .unwrap();
        let group: crate::types::Group = read_object(&root).unwrap();
        let ids: Vec<i32> = group.users.iter().map(|user| user.id).collect();
        assert_eq!(ids, vec![5, 8]);
    }

    #[test]
    fn resolves_entities_in_text() {
        let root = parse_document("<name>R&amp;D &lt;core&gt; &#65;</name>").unwrap();
        assert_eq!(root.text, "R&D <core> A");
    }

    #[test]
    fn keeps_cdata_verbatim() {
        let root = parse_document("<description><![CDATA[<b>bold</b>]]></description>").unwrap();
        assert_eq!(root.text, "<b>bold</b>");
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = parse_document("<project><id>1</name></project>").unwrap_err();
        assert!(matches!(err, RedmineError::FormatError(_)));
    }

    #[test]
    fn rejects_truncated_document() {
        let err = parse_document("<project><id>1</id>").unwrap_err();
        assert!(matches!(err, RedmineError::FormatError(_)));
    }

    #[test]
    fn writer_escapes_text() {
        let mut writer = XmlWriter::new();
        writer.start("project").unwrap();
        writer.text_element("name", "R&D <core>").unwrap();
        writer.end("project").unwrap();
        assert_eq!(
            writer.into_string().unwrap(),
            "<project><name>R&amp;D &lt;core&gt;</name></project>"
        );
    }

    #[test]
    fn writer_marks_arrays() {
        let mut writer = XmlWriter::new();
        writer.start_array("user_ids").unwrap();
        writer.text_element("user_id", "5").unwrap();
        writer.end("user_ids").unwrap();
        assert_eq!(
            writer.into_string().unwrap(),
            r#"<user_ids type="array"><user_id>5</user_id></user_ids>"#
        );
    }
}
