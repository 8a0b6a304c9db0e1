//! Declarative entity codecs.
//!
//! # Design
//! Every entity describes itself once, as a static table of [`Field`]s. A
//! field names its wire key, the [`Slot`] that knows how to get and set the
//! value on the struct, and one [`Emit`] rule per format deciding whether a
//! write includes it. The XML and JSON engines in [`xml`] and [`json`] walk
//! these tables; no entity carries format-specific read or write code.
//!
//! Reading is driven by the payload: each key present on the wire is looked
//! up in the table, unknown keys are skipped. Writing is driven by the table:
//! fields are emitted in table order, which matters for XML because Redmine's
//! XML parser is order-sensitive for some resources.

pub mod json;
pub mod primitive;
pub mod xml;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::format::MimeFormat;
use crate::types::IdentifiableName;

use self::xml::{XmlElement, XmlWriter};

/// A type the codecs can read and write.
pub trait Resource: Default + Sized + 'static {
    /// Singular envelope, e.g. `project`. Also the item element name when the
    /// type appears inside a collection.
    const KEY: &'static str;

    /// Collection envelope and URL segment, e.g. `projects`. `None` for types
    /// that only appear nested inside other entities.
    const COLLECTION_KEY: Option<&'static str>;

    /// Whether the server answers `GET {collection}`. Attachments have a
    /// collection segment for get/update/delete by id but no index.
    const LISTABLE: bool = true;

    fn fields() -> &'static [Field<Self>];

    /// Server-assigned id, `0` until the entity is created.
    fn id(&self) -> i32;
}

/// When a write includes a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Read-only or server-managed.
    Never,
    Always,
    /// Only once the entity exists on the server (non-zero id).
    OnceCreated,
}

impl Emit {
    pub fn allows(self, id: i32) -> bool {
        match self {
            Emit::Never => false,
            Emit::Always => true,
            Emit::OnceCreated => id != 0,
        }
    }
}

/// One entry of an entity's field table.
pub struct Field<T: 'static> {
    pub key: &'static str,
    pub slot: Slot<T>,
    pub xml: Emit,
    pub json: Emit,
}

impl<T: 'static> Field<T> {
    pub fn emit(&self, format: MimeFormat) -> Emit {
        match format {
            MimeFormat::Xml => self.xml,
            MimeFormat::Json => self.json,
        }
    }
}

/// Typed access to one value on `T`: a getter for writes and a setter for
/// reads.
pub enum Slot<T: 'static> {
    Int(fn(&T) -> i32, fn(&mut T, i32)),
    Bool(fn(&T) -> Option<bool>, fn(&mut T, bool)),
    Text(fn(&T) -> Option<&str>, fn(&mut T, String)),
    DateTime(fn(&T) -> Option<DateTime<Utc>>, fn(&mut T, DateTime<Utc>)),
    /// `{id, name}` reference; written back as the bare id.
    Reference(
        fn(&T) -> Option<&IdentifiableName>,
        fn(&mut T, IdentifiableName),
    ),
    /// A reference carried as a bare integer, e.g. `parent_id`.
    ReferenceId(fn(&T) -> Option<i32>, fn(&mut T, i32)),
    /// A single value or an array of values under the same key.
    Values(fn(&T) -> &[String], fn(&mut T, Vec<String>)),
    /// An array of bare ids; the `&str` is the XML item element name.
    Ids(&'static str, fn(&T) -> Vec<i32>, fn(&mut T, Vec<i32>)),
    /// A nested collection of entities.
    List(&'static dyn ListSlot<T>),
}

/// Access to a `Vec<I>` of nested entities on `T`, with `I` erased so that
/// tables stay homogeneous.
pub trait ListSlot<T>: Sync {
    fn read_xml(&self, target: &mut T, element: &XmlElement) -> Result<()>;
    fn read_json(&self, target: &mut T, value: &Value) -> Result<()>;
    fn write_xml(&self, source: &T, key: &str, writer: &mut XmlWriter) -> Result<()>;
    fn write_json(&self, source: &T) -> Result<Value>;
}

/// The one [`ListSlot`] implementation, declared as a `static` next to the
/// table that references it.
pub struct Items<T: 'static, I: 'static> {
    pub get: fn(&T) -> &[I],
    pub set: fn(&mut T, Vec<I>),
}

impl<T: 'static, I: Resource> ListSlot<T> for Items<T, I> {
    fn read_xml(&self, target: &mut T, element: &XmlElement) -> Result<()> {
        let items = element
            .items(I::KEY)
            .map(xml::read_object::<I>)
            .collect::<Result<Vec<_>>>()?;
        (self.set)(target, items);
        Ok(())
    }

    fn read_json(&self, target: &mut T, value: &Value) -> Result<()> {
        let items = json::read_array::<I>(I::KEY, value)?;
        (self.set)(target, items);
        Ok(())
    }

    fn write_xml(&self, source: &T, key: &str, writer: &mut XmlWriter) -> Result<()> {
        writer.start_array(key)?;
        for item in (self.get)(source) {
            xml::write_object(item, I::KEY, writer)?;
        }
        writer.end(key)
    }

    fn write_json(&self, source: &T) -> Result<Value> {
        (self.get)(source)
            .iter()
            .map(|item| json::write_object(item).map(Value::Object))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

pub(crate) fn find_field<T: Resource>(key: &str) -> Option<&'static Field<T>> {
    T::fields().iter().find(|field| field.key == key)
}

/// Fields of `entity` a write in `format` should include, in table order.
pub(crate) fn writable_fields<T: Resource>(
    entity: &T,
    format: MimeFormat,
) -> impl Iterator<Item = &'static Field<T>> {
    let id = entity.id();
    T::fields()
        .iter()
        .filter(move |field| field.emit(format).allows(id))
}

/// A decoded JSON dictionary.
pub type JsonObject = Map<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_rules() {
        assert!(!Emit::Never.allows(7));
        assert!(Emit::Always.allows(0));
        assert!(!Emit::OnceCreated.allows(0));
        assert!(Emit::OnceCreated.allows(7));
    }

    #[test]
    fn nested_lists_skip_foreign_elements() {
        let root = xml::parse_document(
            r#"<project><id>1</id><trackers type="array"><tracker id="1" name="Bug"/><note>x</note></trackers></project>"#,
        )
        .unwrap();
        let project: crate::types::Project = xml::read_object(&root).unwrap();
        assert_eq!(project.trackers.len(), 1);
        assert_eq!(project.trackers[0].id, 1);
        assert_eq!(project.trackers[0].name.as_deref(), Some("Bug"));
    }
}
