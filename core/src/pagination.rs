//! Collection envelopes and their paging metadata.
//!
//! Redmine wraps every list in an envelope named after the collection and
//! reports `total_count`, `offset` and `limit` alongside it: as attributes of
//! the root element in XML, as sibling keys of the array in JSON. Older
//! servers and some endpoints omit them, in which case the page is assumed to
//! be the whole collection.

use serde_json::Value;

use crate::codec::json::{self, as_object};
use crate::codec::primitive::read_int;
use crate::codec::xml::{self, XmlElement};
use crate::codec::Resource;
use crate::error::{RedmineError, Result};
use crate::keys;

/// One page of a collection as reported by the server.
///
/// The counters are surfaced as received; nothing checks that
/// `objects.len() <= limit` or that the page lies within `total_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedObjects<T> {
    pub objects: Vec<T>,
    pub total_count: i32,
    pub offset: i32,
    pub limit: i32,
}

impl<T> PaginatedObjects<T> {
    /// Assemble a page, defaulting missing counters to "this is everything".
    pub fn new(
        objects: Vec<T>,
        total_count: Option<i32>,
        offset: Option<i32>,
        limit: Option<i32>,
    ) -> Self {
        let len = i32::try_from(objects.len()).unwrap_or(i32::MAX);
        Self {
            objects,
            total_count: total_count.unwrap_or(len),
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(len),
        }
    }

    /// Offset of the page after this one.
    pub fn next_offset(&self) -> i32 {
        let len = i32::try_from(self.objects.len()).unwrap_or(i32::MAX);
        self.offset.saturating_add(len)
    }

    /// Whether another request with [`next_offset`](Self::next_offset) would
    /// return more objects. An empty page always ends the walk.
    pub fn has_next_page(&self) -> bool {
        !self.objects.is_empty() && self.next_offset() < self.total_count
    }
}

fn attribute_int(root: &XmlElement, key: &str) -> Result<Option<i32>> {
    root.attribute(key).map(|value| read_int(key, value)).transpose()
}

/// Read `<collection total_count=".." offset=".." limit="..">` and its items.
pub fn from_xml<T: Resource>(root: &XmlElement, collection: &str) -> Result<PaginatedObjects<T>> {
    if root.name != collection {
        return Err(RedmineError::format(format!(
            "expected a <{collection}> document, found <{}>",
            root.name
        )));
    }
    let objects = root
        .items(T::KEY)
        .map(xml::read_object::<T>)
        .collect::<Result<Vec<_>>>()?;
    Ok(PaginatedObjects::new(
        objects,
        attribute_int(root, keys::TOTAL_COUNT)?,
        attribute_int(root, keys::OFFSET)?,
        attribute_int(root, keys::LIMIT)?,
    ))
}

/// Read `{"<collection>": [..], "total_count": .., "offset": .., "limit": ..}`.
pub fn from_json<T: Resource>(document: &Value, collection: &str) -> Result<PaginatedObjects<T>> {
    let root = as_object("document", document)?;
    let items = root
        .get(collection)
        .filter(|value| !value.is_null())
        .ok_or_else(|| {
            RedmineError::format(format!("document has no `{collection}` array"))
        })?;
    Ok(PaginatedObjects::new(
        json::read_array(collection, items)?,
        json::get_int(root, keys::TOTAL_COUNT)?,
        json::get_int(root, keys::OFFSET)?,
        json::get_int(root, keys::LIMIT)?,
    ))
}
