//! Format dispatch: picks the codec and envelope convention for a
//! [`MimeFormat`].
//!
//! Single entities travel in an envelope named by [`Resource::KEY`]
//! (`<project>..</project>`, `{"project": {..}}`); lists in one named by
//! [`Resource::COLLECTION_KEY`] together with their paging counters.

use serde_json::Value;

use crate::codec::json::{self, as_object};
use crate::codec::xml::{self, parse_document, XmlWriter};
use crate::codec::{JsonObject, Resource};
use crate::error::{RedmineError, Result};
use crate::format::MimeFormat;
use crate::keys;
use crate::pagination::{self, PaginatedObjects};
use crate::types::Attachments;

fn parse_json(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

fn to_json_string(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| RedmineError::SerializationError(e.to_string()))
}

/// Decode one entity from its singular envelope.
pub fn decode<T: Resource>(format: MimeFormat, body: &str) -> Result<T> {
    match format {
        MimeFormat::Xml => {
            let root = parse_document(body)?;
            if root.name != T::KEY {
                return Err(RedmineError::format(format!(
                    "expected a <{}> document, found <{}>",
                    T::KEY,
                    root.name
                )));
            }
            xml::read_object(&root)
        }
        MimeFormat::Json => {
            let document = parse_json(body)?;
            let inner = as_object("document", &document)?
                .get(T::KEY)
                .filter(|value| !value.is_null())
                .ok_or_else(|| {
                    RedmineError::format(format!("document has no `{}` object", T::KEY))
                })?;
            json::read_object(as_object(T::KEY, inner)?)
        }
    }
}

/// Decode a page of entities from their collection envelope.
pub fn decode_list<T: Resource>(format: MimeFormat, body: &str) -> Result<PaginatedObjects<T>> {
    let collection = T::COLLECTION_KEY.ok_or(RedmineError::UnsupportedType {
        type_name: T::KEY,
        format,
    })?;
    match format {
        MimeFormat::Xml => pagination::from_xml(&parse_document(body)?, collection),
        MimeFormat::Json => pagination::from_json(&parse_json(body)?, collection),
    }
}

/// Encode the writable fields of `entity` in its singular envelope.
pub fn encode<T: Resource>(format: MimeFormat, entity: &T) -> Result<String> {
    match format {
        MimeFormat::Xml => {
            let mut writer = XmlWriter::new();
            writer.declaration()?;
            xml::write_object(entity, T::KEY, &mut writer)?;
            writer.into_string()
        }
        MimeFormat::Json => {
            let mut root = JsonObject::new();
            root.insert(T::KEY.to_string(), Value::Object(json::write_object(entity)?));
            to_json_string(&Value::Object(root))
        }
    }
}

/// Body of `POST /groups/{id}/users`: a bare `user_id`.
pub fn encode_user_id(format: MimeFormat, user_id: i32) -> Result<String> {
    match format {
        MimeFormat::Xml => {
            let mut writer = XmlWriter::new();
            writer.declaration()?;
            writer.text_element(keys::USER_ID, &user_id.to_string())?;
            writer.into_string()
        }
        MimeFormat::Json => {
            let mut root = JsonObject::new();
            root.insert(keys::USER_ID.to_string(), Value::from(user_id));
            to_json_string(&Value::Object(root))
        }
    }
}

/// Decode the messages of a 422 response:
/// `<errors><error>..</error></errors>` or `{"errors": [..]}`.
pub fn decode_errors(format: MimeFormat, body: &str) -> Result<Vec<String>> {
    match format {
        MimeFormat::Xml => {
            let root = parse_document(body)?;
            if root.name != keys::ERRORS {
                return Err(RedmineError::format(format!(
                    "expected an <errors> document, found <{}>",
                    root.name
                )));
            }
            Ok(root
                .children
                .iter()
                .filter(|child| child.name == keys::ERROR)
                .map(xml::read_string)
                .collect())
        }
        MimeFormat::Json => {
            let document = parse_json(body)?;
            let root = as_object("document", &document)?;
            match json::get_values(root, keys::ERRORS)? {
                Some(messages) => Ok(messages),
                None => Err(RedmineError::format("document has no `errors` array")),
            }
        }
    }
}

/// Encode a batch of attachment edits. Redmine only accepts these as JSON.
pub fn encode_attachments(format: MimeFormat, attachments: &Attachments) -> Result<String> {
    if format == MimeFormat::Xml {
        return Err(RedmineError::UnsupportedType {
            type_name: keys::ATTACHMENTS,
            format,
        });
    }
    let mut batch = JsonObject::new();
    for (id, attachment) in &attachments.0 {
        batch.insert(id.to_string(), Value::Object(json::write_object(attachment)?));
    }
    let mut root = JsonObject::new();
    root.insert(keys::ATTACHMENTS.to_string(), Value::Object(batch));
    to_json_string(&Value::Object(root))
}
