use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::IdentifiableName;
use crate::codec::{Emit, Field, Resource, Slot};
use crate::keys;

/// A file attached to an issue, wiki page or other container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub id: i32,
    pub filename: Option<String>,
    pub filesize: i32,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub content_url: Option<String>,
    pub author: Option<IdentifiableName>,
    pub created_on: Option<DateTime<Utc>>,
}

/// A batch of attachment edits keyed by attachment id, as accepted by
/// `PATCH /attachments/issues/{id}.json`. Redmine offers no XML form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachments(pub BTreeMap<i32, Attachment>);

impl Attachments {
    pub fn single(attachment: Attachment) -> Self {
        Self(BTreeMap::from([(attachment.id, attachment)]))
    }
}

static FIELDS: &[Field<Attachment>] = &[
    Field {
        key: keys::FILENAME,
        slot: Slot::Text(|a| a.filename.as_deref(), |a, v| a.filename = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::DESCRIPTION,
        slot: Slot::Text(|a| a.description.as_deref(), |a, v| a.description = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::ID,
        slot: Slot::Int(|a| a.id, |a, v| a.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::FILESIZE,
        slot: Slot::Int(|a| a.filesize, |a, v| a.filesize = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CONTENT_TYPE,
        slot: Slot::Text(|a| a.content_type.as_deref(), |a, v| a.content_type = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CONTENT_URL,
        slot: Slot::Text(|a| a.content_url.as_deref(), |a, v| a.content_url = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::AUTHOR,
        slot: Slot::Reference(|a| a.author.as_ref(), |a, v| a.author = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CREATED_ON,
        slot: Slot::DateTime(|a| a.created_on, |a, v| a.created_on = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for Attachment {
    const KEY: &'static str = keys::ATTACHMENT;
    const COLLECTION_KEY: Option<&'static str> = Some(keys::ATTACHMENTS);
    const LISTABLE: bool = false;

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::xml::{parse_document, read_object};

    #[test]
    fn reads_xml_attachment() {
        let root = parse_document(
            r#"<attachment>
  <id>6243</id>
  <filename>test.txt</filename>
  <filesize>124</filesize>
  <content_type>text/plain</content_type>
  <description>This is an attachment</description>
  <content_url>http://localhost:3000/attachments/download/6243/test.txt</content_url>
  <author name="Jean-Philippe Lang" id="1"/>
  <created_on>2011-07-18T22:58:40+02:00</created_on>
</attachment>"#,
        )
        .unwrap();
        let attachment: Attachment = read_object(&root).unwrap();
        assert_eq!(attachment.id, 6243);
        assert_eq!(attachment.filesize, 124);
        assert_eq!(
            attachment.author.as_ref().and_then(|a| a.name.as_deref()),
            Some("Jean-Philippe Lang")
        );
        assert_eq!(
            attachment.created_on.map(|d| d.to_rfc3339()),
            Some("2011-07-18T20:58:40+00:00".to_string())
        );
    }

    #[test]
    fn single_keys_by_id() {
        let batch = Attachments::single(Attachment {
            id: 7,
            ..Attachment::default()
        });
        assert!(batch.0.contains_key(&7));
    }
}
