use chrono::{DateTime, Utc};

use super::IdentifiableName;
use crate::codec::{Emit, Field, Resource, Slot};
use crate::keys;

/// A file published in a project's Files section.
///
/// Creating one is a two-step affair: upload the bytes to get a `token`, then
/// post a `File` carrying that token and optionally the version it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct File {
    pub id: i32,
    pub filename: Option<String>,
    pub filesize: i32,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub content_url: Option<String>,
    pub author: Option<IdentifiableName>,
    pub created_on: Option<DateTime<Utc>>,
    pub version: Option<IdentifiableName>,
    pub digest: Option<String>,
    pub downloads: i32,
    pub token: Option<String>,
}

static FIELDS: &[Field<File>] = &[
    Field {
        key: keys::TOKEN,
        slot: Slot::Text(|f| f.token.as_deref(), |f, v| f.token = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::VERSION_ID,
        slot: Slot::ReferenceId(
            |f| f.version.as_ref().map(|version| version.id),
            |f, id| f.version = Some(IdentifiableName::new(id)),
        ),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::FILENAME,
        slot: Slot::Text(|f| f.filename.as_deref(), |f, v| f.filename = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::DESCRIPTION,
        slot: Slot::Text(|f| f.description.as_deref(), |f, v| f.description = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::ID,
        slot: Slot::Int(|f| f.id, |f, v| f.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::FILESIZE,
        slot: Slot::Int(|f| f.filesize, |f, v| f.filesize = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CONTENT_TYPE,
        slot: Slot::Text(|f| f.content_type.as_deref(), |f, v| f.content_type = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CONTENT_URL,
        slot: Slot::Text(|f| f.content_url.as_deref(), |f, v| f.content_url = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::AUTHOR,
        slot: Slot::Reference(|f| f.author.as_ref(), |f, v| f.author = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CREATED_ON,
        slot: Slot::DateTime(|f| f.created_on, |f, v| f.created_on = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::VERSION,
        slot: Slot::Reference(|f| f.version.as_ref(), |f, v| f.version = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::DIGEST,
        slot: Slot::Text(|f| f.digest.as_deref(), |f, v| f.digest = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::DOWNLOADS,
        slot: Slot::Int(|f| f.downloads, |f, v| f.downloads = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for File {
    const KEY: &'static str = keys::FILE;
    const COLLECTION_KEY: Option<&'static str> = Some(keys::FILES);

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
    use crate::codec::json;
    use crate::codec::xml::{write_object, XmlWriter};
    use serde_json::json;

    #[test]
    fn writes_upload_fields_in_order() {
        let file = File {
            token: Some("21.01a1d7b1c2ffcbbc9ecf14debeec27d8".to_string()),
            version: Some(IdentifiableName::new(2)),
            filename: Some("foo-1.0-src.tar.tgz".to_string()),
            description: Some("Foo App source code".to_string()),
            downloads: 12,
            ..File::default()
        };
        let mut writer = XmlWriter::new();
        write_object(&file, keys::FILE, &mut writer).unwrap();
        assert_eq!(
            writer.into_string().unwrap(),
            "<file><token>21.01a1d7b1c2ffcbbc9ecf14debeec27d8</token>\
             <version_id>2</version_id><filename>foo-1.0-src.tar.tgz</filename>\
             <description>Foo App source code</description></file>"
        );
    }

    #[test]
    fn reads_version_reference_from_json() {
        let payload = json!({
            "id": 12,
            "filename": "foo-1.0-setup.exe",
            "filesize": 74753799,
            "content_type": "application/octet-stream",
            "author": {"id": 1, "name": "Redmine Admin"},
            "version": {"id": 2, "name": "1.0"},
            "digest": "1276481102f218c981e0324180bafd9f",
            "downloads": 12,
            "created_on": "2017-01-04T09:12:32Z",
        });
        let file: File = json::read_object(payload.as_object().unwrap()).unwrap();
        assert_eq!(file.version, Some(IdentifiableName::new(2)));
        assert_eq!(file.downloads, 12);
        assert_eq!(file.filesize, 74_753_799);
        assert_eq!(file.token, None);
    }

    #[test]
    fn equality_covers_every_field() {
        let base = File {
            id: 1,
            filename: Some("a.txt".to_string()),
            ..File::default()
        };
        let mut other = base.clone();
        assert_eq!(base, other);
        other.downloads = 1;
        assert_ne!(base, other);
    }
}
