use crate::codec::{Emit, Field, Resource, Slot};
use crate::keys;

/// The receipt for bytes posted to `/uploads`, and the reference used to
/// attach them to an issue or a file afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    pub token: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
}

static FIELDS: &[Field<Upload>] = &[
    Field {
        key: keys::TOKEN,
        slot: Slot::Text(|u| u.token.as_deref(), |u, v| u.token = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::FILENAME,
        slot: Slot::Text(|u| u.filename.as_deref(), |u, v| u.filename = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::CONTENT_TYPE,
        slot: Slot::Text(|u| u.content_type.as_deref(), |u, v| u.content_type = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::DESCRIPTION,
        slot: Slot::Text(|u| u.description.as_deref(), |u, v| u.description = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
];

impl Resource for Upload {
    const KEY: &'static str = keys::UPLOAD;
    const COLLECTION_KEY: Option<&'static str> = None;

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    // Uploads are identified by token only.
    fn id(&self) -> i32 {
        0
    }
}
