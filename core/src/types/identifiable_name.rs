use std::hash::{Hash, Hasher};

use crate::codec::{Emit, Field, Resource, Slot};
use crate::keys;

/// A `{id, name}` reference to another entity, such as a project's parent or
/// an attachment's author.
///
/// Two references are equal when they point at the same id; the name is only
/// what the server chose to display.
#[derive(Debug, Clone, Default)]
pub struct IdentifiableName {
    pub id: i32,
    pub name: Option<String>,
}

impl IdentifiableName {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

impl PartialEq for IdentifiableName {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IdentifiableName {}

impl Hash for IdentifiableName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

static FIELDS: &[Field<IdentifiableName>] = &[
    Field {
        key: keys::ID,
        slot: Slot::Int(|r| r.id, |r, v| r.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::NAME,
        slot: Slot::Text(|r| r.name.as_deref(), |r, v| r.name = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for IdentifiableName {
    // Only ever nested under the referring field's own key.
    const KEY: &'static str = "reference";
    const COLLECTION_KEY: Option<&'static str> = None;

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}
