use chrono::{DateTime, Utc};

use super::IdentifiableName;
use crate::codec::{Emit, Field, Items, Resource, Slot};
use crate::keys;

/// A Redmine project.
///
/// Projects are the same object when both the id and the identifier match;
/// every other field is mutable on the server.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub id: i32,
    pub name: Option<String>,
    /// URL slug, unique per installation and fixed after creation.
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub parent: Option<IdentifiableName>,
    pub homepage: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub trackers: Vec<ProjectTracker>,
}

impl Project {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.identifier == other.identifier
    }
}

/// A tracker enabled on a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectTracker {
    pub id: i32,
    pub name: Option<String>,
}

static TRACKERS: Items<Project, ProjectTracker> = Items {
    get: |p| p.trackers.as_slice(),
    set: |p, v| p.trackers = v,
};

// parent_id and homepage are only accepted by the XML endpoint on update.
static PROJECT_FIELDS: &[Field<Project>] = &[
    Field {
        key: keys::NAME,
        slot: Slot::Text(|p| p.name.as_deref(), |p, v| p.name = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::IDENTIFIER,
        slot: Slot::Text(|p| p.identifier.as_deref(), |p, v| p.identifier = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::DESCRIPTION,
        slot: Slot::Text(|p| p.description.as_deref(), |p, v| p.description = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::PARENT_ID,
        slot: Slot::ReferenceId(
            |p| p.parent.as_ref().map(|parent| parent.id),
            |p, id| p.parent = Some(IdentifiableName::new(id)),
        ),
        xml: Emit::OnceCreated,
        json: Emit::Always,
    },
    Field {
        key: keys::HOMEPAGE,
        slot: Slot::Text(|p| p.homepage.as_deref(), |p, v| p.homepage = Some(v)),
        xml: Emit::OnceCreated,
        json: Emit::Always,
    },
    Field {
        key: keys::ID,
        slot: Slot::Int(|p| p.id, |p, v| p.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::PARENT,
        slot: Slot::Reference(|p| p.parent.as_ref(), |p, v| p.parent = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CREATED_ON,
        slot: Slot::DateTime(|p| p.created_on, |p, v| p.created_on = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::UPDATED_ON,
        slot: Slot::DateTime(|p| p.updated_on, |p, v| p.updated_on = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::TRACKERS,
        slot: Slot::List(&TRACKERS),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

static TRACKER_FIELDS: &[Field<ProjectTracker>] = &[
    Field {
        key: keys::ID,
        slot: Slot::Int(|t| t.id, |t, v| t.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::NAME,
        slot: Slot::Text(|t| t.name.as_deref(), |t, v| t.name = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for Project {
    const KEY: &'static str = keys::PROJECT;
    const COLLECTION_KEY: Option<&'static str> = Some(keys::PROJECTS);

    fn fields() -> &'static [Field<Self>] {
        PROJECT_FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}

impl Resource for ProjectTracker {
    const KEY: &'static str = keys::TRACKER;
    const COLLECTION_KEY: Option<&'static str> = None;

    fn fields() -> &'static [Field<Self>] {
        TRACKER_FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}
