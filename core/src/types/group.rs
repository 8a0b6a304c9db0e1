use super::{IssueCustomField, Membership};
use crate::codec::{Emit, Field, Items, Resource, Slot};
use crate::keys;

/// A user group.
///
/// Members are read from `users` (`include=users`) and written back as the
/// bare `user_ids` list Redmine expects on create and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: i32,
    pub name: Option<String>,
    pub users: Vec<GroupUser>,
    pub custom_fields: Vec<IssueCustomField>,
    pub memberships: Vec<Membership>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A member of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUser {
    pub id: i32,
    pub name: Option<String>,
}

impl GroupUser {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }
}

static USERS: Items<Group, GroupUser> = Items {
    get: |g| g.users.as_slice(),
    set: |g, v| g.users = v,
};

static CUSTOM_FIELDS: Items<Group, IssueCustomField> = Items {
    get: |g| g.custom_fields.as_slice(),
    set: |g, v| g.custom_fields = v,
};

static MEMBERSHIPS: Items<Group, Membership> = Items {
    get: |g| g.memberships.as_slice(),
    set: |g, v| g.memberships = v,
};

static GROUP_FIELDS: &[Field<Group>] = &[
    Field {
        key: keys::NAME,
        slot: Slot::Text(|g| g.name.as_deref(), |g, v| g.name = Some(v)),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::USER_IDS,
        slot: Slot::Ids(
            keys::USER_ID,
            |g| g.users.iter().map(|user| user.id).collect(),
            |g, ids| g.users = ids.into_iter().map(GroupUser::new).collect(),
        ),
        xml: Emit::Always,
        json: Emit::Always,
    },
    Field {
        key: keys::ID,
        slot: Slot::Int(|g| g.id, |g, v| g.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::USERS,
        slot: Slot::List(&USERS),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::CUSTOM_FIELDS,
        slot: Slot::List(&CUSTOM_FIELDS),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::MEMBERSHIPS,
        slot: Slot::List(&MEMBERSHIPS),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

static USER_FIELDS: &[Field<GroupUser>] = &[
    Field {
        key: keys::ID,
        slot: Slot::Int(|u| u.id, |u, v| u.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::NAME,
        slot: Slot::Text(|u| u.name.as_deref(), |u, v| u.name = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for Group {
    const KEY: &'static str = keys::GROUP;
    const COLLECTION_KEY: Option<&'static str> = Some(keys::GROUPS);

    fn fields() -> &'static [Field<Self>] {
        GROUP_FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}

impl Resource for GroupUser {
    const KEY: &'static str = keys::USER;
    const COLLECTION_KEY: Option<&'static str> = None;

    fn fields() -> &'static [Field<Self>] {
        USER_FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}
