use super::IdentifiableName;
use crate::codec::{Emit, Field, Items, Resource, Slot};
use crate::keys;

/// A user's or group's membership of a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Membership {
    pub id: i32,
    pub project: Option<IdentifiableName>,
    pub user: Option<IdentifiableName>,
    pub group: Option<IdentifiableName>,
    pub roles: Vec<MembershipRole>,
}

/// A role granted through a membership. `inherited` marks roles that come
/// from a group rather than being granted directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipRole {
    pub id: i32,
    pub name: Option<String>,
    pub inherited: Option<bool>,
}

static ROLES: Items<Membership, MembershipRole> = Items {
    get: |m| m.roles.as_slice(),
    set: |m, v| m.roles = v,
};

static MEMBERSHIP_FIELDS: &[Field<Membership>] = &[
    Field {
        key: keys::ID,
        slot: Slot::Int(|m| m.id, |m, v| m.id = v),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::PROJECT,
        slot: Slot::Reference(|m| m.project.as_ref(), |m, v| m.project = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::USER,
        slot: Slot::Reference(|m| m.user.as_ref(), |m, v| m.user = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::GROUP,
        slot: Slot::Reference(|m| m.group.as_ref(), |m, v| m.group = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
    Field {
        key: keys::ROLES,
        slot: Slot::List(&ROLES),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

static ROLE_FIELDS: &[Field<MembershipRole>] = &[
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
    Field {
        key: keys::INHERITED,
        slot: Slot::Bool(|r| r.inherited, |r, v| r.inherited = Some(v)),
        xml: Emit::Never,
        json: Emit::Never,
    },
];

impl Resource for Membership {
    const KEY: &'static str = keys::MEMBERSHIP;
    const COLLECTION_KEY: Option<&'static str> = Some(keys::MEMBERSHIPS);

    fn fields() -> &'static [Field<Self>] {
        MEMBERSHIP_FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}

impl Resource for MembershipRole {
    const KEY: &'static str = keys::ROLE;
    const COLLECTION_KEY: Option<&'static str> = None;

    fn fields() -> &'static [Field<Self>] {
        ROLE_FIELDS
    }

    fn id(&self) -> i32 {
        self.id
    }
}
