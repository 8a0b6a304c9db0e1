//! Wire names of every field and envelope the codecs know about.
//!
//! The same constant is used as the XML element or attribute name and as the
//! JSON key, so both formats stay in step when a field is added.

pub const ATTACHMENT: &str = "attachment";
pub const ATTACHMENTS: &str = "attachments";
pub const AUTHOR: &str = "author";
pub const CONTENT_TYPE: &str = "content_type";
pub const CONTENT_URL: &str = "content_url";
pub const CREATED_ON: &str = "created_on";
pub const CUSTOM_FIELD: &str = "custom_field";
pub const CUSTOM_FIELDS: &str = "custom_fields";
pub const DESCRIPTION: &str = "description";
pub const DIGEST: &str = "digest";
pub const DOWNLOADS: &str = "downloads";
pub const ERROR: &str = "error";
pub const ERRORS: &str = "errors";
pub const FILE: &str = "file";
pub const FILES: &str = "files";
pub const FILENAME: &str = "filename";
pub const FILESIZE: &str = "filesize";
pub const GROUP: &str = "group";
pub const GROUPS: &str = "groups";
pub const HOMEPAGE: &str = "homepage";
pub const ID: &str = "id";
pub const IDENTIFIER: &str = "identifier";
pub const INHERITED: &str = "inherited";
pub const LIMIT: &str = "limit";
pub const MEMBERSHIP: &str = "membership";
pub const MEMBERSHIPS: &str = "memberships";
pub const MULTIPLE: &str = "multiple";
pub const NAME: &str = "name";
pub const OFFSET: &str = "offset";
pub const PARENT: &str = "parent";
pub const PARENT_ID: &str = "parent_id";
pub const PROJECT: &str = "project";
pub const PROJECTS: &str = "projects";
pub const ROLE: &str = "role";
pub const ROLES: &str = "roles";
pub const TOKEN: &str = "token";
pub const TOTAL_COUNT: &str = "total_count";
pub const TRACKER: &str = "tracker";
pub const TRACKERS: &str = "trackers";
pub const TYPE: &str = "type";
pub const UPDATED_ON: &str = "updated_on";
pub const UPLOAD: &str = "upload";
pub const UPLOADS: &str = "uploads";
pub const USER: &str = "user";
pub const USERS: &str = "users";
pub const USER_ID: &str = "user_id";
pub const USER_IDS: &str = "user_ids";
pub const VALUE: &str = "value";
pub const VERSION: &str = "version";
pub const VERSION_ID: &str = "version_id";
