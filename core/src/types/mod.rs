//! Redmine entities.
//!
//! # Design
//! Plain structs with public fields. Each implements
//! [`Resource`](crate::codec::Resource) by pointing at a `static` field table
//! declared next to it, so adding a field is one table row. Equality is
//! implemented by hand where Redmine's notion of "the same object" is a
//! business key rather than every field.

mod attachment;
mod custom_field;
mod file;
mod group;
mod identifiable_name;
mod membership;
mod project;
mod upload;

pub use attachment::{Attachment, Attachments};
pub use custom_field::IssueCustomField;
pub use file::File;
pub use group::{Group, GroupUser};
pub use identifiable_name::IdentifiableName;
pub use membership::{Membership, MembershipRole};
pub use project::{Project, ProjectTracker};
pub use upload::Upload;
