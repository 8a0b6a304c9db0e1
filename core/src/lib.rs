//! Synchronous client core for the Redmine REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - Entities are plain structs; each one describes its wire fields once in
//!   a static table that both the XML and the JSON codec walk.
//! - `serializer` picks the codec and the envelope for a [`MimeFormat`].
//! - `RedmineManager` is stateless apart from configuration. Each operation is
//!   split into `build_*` (produces a request) and `parse_*` (consumes a
//!   response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod keys;
pub mod pagination;
pub mod serializer;
pub mod types;

pub use client::RedmineManager;
pub use codec::Resource;
pub use config::ManagerConfig;
pub use error::{RedmineError, Result};
pub use format::MimeFormat;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::PaginatedObjects;
pub use types::{
    Attachment, Attachments, File, Group, GroupUser, IdentifiableName, IssueCustomField,
    Membership, MembershipRole, Project, ProjectTracker, Upload,
};
