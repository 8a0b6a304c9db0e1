//! In-memory stand-in for a Redmine server, enough of it to drive the client
//! core end to end.
//!
//! Redmine selects the wire format from the URL extension, so every route
//! captures the last path segment whole (`projects.xml`, `7.json`) and splits
//! the extension off itself.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// The key every request must present in `X-Redmine-API-Key`.
pub const API_KEY: &str = "mock-api-key";
pub const API_KEY_HEADER: &str = "x-redmine-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    /// Split `name.ext` into the name and its format.
    pub fn split(segment: &str) -> Option<(&str, Format)> {
        let (name, ext) = segment.rsplit_once('.')?;
        match ext {
            "xml" => Some((name, Format::Xml)),
            "json" => Some((name, Format::Json)),
            _ => None,
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Format::Xml => "application/xml",
            Format::Json => "application/json",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
    pub created_on: String,
    pub updated_on: String,
}

/// Writable project fields as the client sends them.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectInput {
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub parent_id: Option<u32>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: ProjectInput,
}

#[derive(Serialize)]
#[serde(rename = "projects")]
struct ProjectPage<'a> {
    #[serde(rename = "@total_count")]
    total_count: usize,
    #[serde(rename = "@offset")]
    offset: usize,
    #[serde(rename = "@limit")]
    limit: usize,
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "project")]
    projects: &'a [Project],
}

#[derive(Serialize)]
#[serde(rename = "errors")]
struct ErrorDocument<'a> {
    #[serde(rename = "error")]
    errors: &'a [String],
}

#[derive(Serialize)]
struct UploadReceipt {
    id: u32,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub projects: BTreeMap<u32, Project>,
    next_project_id: u32,
    next_upload_id: u32,
}

impl Store {
    fn find(&self, key: &str) -> Option<u32> {
        match key.parse::<u32>() {
            Ok(id) => self.projects.contains_key(&id).then_some(id),
            Err(_) => self
                .projects
                .values()
                .find(|p| p.identifier == key)
                .map(|p| p.id),
        }
    }

    fn parent(&self, id: u32) -> Option<Parent> {
        self.projects.get(&id).map(|p| Parent {
            id: p.id,
            name: p.name.clone(),
        })
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/{collection}", get(list_objects).post(create_object))
        .route(
            "/projects/{file}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    match request.headers().get(API_KEY_HEADER) {
        Some(key) if key == API_KEY => next.run(request).await,
        _ => {
            debug!(uri = %request.uri(), "rejecting request without a valid API key");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn respond(status: StatusCode, format: Format, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, format.content_type())], body).into_response()
}

/// Serialize `value` inside a `root` envelope.
fn render<T: Serialize>(format: Format, root: &str, value: &T) -> Result<String, StatusCode> {
    match format {
        Format::Json => {
            let inner = serde_json::to_value(value).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
            let mut envelope = serde_json::Map::new();
            envelope.insert(root.to_string(), inner);
            Ok(serde_json::Value::Object(envelope).to_string())
        }
        Format::Xml => quick_xml::se::to_string_with_root(root, value)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn render_errors(format: Format, errors: &[String]) -> Result<String, StatusCode> {
    match format {
        Format::Json => Ok(serde_json::json!({ "errors": errors }).to_string()),
        Format::Xml => quick_xml::se::to_string(&ErrorDocument { errors })
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn parse_input(format: Format, body: &[u8]) -> Result<ProjectInput, StatusCode> {
    let text = std::str::from_utf8(body).map_err(|_| StatusCode::BAD_REQUEST)?;
    match format {
        Format::Json => serde_json::from_str::<ProjectEnvelope>(text)
            .map(|envelope| envelope.project)
            .map_err(|_| StatusCode::BAD_REQUEST),
        Format::Xml => quick_xml::de::from_str(text).map_err(|_| StatusCode::BAD_REQUEST),
    }
}

fn validate(store: &Store, input: &ProjectInput) -> Vec<String> {
    let mut errors = Vec::new();
    if input.name.as_deref().map_or(true, |name| name.trim().is_empty()) {
        errors.push("Name cannot be blank".to_string());
    }
    match input.identifier.as_deref() {
        None | Some("") => errors.push("Identifier cannot be blank".to_string()),
        Some(identifier) if store.find(identifier).is_some() => {
            errors.push("Identifier has already been taken".to_string())
        }
        Some(_) => {}
    }
    if let Some(parent_id) = input.parent_id {
        if !store.projects.contains_key(&parent_id) {
            errors.push("Parent is invalid".to_string());
        }
    }
    errors
}

async fn list_objects(
    State(db): State<Db>,
    Path(collection): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Response, StatusCode> {
    let (name, format) = Format::split(&collection).ok_or(StatusCode::NOT_FOUND)?;
    if name != "projects" {
        return Err(StatusCode::NOT_FOUND);
    }
    let store = db.read().await;
    let all: Vec<Project> = store.projects.values().cloned().collect();
    let offset = page.offset.unwrap_or(0);
    let limit = page.limit.unwrap_or(25).min(100);
    let slice: Vec<Project> = all.iter().skip(offset).take(limit).cloned().collect();

    let body = match format {
        Format::Json => serde_json::json!({
            "projects": slice,
            "total_count": all.len(),
            "offset": offset,
            "limit": limit,
        })
        .to_string(),
        Format::Xml => quick_xml::se::to_string(&ProjectPage {
            total_count: all.len(),
            offset,
            limit,
            kind: "array",
            projects: &slice,
        })
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
    };
    Ok(respond(StatusCode::OK, format, body))
}

async fn create_object(
    State(db): State<Db>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, StatusCode> {
    let (name, format) = Format::split(&collection).ok_or(StatusCode::NOT_FOUND)?;
    match name {
        "projects" => create_project(db, format, &body).await,
        "uploads" => create_upload(db, format, &headers).await,
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn create_project(db: Db, format: Format, body: &[u8]) -> Result<Response, StatusCode> {
    let input = parse_input(format, body)?;
    let mut store = db.write().await;
    let errors = validate(&store, &input);
    if !errors.is_empty() {
        debug!(?errors, "rejecting project");
        return Ok(respond(
            StatusCode::UNPROCESSABLE_ENTITY,
            format,
            render_errors(format, &errors)?,
        ));
    }

    store.next_project_id += 1;
    let stamp = now();
    let project = Project {
        id: store.next_project_id,
        name: input.name.unwrap_or_default(),
        identifier: input.identifier.unwrap_or_default(),
        description: input.description,
        homepage: input.homepage,
        parent: input.parent_id.and_then(|id| store.parent(id)),
        created_on: stamp.clone(),
        updated_on: stamp,
    };
    info!(id = project.id, identifier = %project.identifier, "created project");
    store.projects.insert(project.id, project.clone());
    Ok(respond(
        StatusCode::CREATED,
        format,
        render(format, "project", &project)?,
    ))
}

async fn create_upload(db: Db, format: Format, headers: &HeaderMap) -> Result<Response, StatusCode> {
    let octet_stream = headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value == "application/octet-stream");
    if !octet_stream {
        return Err(StatusCode::NOT_ACCEPTABLE);
    }
    let mut store = db.write().await;
    store.next_upload_id += 1;
    let receipt = UploadReceipt {
        id: store.next_upload_id,
        token: format!("{}.{}", store.next_upload_id, Uuid::new_v4().simple()),
    };
    Ok(respond(
        StatusCode::CREATED,
        format,
        render(format, "upload", &receipt)?,
    ))
}

async fn get_project(
    State(db): State<Db>,
    Path(file): Path<String>,
) -> Result<Response, StatusCode> {
    let (key, format) = Format::split(&file).ok_or(StatusCode::NOT_FOUND)?;
    let store = db.read().await;
    let id = store.find(key).ok_or(StatusCode::NOT_FOUND)?;
    let project = store.projects.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(respond(StatusCode::OK, format, render(format, "project", project)?))
}

async fn update_project(
    State(db): State<Db>,
    Path(file): Path<String>,
    body: Bytes,
) -> Result<Response, StatusCode> {
    let (key, format) = Format::split(&file).ok_or(StatusCode::NOT_FOUND)?;
    let input = parse_input(format, &body)?;
    let mut store = db.write().await;
    let id = store.find(key).ok_or(StatusCode::NOT_FOUND)?;

    if input.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        let errors = vec!["Name cannot be blank".to_string()];
        return Ok(respond(
            StatusCode::UNPROCESSABLE_ENTITY,
            format,
            render_errors(format, &errors)?,
        ));
    }
    let parent = input.parent_id.and_then(|parent_id| store.parent(parent_id));
    let project = store.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    // The identifier is fixed once a project exists.
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(description) = input.description {
        project.description = Some(description);
    }
    if let Some(homepage) = input.homepage {
        project.homepage = Some(homepage);
    }
    if parent.is_some() {
        project.parent = parent;
    }
    project.updated_on = now();
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn delete_project(
    State(db): State<Db>,
    Path(file): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let (key, _) = Format::split(&file).ok_or(StatusCode::NOT_FOUND)?;
    let mut store = db.write().await;
    let id = store.find(key).ok_or(StatusCode::NOT_FOUND)?;
    store.projects.remove(&id);
    info!(id, "deleted project");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: 1,
            name: "Docs".to_string(),
            identifier: "docs".to_string(),
            description: None,
            homepage: None,
            parent: Some(Parent {
                id: 3,
                name: "Umbrella".to_string(),
            }),
            created_on: "2024-01-01T00:00:00Z".to_string(),
            updated_on: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn splits_extension() {
        assert_eq!(Format::split("projects.xml"), Some(("projects", Format::Xml)));
        assert_eq!(Format::split("7.json"), Some(("7", Format::Json)));
        assert_eq!(Format::split("projects"), None);
        assert_eq!(Format::split("projects.yaml"), None);
    }

    #[test]
    fn renders_json_envelope() {
        let body = render(Format::Json, "project", &project()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["project"]["identifier"], "docs");
        assert_eq!(value["project"]["parent"]["id"], 3);
        assert!(value["project"].get("description").is_none());
    }

    #[test]
    fn renders_xml_envelope() {
        let body = render(Format::Xml, "project", &project()).unwrap();
        assert!(body.starts_with("<project><id>1</id><name>Docs</name>"));
        assert!(body.contains("<parent><id>3</id><name>Umbrella</name></parent>"));
    }

    #[test]
    fn parses_xml_input() {
        let input = parse_input(
            Format::Xml,
            br#"<?xml version="1.0" encoding="UTF-8"?><project><name>Docs</name><identifier>docs</identifier><parent_id>3</parent_id></project>"#,
        )
        .unwrap();
        assert_eq!(input.name.as_deref(), Some("Docs"));
        assert_eq!(input.parent_id, Some(3));
    }

    #[test]
    fn parses_json_input() {
        let input = parse_input(Format::Json, br#"{"project":{"name":"Docs","identifier":"docs"}}"#)
            .unwrap();
        assert_eq!(input.identifier.as_deref(), Some("docs"));
        assert!(parse_input(Format::Json, br#"{"name":"Docs"}"#).is_err());
    }

    #[test]
    fn validation_collects_every_problem() {
        let store = Store::default();
        let errors = validate(&store, &ProjectInput::default());
        assert_eq!(
            errors,
            vec!["Name cannot be blank", "Identifier cannot be blank"]
        );
    }

    #[test]
    fn store_finds_by_id_or_identifier() {
        let mut store = Store::default();
        store.projects.insert(1, project());
        assert_eq!(store.find("1"), Some(1));
        assert_eq!(store.find("docs"), Some(1));
        assert_eq!(store.find("2"), None);
        assert_eq!(store.find("other"), None);
    }
}
