//! Stateless HTTP request builder and response parser for the Redmine API.
//!
//! # Design
//! `RedmineManager` holds only configuration and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping the
//! core deterministic and free of I/O dependencies.
//!
//! Resource paths follow Redmine's convention of selecting the wire format by
//! extension: `{host}/{collection}/{id}.{xml|json}`.

use std::fmt::Display;

use tracing::debug;

use crate::codec::Resource;
use crate::config::ManagerConfig;
use crate::error::{RedmineError, Result};
use crate::format::MimeFormat;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::keys;
use crate::pagination::PaginatedObjects;
use crate::serializer;
use crate::types::{Attachment, Attachments, Upload};

pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";
pub const SWITCH_USER_HEADER: &str = "X-Redmine-Switch-User";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
const OCTET_STREAM: &str = "application/octet-stream";

/// Synchronous, stateless client for the Redmine REST API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct RedmineManager {
    host: String,
    format: MimeFormat,
    api_key: Option<String>,
    page_size: u32,
    impersonate_user: Option<String>,
}

impl RedmineManager {
    pub fn new(host: &str, format: MimeFormat) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            format,
            api_key: None,
            page_size: 25,
            impersonate_user: None,
        }
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            page_size: config.page_size,
            impersonate_user: config.impersonate_user.clone(),
            ..Self::new(&config.host, config.format)
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Act as another user. Redmine only honours this for admin API keys.
    pub fn impersonate(mut self, login: impl Into<String>) -> Self {
        self.impersonate_user = Some(login.into());
        self
    }

    pub fn format(&self) -> MimeFormat {
        self.format
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn url(&self, segments: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/{segments}.{}", self.host, self.format.extension());
        for (i, (name, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(key) = &self.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        if let Some(login) = &self.impersonate_user {
            headers.push((SWITCH_USER_HEADER.to_string(), login.clone()));
        }
        debug!(method = method.as_str(), %path, "built request");
        HttpRequest {
            method,
            path,
            headers,
            body: None,
        }
    }

    fn request_with_body(
        &self,
        method: HttpMethod,
        path: String,
        content_type: &str,
        body: Vec<u8>,
    ) -> HttpRequest {
        let mut request = self.request(method, path);
        request
            .headers
            .push((CONTENT_TYPE_HEADER.to_string(), content_type.to_string()));
        request.body = Some(body);
        request
    }

    fn collection<T: Resource>(&self) -> Result<&'static str> {
        T::COLLECTION_KEY.ok_or(RedmineError::UnsupportedType {
            type_name: T::KEY,
            format: self.format,
        })
    }

    /// `GET {collection}/{id}`; `params` become the query string, e.g.
    /// `[("include", "trackers")]`.
    pub fn build_get_object<T: Resource>(
        &self,
        id: impl Display,
        params: &[(&str, &str)],
    ) -> Result<HttpRequest> {
        let params: Vec<_> = params.iter().map(|(k, v)| (*k, v.to_string())).collect();
        let path = self.url(&format!("{}/{id}", self.collection::<T>()?), &params);
        Ok(self.request(HttpMethod::Get, path))
    }

    /// `GET {collection}` for one page. `limit` defaults to the page size and
    /// `offset` to 0 unless `params` sets them.
    pub fn build_get_paginated_objects<T: Resource>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<HttpRequest> {
        let collection = self.collection::<T>()?;
        if !T::LISTABLE {
            return Err(RedmineError::UnsupportedType {
                type_name: collection,
                format: self.format,
            });
        }
        let mut query: Vec<(&str, String)> = Vec::with_capacity(params.len() + 2);
        if !params.iter().any(|(k, _)| *k == keys::LIMIT) {
            query.push((keys::LIMIT, self.page_size.to_string()));
        }
        if !params.iter().any(|(k, _)| *k == keys::OFFSET) {
            query.push((keys::OFFSET, "0".to_string()));
        }
        query.extend(params.iter().map(|(k, v)| (*k, v.to_string())));
        let path = self.url(collection, &query);
        Ok(self.request(HttpMethod::Get, path))
    }

    /// `POST {collection}`, or `POST projects/{owner}/{collection}` for
    /// project-scoped resources such as files and memberships.
    pub fn build_create_object<T: Resource>(
        &self,
        entity: &T,
        owner_id: Option<&str>,
    ) -> Result<HttpRequest> {
        let collection = self.collection::<T>()?;
        let segments = match owner_id {
            Some(owner) => format!("{}/{owner}/{collection}", keys::PROJECTS),
            None => collection.to_string(),
        };
        let body = serializer::encode(self.format, entity)?;
        Ok(self.request_with_body(
            HttpMethod::Post,
            self.url(&segments, &[]),
            self.format.content_type(),
            body.into_bytes(),
        ))
    }

    pub fn build_update_object<T: Resource>(&self, id: impl Display, entity: &T) -> Result<HttpRequest> {
        let path = self.url(&format!("{}/{id}", self.collection::<T>()?), &[]);
        let body = serializer::encode(self.format, entity)?;
        Ok(self.request_with_body(
            HttpMethod::Put,
            path,
            self.format.content_type(),
            body.into_bytes(),
        ))
    }

    pub fn build_delete_object<T: Resource>(&self, id: impl Display) -> Result<HttpRequest> {
        let path = self.url(&format!("{}/{id}", self.collection::<T>()?), &[]);
        Ok(self.request(HttpMethod::Delete, path))
    }

    pub fn build_add_user_to_group(&self, group_id: i32, user_id: i32) -> Result<HttpRequest> {
        let path = self.url(&format!("{}/{group_id}/{}", keys::GROUPS, keys::USERS), &[]);
        let body = serializer::encode_user_id(self.format, user_id)?;
        Ok(self.request_with_body(
            HttpMethod::Post,
            path,
            self.format.content_type(),
            body.into_bytes(),
        ))
    }

    pub fn build_remove_user_from_group(&self, group_id: i32, user_id: i32) -> HttpRequest {
        let path = self.url(
            &format!("{}/{group_id}/{}/{user_id}", keys::GROUPS, keys::USERS),
            &[],
        );
        self.request(HttpMethod::Delete, path)
    }

    /// `POST uploads` with the raw bytes; the response carries the token.
    pub fn build_upload_file(&self, data: Vec<u8>) -> HttpRequest {
        let path = self.url(keys::UPLOADS, &[]);
        self.request_with_body(HttpMethod::Post, path, OCTET_STREAM, data)
    }

    /// `PATCH attachments/issues/{issue_id}.json`. Redmine has no XML form of
    /// this endpoint, so an XML manager gets `UnsupportedType`.
    pub fn build_update_attachment(&self, issue_id: i32, attachment: &Attachment) -> Result<HttpRequest> {
        let body = serializer::encode_attachments(
            self.format,
            &Attachments::single(attachment.clone()),
        )?;
        let path = format!(
            "{}/{}/issues/{issue_id}.{}",
            self.host,
            keys::ATTACHMENTS,
            MimeFormat::Json.extension()
        );
        Ok(self.request_with_body(
            HttpMethod::Patch,
            path,
            MimeFormat::Json.content_type(),
            body.into_bytes(),
        ))
    }

    /// `GET` an absolute `content_url`, or a path relative to the host.
    pub fn build_download_file(&self, url: &str) -> HttpRequest {
        let path = if url.starts_with('/') {
            format!("{}{url}", self.host)
        } else {
            url.to_string()
        };
        self.request(HttpMethod::Get, path)
    }

    pub fn parse_get_object<T: Resource>(&self, response: HttpResponse) -> Result<T> {
        self.check_status(&response, &[200])?;
        serializer::decode(self.format, response.text()?)
    }

    pub fn parse_get_paginated_objects<T: Resource>(
        &self,
        response: HttpResponse,
    ) -> Result<PaginatedObjects<T>> {
        self.check_status(&response, &[200])?;
        serializer::decode_list(self.format, response.text()?)
    }

    pub fn parse_create_object<T: Resource>(&self, response: HttpResponse) -> Result<T> {
        self.check_status(&response, &[201])?;
        serializer::decode(self.format, response.text()?)
    }

    pub fn parse_update_object(&self, response: HttpResponse) -> Result<()> {
        self.check_status(&response, &[200, 204])
    }

    pub fn parse_delete_object(&self, response: HttpResponse) -> Result<()> {
        self.check_status(&response, &[200, 204])
    }

    pub fn parse_add_user_to_group(&self, response: HttpResponse) -> Result<()> {
        self.check_status(&response, &[200, 204])
    }

    pub fn parse_remove_user_from_group(&self, response: HttpResponse) -> Result<()> {
        self.check_status(&response, &[200, 204])
    }

    pub fn parse_upload_file(&self, response: HttpResponse) -> Result<Upload> {
        self.check_status(&response, &[201])?;
        serializer::decode(self.format, response.text()?)
    }

    pub fn parse_update_attachment(&self, response: HttpResponse) -> Result<()> {
        self.check_status(&response, &[200, 204])
    }

    pub fn parse_download_file(&self, response: HttpResponse) -> Result<Vec<u8>> {
        self.check_status(&response, &[200])?;
        Ok(response.body)
    }

    /// Map non-success status codes to the appropriate `RedmineError` variant.
    fn check_status(&self, response: &HttpResponse, expected: &[u16]) -> Result<()> {
        debug!(status = response.status, "received response");
        if expected.contains(&response.status) {
            return Ok(());
        }
        match response.status {
            401 => Err(RedmineError::Unauthorized),
            403 => Err(RedmineError::Forbidden),
            404 => Err(RedmineError::NotFound),
            422 => Err(RedmineError::Validation(serializer::decode_errors(
                self.format,
                response.text()?,
            )?)),
            status => Err(RedmineError::HttpError {
                status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            }),
        }
    }
}
