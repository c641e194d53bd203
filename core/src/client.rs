//! Stateless HTTP request builder and response parser for the Ondo API.
//!
//! # Design
//! `OndoClient` holds only the execution's `Credentials` and carries no
//! mutable state between calls. Each operation has a `build_*` method that
//! produces an `HttpRequest`; `parse` consumes the `HttpResponse` the caller
//! got back. Every request goes out with the same bearer authentication.

use serde_json::{Map, Value};

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::Resource;
use crate::types::{Action, CreatePayload, OperationRequest, Page, UpdatePayload};

/// Synchronous, stateless client for the Ondo Finance and Flux Finance APIs.
#[derive(Debug, Clone)]
pub struct OndoClient {
    credentials: Credentials,
}

impl OndoClient {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the request for a resolved operation.
    pub fn build(&self, request: &OperationRequest) -> Result<HttpRequest, ApiError> {
        let resource = request.resource;
        match &request.action {
            Action::Create(payload) => self.build_create(resource, payload),
            Action::Get { id } => Ok(self.build_get(resource, id)),
            Action::GetAll(page) => Ok(self.build_get_all(resource, *page)),
            Action::Update { id, payload } => self.build_update(resource, id, payload),
            Action::Delete { id } => Ok(self.build_delete(resource, id)),
        }
    }

    pub fn build_create(
        &self,
        resource: Resource,
        payload: &CreatePayload,
    ) -> Result<HttpRequest, ApiError> {
        check_resource(resource, payload.resource())?;
        let body = payload
            .to_json()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.with_json(self.request(HttpMethod::Post, self.collection_url(resource)), &body)
    }

    pub fn build_get(&self, resource: Resource, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.item_url(resource, id))
    }

    pub fn build_get_all(&self, resource: Resource, page: Page) -> HttpRequest {
        self.request(HttpMethod::Get, self.collection_url(resource))
            .with_query("limit", page.limit)
            .with_query("offset", page.offset)
    }

    pub fn build_update(
        &self,
        resource: Resource,
        id: &str,
        payload: &UpdatePayload,
    ) -> Result<HttpRequest, ApiError> {
        check_resource(resource, payload.resource())?;
        let body = payload
            .to_json()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.with_json(self.request(HttpMethod::Put, self.item_url(resource, id)), &body)
    }

    pub fn build_delete(&self, resource: Resource, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, self.item_url(resource, id))
    }

    /// `GET {baseUrl}/health`, used to check that the credentials work.
    pub fn build_health_check(&self) -> HttpRequest {
        let base = self
            .credentials
            .base_url_for(Resource::UsdyTokenOperations);
        self.request(HttpMethod::Get, format!("{base}/health"))
    }

    /// Turn a response into the JSON value stored in the item's record.
    pub fn parse(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn collection_url(&self, resource: Resource) -> String {
        format!(
            "{}/{}",
            self.credentials.base_url_for(resource),
            resource.collection()
        )
    }

    fn item_url(&self, resource: Resource, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(resource),
            urlencoding::encode(id)
        )
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .with_header("authorization", format!("Bearer {}", self.credentials.api_key))
            .with_header("accept", "application/json")
    }

    fn with_json(&self, request: HttpRequest, body: &Value) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(request
            .with_header("content-type", "application/json")
            .with_body(body))
    }
}

fn check_resource(expected: Resource, actual: Resource) -> Result<(), ApiError> {
    if expected == actual {
        return Ok(());
    }
    Err(ApiError::ResourceMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// Pull `message` or `error` out of a JSON error body, falling back to the
/// raw body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
    });
    from_json.unwrap_or_else(|| body.trim().to_string())
}
