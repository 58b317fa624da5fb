//! [`FakeRemote`]: an in-memory versioned REST collection.
//!
//! Serves a listing at [`FakeRemote::listing_url`] and one resource per id
//! below it. Every write bumps the resource version (`v1`, `v2`, ...), which
//! is exposed both in the listing and as the resource ETag. Writes honour
//! `If-Match` and `If-Unmodified-Since` with `412 Precondition Failed`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value, json};

use bulk_http::{HttpClient, Method, Request, Response, Result};

const DEFAULT_LISTING: &str = "https://api.example.com/items";

/// Shape of the listing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStyle {
    /// `{"url": ..., "version": ...}`
    #[default]
    Url,
    /// `{"self": ..., "etag": ...}`
    SelfEtag,
    /// `{"id": ..., "modified": ...}`, for URL templates
    IdOnly,
}

#[derive(Debug, Clone)]
struct Resource {
    body: Value,
    version: u64,
}

impl Resource {
    fn marker(&self) -> String {
        format!("v{}", self.version)
    }

    fn etag(&self) -> String {
        format!("\"{}\"", self.marker())
    }

    fn last_modified(&self) -> String {
        format!("Mon, {:02} Jan 2024 00:00:00 GMT", self.version % 28 + 1)
    }
}

#[derive(Debug, Default)]
struct State {
    listing_url: String,
    resources: BTreeMap<String, Resource>,
    style: ListingStyle,
    wrap_key: Option<String>,
    listing_override: Option<(u16, Value)>,
    use_etags: bool,
    schema: Option<String>,
    stamp: Option<(String, Value)>,
    failures: Vec<(Method, String, u16)>,
    requests: Vec<Request>,
}

/// An in-memory REST remote.
///
/// Clones share state, so a test keeps one handle while the engine owns
/// another.
#[derive(Debug, Clone)]
pub struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    /// A remote listing at `https://api.example.com/items`.
    pub fn new() -> Self {
        Self::at(DEFAULT_LISTING)
    }

    /// A remote listing at `listing_url` (no trailing slash).
    pub fn at(listing_url: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                listing_url: listing_url.trim_end_matches('/').to_string(),
                use_etags: true,
                ..State::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn listing_url(&self) -> String {
        self.state().listing_url.clone()
    }

    pub fn resource_url(&self, id: &str) -> String {
        format!("{}/{id}", self.state().listing_url)
    }

    /// Create or replace a resource, bumping its version.
    pub fn set_resource(&self, id: &str, body: Value) {
        let mut state = self.state();
        let version = state.resources.get(id).map_or(1, |r| r.version + 1);
        state
            .resources
            .insert(id.to_string(), Resource { body, version });
    }

    pub fn remove_resource(&self, id: &str) {
        self.state().resources.remove(id);
    }

    pub fn resource(&self, id: &str) -> Option<Value> {
        self.state().resources.get(id).map(|r| r.body.clone())
    }

    /// Current version marker of a resource, e.g. `v2`.
    pub fn version(&self, id: &str) -> Option<String> {
        self.state().resources.get(id).map(Resource::marker)
    }

    pub fn set_listing_style(&self, style: ListingStyle) {
        self.state().style = style;
    }

    /// Nest the entry array under `key` in the listing body.
    pub fn wrap_listing(&self, key: &str) {
        self.state().wrap_key = Some(key.to_string());
    }

    /// Serve a fixed listing response instead of the generated one.
    pub fn override_listing(&self, status: u16, body: Value) {
        self.state().listing_override = Some((status, body));
    }

    /// Send `Last-Modified` instead of `ETag` on resources.
    pub fn use_last_modified(&self) {
        self.state().use_etags = false;
    }

    /// Advertise a `describedby` schema link on every resource.
    pub fn set_schema(&self, schema: &str) {
        self.state().schema = Some(schema.to_string());
    }

    /// Set `field` to `value` on every body written through PUT.
    pub fn stamp_on_write(&self, field: &str, value: Value) {
        self.state().stamp = Some((field.to_string(), value));
    }

    /// Answer the next `method` request on resource `id` with `status`.
    pub fn fail_next(&self, method: Method, id: &str, status: u16) {
        let url = self.resource_url(id);
        self.state().failures.push((method, url, status));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    /// Requests received with the given method.
    pub fn requests_with(&self, method: Method) -> Vec<Request> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }
}

impl State {
    fn listing(&self) -> Response {
        if let Some((status, body)) = &self.listing_override {
            return json_response(&self.listing_url, *status, body);
        }
        let entries: Vec<Value> = self
            .resources
            .iter()
            .map(|(id, resource)| {
                let url = format!("{}/{id}", self.listing_url);
                match self.style {
                    ListingStyle::Url => json!({"url": url, "version": resource.marker()}),
                    ListingStyle::SelfEtag => json!({"self": url, "etag": resource.etag()}),
                    ListingStyle::IdOnly => json!({"id": id, "modified": resource.marker()}),
                }
            })
            .collect();
        let body = match &self.wrap_key {
            Some(key) => {
                let mut wrapper = Map::new();
                wrapper.insert(key.clone(), Value::Array(entries));
                Value::Object(wrapper)
            }
            None => Value::Array(entries),
        };
        json_response(&self.listing_url, 200, &body)
    }

    fn precondition_failed(&self, request: &Request, resource: &Resource) -> bool {
        if let Some(expected) = request.header("If-Match") {
            return expected != resource.etag();
        }
        if let Some(expected) = request.header("If-Unmodified-Since") {
            return expected != resource.last_modified();
        }
        false
    }

    fn get(&self, id: &str, request: &Request) -> Response {
        let Some(resource) = self.resources.get(id) else {
            return Response::new(&request.url, 404);
        };
        let mut response = json_response(&request.url, 200, &resource.body);
        response = if self.use_etags {
            response.with_header("ETag", &resource.etag())
        } else {
            response.with_header("Last-Modified", &resource.last_modified())
        };
        if let Some(schema) = &self.schema {
            response = response.with_header("Link", &format!("<{schema}>; rel=\"describedby\""));
        }
        response
    }

    fn put(&mut self, id: &str, request: &Request) -> Response {
        if let Some(resource) = self.resources.get(id)
            && self.precondition_failed(request, resource)
        {
            return Response::new(&request.url, 412);
        }
        let body = request.body.as_deref().unwrap_or_default();
        let Ok(mut value) = serde_json::from_slice::<Value>(body) else {
            return Response::new(&request.url, 400);
        };
        if let (Some((field, stamp)), Some(object)) = (&self.stamp, value.as_object_mut()) {
            object.insert(field.clone(), stamp.clone());
        }

        let (status, version) = match self.resources.get(id) {
            Some(existing) => (200, existing.version + 1),
            None => (201, 1),
        };
        self.resources.insert(
            id.to_string(),
            Resource {
                body: value.clone(),
                version,
            },
        );
        json_response(&request.url, status, &value)
    }

    fn delete(&mut self, id: &str, request: &Request) -> Response {
        let Some(resource) = self.resources.get(id) else {
            return Response::new(&request.url, 404);
        };
        if self.precondition_failed(request, resource) {
            return Response::new(&request.url, 412);
        }
        self.resources.remove(id);
        Response::new(&request.url, 204)
    }
}

fn json_response(url: &str, status: u16, body: &Value) -> Response {
    Response::new(url, status)
        .with_header("Content-Type", "application/json")
        .with_body(body.to_string())
}

impl HttpClient for FakeRemote {
    fn send(&self, request: &Request) -> Result<Response> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if let Some(pos) = state
            .failures
            .iter()
            .position(|(method, url, _)| *method == request.method && *url == request.url)
        {
            let (_, _, status) = state.failures.remove(pos);
            return Ok(Response::new(&request.url, status));
        }

        let url = request.url.split(['?', '#']).next().unwrap_or_default();
        if url == state.listing_url && request.method == Method::Get {
            return Ok(state.listing());
        }

        let prefix = format!("{}/", state.listing_url);
        let Some(id) = url.strip_prefix(&prefix).map(|id| id.trim_end_matches('/').to_string())
        else {
            return Ok(Response::new(&request.url, 404));
        };

        let response = match request.method {
            Method::Get => state.get(&id, request),
            Method::Put => state.put(&id, request),
            Method::Delete => state.delete(&id, request),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_reports_versions() {
        let remote = FakeRemote::new();
        remote.set_resource("a1", json!({"id": "a1"}));
        remote.set_resource("a1", json!({"id": "a1", "n": 2}));

        let listing = remote
            .get_parsed(&Request::get(remote.listing_url()))
            .unwrap();

        assert_eq!(
            listing.body,
            json!([{"url": "https://api.example.com/items/a1", "version": "v2"}])
        );
    }

    #[test]
    fn put_with_stale_etag_is_rejected() {
        let remote = FakeRemote::new();
        remote.set_resource("a1", json!({}));
        let request = Request::put(remote.resource_url("a1"), b"{}".to_vec())
            .with_header("If-Match", "\"v0\"");

        let response = remote.send(&request).unwrap();

        assert_eq!(response.status, 412);
        assert_eq!(remote.version("a1").as_deref(), Some("v1"));
    }

    #[test]
    fn put_stamps_and_bumps_version() {
        let remote = FakeRemote::new();
        remote.set_resource("a1", json!({"id": "a1"}));
        remote.stamp_on_write("updatedBy", json!("server"));
        let request = Request::put(remote.resource_url("a1"), br#"{"id":"a1"}"#.to_vec())
            .with_header("If-Match", "\"v1\"");

        let response = remote.send(&request).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(remote.version("a1").as_deref(), Some("v2"));
        assert_eq!(
            remote.resource("a1"),
            Some(json!({"id": "a1", "updatedBy": "server"}))
        );
    }

    #[test]
    fn fail_next_applies_once() {
        let remote = FakeRemote::new();
        remote.set_resource("a1", json!({}));
        remote.fail_next(Method::Get, "a1", 500);
        let request = Request::get(remote.resource_url("a1"));

        assert_eq!(remote.send(&request).unwrap().status, 500);
        assert_eq!(remote.send(&request).unwrap().status, 200);
        assert_eq!(remote.requests_with(Method::Get).len(), 2);
    }
}
