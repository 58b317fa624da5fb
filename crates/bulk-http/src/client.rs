//! The HTTP collaborator and its reqwest implementation

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::{ClientConfig, Error, Method, ParsedResponse, Request, Response, Result};

/// Executes requests against the remote.
///
/// Implement this trait to substitute the transport; the sync engine only
/// ever sees this interface.
pub trait HttpClient {
    /// Execute a request and return the raw response.
    ///
    /// Non-success statuses are returned as responses, not errors.
    fn send(&self, request: &Request) -> Result<Response>;

    /// Execute a request and decode its body as JSON.
    fn get_parsed(&self, request: &Request) -> Result<ParsedResponse> {
        self.send(request)?.parse()
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Box<T> {
    fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request)
    }
}

/// [`HttpClient`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: &Request) -> Result<Response> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| Error::InvalidUrl {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let mut builder = self.client.request(Self::method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let transport = |e: reqwest::Error| Error::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };
        let resp = builder.send().map_err(transport)?;

        let mut response = Response::new(request.url.clone(), resp.status().as_u16());
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                response = response.with_header(name.as_str(), value);
            }
        }
        let body = resp.bytes().map_err(transport)?;
        debug!(status = response.status, bytes = body.len(), "received response");

        Ok(response.with_body(body.to_vec()))
    }
}
