//! Stateless HTTP request builder and response parser for the Eco Market API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each verb has a `build_*` method that produces an `HttpRequest`
//! carrying the bearer token, and `parse` consumes the matching
//! `HttpResponse`. The token is an argument on every call, never a field.

use serde::de::DeserializeOwned;

use crate::body::RequestBody;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A decoded 2xx response plus the server's optional `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub message: Option<String>,
}

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; anything else is joined onto `base_url`.
    pub fn resolve(&self, url: &str) -> Result<String, ApiError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ApiError::InvalidRequest("Request failed: empty url".to_string()));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        Ok(format!("{}/{}", self.base_url, url.trim_start_matches('/')))
    }

    pub fn build_read(&self, url: &str, token: &str) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Get, url, None, token)
    }

    pub fn build_create(
        &self,
        url: &str,
        body: &RequestBody,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Post, url, Some(body), token)
    }

    pub fn build_replace(
        &self,
        url: &str,
        body: &RequestBody,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Put, url, Some(body), token)
    }

    pub fn build_remove(&self, url: &str, token: &str) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Delete, url, None, token)
    }

    fn build(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&RequestBody>,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::NoToken);
        }
        let url = self.resolve(url)?;

        let mut headers = vec![
            ("authorization".to_string(), format!("Bearer {token}")),
            ("accept".to_string(), "application/json".to_string()),
        ];
        let body = match body {
            Some(body) => {
                headers.push(("content-type".to_string(), body.content_type()));
                Some(body.encode()?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Decode a 2xx body into `T`, or classify any other status as a
    /// `Server` error.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Parsed<T>, ApiError> {
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }

        let value: serde_json::Value = if response.body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&response.body)
                .map_err(ApiError::decode)?
        };
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        let value = serde_json::from_value(value)
            .map_err(ApiError::decode)?;
        Ok(Parsed { value, message })
    }
}
