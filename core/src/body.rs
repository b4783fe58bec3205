//! Request payloads for create and replace calls.
//!
//! The encoding is chosen by the variant: `Json` and `Raw` go out as
//! `application/json`, `Multipart` as `multipart/form-data` with a boundary.

use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of a create or replace request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// Already-serialized text, sent as-is with a JSON content type.
    Raw(String),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serialize any `Serialize` value into a `Json` body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::InvalidRequest(format!("serialization failed: {e}")))
    }

    /// An empty JSON object, used by toggling endpoints.
    pub fn empty() -> Self {
        RequestBody::Json(serde_json::Value::Object(serde_json::Map::new()))
    }

    pub fn content_type(&self) -> String {
        match self {
            RequestBody::Json(_) | RequestBody::Raw(_) => JSON_CONTENT_TYPE.to_string(),
            RequestBody::Multipart(form) => form.content_type(),
        }
    }

    /// Encode into wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>, ApiError> {
        match self {
            RequestBody::Json(value) => serde_json::to_vec(value)
                .map_err(|e| ApiError::InvalidRequest(format!("serialization failed: {e}"))),
            RequestBody::Raw(text) => Ok(text.clone().into_bytes()),
            RequestBody::Multipart(form) => Ok(form.encode()),
        }
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        RequestBody::Multipart(form)
    }
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text { name: String, value: String },
    File { name: String, file: FilePart },
}

/// `multipart/form-data` payload (RFC 7578).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("----eco-market-{}", Uuid::new_v4().simple()),
            parts: Vec::new(),
        }
    }

    /// Fix the boundary, mainly so encoded output is reproducible.
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            file,
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn has_files(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::File { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match part {
                Part::Text { name, value } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quoted(name)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                Part::File { name, file } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            escape_quoted(name),
                            escape_quoted(&file.file_name)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(
                        format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes(),
                    );
                    out.extend_from_slice(&file.bytes);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

// RFC 7578 §4.2: quotes and line breaks in names are percent-encoded.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
