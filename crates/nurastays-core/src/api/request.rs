//! Request descriptions handed to the client pipeline.
//!
//! Everything here is owned data so a request can be sent a second time
//! after a token refresh. In particular a `reqwest` multipart form is
//! consumed on send, so uploads are kept as `MultipartBody` and rebuilt for
//! each attempt.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;

use super::ApiError;
use crate::models::QueryParams;

/// A file attached to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Owned `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    /// Build a fresh `reqwest` form for one attempt
    pub(crate) fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| ApiError::InvalidRequest(format!("{}: {}", file.file_name, e)))?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

impl Body {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        serde_json::to_value(body)
            .map(Body::Json)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))
    }
}

/// Per-call options: query params, body and extra headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: QueryParams,
    pub body: Body,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        Ok(self.body(Body::json(body)?))
    }

    pub fn multipart(self, body: MultipartBody) -> Self {
        self.body(Body::Multipart(body))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A request in flight. `retried` is set once a refresh-and-resend has been
/// spent on it; a second 401 is then returned as-is.
#[derive(Debug, Clone)]
pub(crate) struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub options: RequestOptions,
    pub retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: &str, options: RequestOptions) -> Self {
        Self {
            method,
            path: path.to_string(),
            options,
            retried: false,
        }
    }
}
