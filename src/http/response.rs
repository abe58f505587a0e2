//! Outgoing response storage.
//!
//! # Responsibilities
//! - Hold status code, body text and raw header lines until send
//! - Build redirection responses (303 + Location)
//! - Emit the response exactly once, on the wire or as an axum response
//!
//! # Design Decisions
//! - Headers are raw `Name: value` strings, kept in insertion order
//! - Sending consumes the response: nothing can be mutated afterwards
//! - Malformed header lines are skipped (and logged) on conversion to axum

use std::io::{self, Write};

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;

/// Default status for a response nobody set a code on.
pub const DEFAULT_STATUS: u16 = 200;

/// An HTTP response under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
    headers: Vec<String>,
}

impl Response {
    /// Create a response with the given body and the default status.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: DEFAULT_STATUS,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// A `303 See Other` pointing at `url`.
    pub fn redirect(url: impl AsRef<str>) -> Self {
        let mut response = Self::new("");
        response.set_status(303);
        response.add_header(format!("Location: {}", url.as_ref()));
        response
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Queue a raw header line, e.g. `Content-Type: text/html`.
    pub fn add_header(&mut self, header: impl Into<String>) {
        self.headers.push(header.into());
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    /// Write status line, headers and body to `out` as HTTP/1.1.
    ///
    /// `Content-Length` is added unless a header line already sets it.
    pub fn send<W: Write>(self, out: &mut W) -> io::Result<()> {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        write!(out, "HTTP/1.1 {} {}\r\n", self.status, reason)?;
        for header in &self.headers {
            write!(out, "{}\r\n", header)?;
        }
        if self.header("Content-Length").is_none() {
            write!(out, "Content-Length: {}\r\n", self.body.len())?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(self.body.as_bytes())?;
        out.flush()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<String> for Response {
    fn from(body: String) -> Self {
        Self::new(body)
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap_or_else(|_| {
            tracing::warn!(status = self.status, "Invalid status code, answering 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for line in &self.headers {
            let parsed = line.split_once(':').and_then(|(name, value)| {
                let name = HeaderName::from_bytes(name.trim().as_bytes()).ok()?;
                let value = HeaderValue::from_str(value.trim()).ok()?;
                Some((name, value))
            });
            match parsed {
                Some((name, value)) => {
                    headers.append(name, value);
                }
                None => tracing::warn!(header = %line, "Skipping malformed header"),
            }
        }

        response
    }
}
