//! Routing error types.
//!
//! # Taxonomy
//! - `RouteError`: configuration mistakes (registration, URL generation).
//!   Surfaced to the caller immediately, never recovered.
//! - `HttpError`: anything that fails while serving a request. Carries the
//!   status code used to pick an error route.

use std::backtrace::Backtrace;

use thiserror::Error;

/// Configuration errors raised by route registration and URL generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route name \"{name}\" is already used by \"{existing}\" while adding \"{path}\"")]
    DuplicateName {
        name: String,
        path: String,
        existing: String,
    },

    #[error("unknown route \"{name}\"; existing routes are: [{}]", .known.join(", "))]
    UnknownRoute { name: String, known: Vec<String> },

    #[error("too few arguments: {supplied} given for route \"{pattern}\"")]
    InsufficientArguments { supplied: usize, pattern: String },

    #[error("route \"{path}\" contains an unnamed placeholder `{{}}`")]
    EmptyPlaceholder { path: String },
}

/// A failure raised while dispatching a request.
///
/// The `code` selects the error route; `trace` is the call stack captured at
/// construction, rendered by developer mode.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    code: u16,
    message: String,
    trace: String,
}

impl HttpError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// 500 with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    /// The front controller was reached without the rewrite layer's redirect marker.
    pub fn missing_rewrite() -> Self {
        Self::internal(
            "The request was not redirected to the front controller. \
             Make sure URL rewriting is enabled and routes every path to the front controller.",
        )
    }

    /// A structured output was returned by a handler without a paired view.
    pub fn view_resolution(route: &str) -> Self {
        Self::internal(format!(
            "Cannot render structured output of route \"{}\": no view is paired with its handler",
            route
        ))
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// A dynamic output was neither a string nor an object.
    pub fn invalid_output(type_name: &str) -> Self {
        Self::internal(format!(
            "Wrong output type: a handler should return a response, a string or an object; {} received",
            type_name
        ))
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Call stack at the point the error was raised.
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl From<RouteError> for HttpError {
    fn from(err: RouteError) -> Self {
        HttpError::internal(err.to_string())
    }
}
