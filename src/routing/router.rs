//! Route lookup and reverse routing.
//!
//! # Responsibilities
//! - Own the route table and the error-route table
//! - Resolve a base-relative path to a route and its captures
//! - Generate URLs from route names and positional arguments
//! - Expose the deployment base path and project root
//!
//! # Design Decisions
//! - Built mutable at startup, then shared immutable behind an `Arc`
//! - Per-request state lives in `Dispatch`, never in the router
//! - A `Default` error route always exists (seeded at construction)
//! - Explicit NoMatch (`None`) rather than silent default

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::config::ApplicationConfig;
use crate::http::request::{base_path, RequestDescriptor};
use crate::routing::dispatch::{Dispatch, DispatchAbort};
use crate::routing::error::RouteError;
use crate::routing::fallback;
use crate::routing::handler::{ErrorHandler, Handler};
use crate::routing::matcher::{decode_segments, Segment};
use crate::routing::table::{RouteMatch, RouteTable};

/// Key of the error-route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Status(u16),
    /// Used when no route is registered for a specific status.
    Default,
}

impl From<u16> for ErrorCode {
    fn from(code: u16) -> Self {
        ErrorCode::Status(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Status(code) => write!(f, "{}", code),
            ErrorCode::Default => f.write_str("default"),
        }
    }
}

/// Route table, error routes and deployment paths of one application.
#[derive(Debug)]
pub struct Router {
    routes: RouteTable,
    error_routes: HashMap<ErrorCode, ErrorHandler>,
    builtin_error: ErrorHandler,
    base_path: String,
    base_dir: String,
    developer_mode: bool,
}

impl Router {
    pub fn new(config: &ApplicationConfig) -> Self {
        let builtin_error = fallback::default_error_handler();
        let mut error_routes = HashMap::new();
        error_routes.insert(ErrorCode::Default, builtin_error.clone());

        Self {
            routes: RouteTable::new(),
            error_routes,
            builtin_error,
            base_path: base_path(&config.base_dir, &config.document_root),
            base_dir: config.base_dir.clone(),
            developer_mode: config.developer_mode,
        }
    }

    /// Register a route. See [`RouteTable::insert`].
    pub fn add_route(
        &mut self,
        path: &str,
        handler: Handler,
        name: Option<&str>,
    ) -> Result<(), RouteError> {
        let route = self.routes.insert(path, handler, name)?;
        tracing::debug!(
            route = %route.name(),
            pattern = %route.pattern(),
            "Route registered"
        );
        Ok(())
    }

    /// Bind (or rebind) the handler for an error code.
    pub fn add_error_route(&mut self, code: impl Into<ErrorCode>, handler: ErrorHandler) {
        let code = code.into();
        tracing::debug!(code = %code, "Error route registered");
        self.error_routes.insert(code, handler);
    }

    /// Find the route for a path already relative to the deployment base.
    /// Segments are percent-decoded first; a path that does not decode to
    /// UTF-8 matches nothing.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments = decode_segments(path).ok()?;
        self.resolve_segments(&segments)
    }

    /// Find the route for decoded path segments.
    pub fn resolve_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<RouteMatch<'_>> {
        let request: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        self.routes.find_segments(&request)
    }

    /// Handler for `code`, or the `Default` one.
    pub fn error_handler(&self, code: u16) -> &ErrorHandler {
        self.error_routes
            .get(&ErrorCode::Status(code))
            .or_else(|| self.error_routes.get(&ErrorCode::Default))
            .unwrap_or(&self.builtin_error)
    }

    /// Handler that renders when an error route itself failed.
    pub(crate) fn builtin_error_handler(&self) -> &ErrorHandler {
        &self.builtin_error
    }

    /// Build the base-relative URL of route `name`.
    ///
    /// Placeholders are filled from `args` in order of appearance, not by
    /// name, and percent-encoded. Extra arguments are ignored.
    pub fn generate_url(&self, name: &str, args: &[&str]) -> Result<String, RouteError> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RouteError::UnknownRoute {
                name: name.to_string(),
                known: self.routes.names(),
            })?;

        let mut values = args.iter();
        let mut parts = Vec::with_capacity(route.pattern().segments().len());
        for segment in route.pattern().segments() {
            match segment {
                Segment::Literal(literal) => parts.push(Cow::Borrowed(literal.as_str())),
                Segment::Placeholder(_) => match values.next() {
                    Some(value) => parts.push(urlencoding::encode(value)),
                    None => {
                        return Err(RouteError::InsufficientArguments {
                            supplied: args.len(),
                            pattern: route.pattern().as_str().to_string(),
                        })
                    }
                },
            }
        }
        Ok(parts.join("/"))
    }

    /// [`generate_url`](Self::generate_url) prefixed with the base path.
    pub fn absolute_url(&self, name: &str, args: &[&str]) -> Result<String, RouteError> {
        Ok(format!("{}{}", self.base_path, self.generate_url(name, args)?))
    }

    /// Dispatch one request. See [`Dispatch`].
    pub fn route(&self, request: &RequestDescriptor) -> Result<Dispatch, DispatchAbort> {
        Dispatch::run(self, request)
    }

    /// URL prefix of the deployment subfolder, always ending in `/`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Project root on disk.
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn developer_mode(&self) -> bool {
        self.developer_mode
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}
