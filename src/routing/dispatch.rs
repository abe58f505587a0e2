//! Per-request dispatch.
//!
//! # State Machine
//! ```text
//! IDLE ─▶ MATCHING ─┬─▶ DISPATCHING ──────────┬─▶ RENDERING ─▶ SENT
//!   │               │                         │
//!   │ no redirect   │ bad path (400)          │ handler/output error
//!   │               │ no match (404)          │
//!   ▼               ▼                         ▼
//!   └──────────▶ ERROR REDIRECT ──────────────┘
//! ```
//!
//! # Design Decisions
//! - One `Dispatch` per request; the shared `Router` is never mutated
//! - Every failure after matching becomes an error route, including panics
//!   in actions, views and error routes (rendered as 500)
//! - Error headers are cleared and the status reset before the error route runs
//! - A failing error route gets exactly one fallback (the built-in handler);
//!   if that fails too the request is aborted

use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

use crate::http::{RequestDescriptor, Response};
use crate::observability::metrics;
use crate::routing::error::HttpError;
use crate::routing::handler::{render_view, ErrorHandler, RenderResult, RequestContext, View};
use crate::routing::matcher::{decode_segments, Captures};
use crate::routing::router::Router;

/// Raised when neither the error route nor the built-in fallback could render.
#[derive(Debug, Error)]
#[error("error route for status {code} failed: {source}")]
pub struct DispatchAbort {
    pub code: u16,
    #[source]
    pub source: HttpError,
}

/// State and outcome of dispatching one request.
#[derive(Debug, Default)]
pub struct Dispatch {
    active_route: Option<String>,
    active_error: Option<u16>,
    args: Captures,
    response: Response,
}

impl Dispatch {
    /// Match, dispatch and render `request` against `router`.
    pub(crate) fn run(router: &Router, request: &RequestDescriptor) -> Result<Self, DispatchAbort> {
        let start = Instant::now();
        let mut dispatch = Dispatch::default();

        match request.relative_path() {
            None => {
                tracing::error!(
                    script_name = %request.script_name,
                    "Front controller reached without a redirect URL"
                );
                dispatch.render_error(router, HttpError::missing_rewrite())?;
            }
            Some(path) => dispatch.dispatch(router, path)?,
        }

        metrics::record_dispatch(
            dispatch.active_route.as_deref().unwrap_or("none"),
            dispatch.response.status(),
            start,
        );
        Ok(dispatch)
    }

    fn dispatch(&mut self, router: &Router, path: &str) -> Result<(), DispatchAbort> {
        let segments = match decode_segments(path) {
            Ok(segments) => segments,
            Err(e) => {
                tracing::info!(path = %path, error = %e, "Malformed request path");
                return self.render_error(
                    router,
                    HttpError::bad_request(format!("Malformed request path: {}", e)),
                );
            }
        };
        let Some(found) = router.resolve_segments(&segments) else {
            tracing::info!(path = %path, "Route not found");
            return self.render_error(router, HttpError::not_found("Route not found"));
        };

        let route = found.route;
        self.active_route = Some(route.name().to_string());
        self.args = found.args;

        tracing::debug!(
            route = %route.name(),
            path = %path,
            args = self.args.len(),
            "Dispatching"
        );

        let output = {
            let ctx = RequestContext::new(router, self.active_route.as_deref(), &self.args);
            route.handler().call(&ctx)
        };
        let handler = route.handler();
        let rendered = output.and_then(|output| self.apply(output, handler.view()));

        match rendered {
            Ok(()) => Ok(()),
            Err(error) => self.render_error(router, error),
        }
    }

    /// Normalize an action's output into the current response.
    fn apply(&mut self, output: RenderResult, view: Option<&View>) -> Result<(), HttpError> {
        match output {
            RenderResult::Prepared(response) => self.response = response,
            RenderResult::Body(body) => self.response.set_body(body),
            RenderResult::Structured(data) => {
                let view = view.ok_or_else(|| {
                    HttpError::view_resolution(self.active_route.as_deref().unwrap_or_default())
                })?;
                let values: Vec<Value> = data.into_iter().map(|(_, value)| value).collect();
                let body = render_view(view, values)?;
                self.response.set_body(body);
            }
        }
        Ok(())
    }

    /// Render the error route for `error.code()`, or the default one.
    fn render_error(&mut self, router: &Router, error: HttpError) -> Result<(), DispatchAbort> {
        let code = error.code();
        tracing::warn!(
            code,
            error = %error,
            route = ?self.active_route,
            "Rendering error route"
        );
        metrics::record_error_route(code);

        let handler = router.error_handler(code);
        let failure = match self.invoke_error(router, handler, &error) {
            Ok(()) => return Ok(()),
            Err(failure) => failure,
        };

        let builtin = router.builtin_error_handler();
        if handler.same_as(builtin) {
            tracing::error!(code, error = %failure, "Built-in error route failed, aborting");
            return Err(DispatchAbort {
                code,
                source: failure,
            });
        }

        tracing::error!(
            code,
            error = %failure,
            "Error route failed, falling back to the built-in handler"
        );
        self.invoke_error(router, builtin, &error).map_err(|source| {
            tracing::error!(code, error = %source, "Built-in error route failed, aborting");
            DispatchAbort { code, source }
        })
    }

    fn invoke_error(
        &mut self,
        router: &Router,
        handler: &ErrorHandler,
        error: &HttpError,
    ) -> Result<(), HttpError> {
        self.response.clear_headers();
        self.response.set_status(error.code());
        self.active_error = Some(error.code());

        let output = {
            let ctx = RequestContext::new(router, self.active_route.as_deref(), &self.args);
            handler.call(error, &ctx)?
        };
        self.apply(output, handler.view())
    }

    /// Name of the matched route, `None` before matching or when nothing matched.
    pub fn active_route(&self) -> Option<&str> {
        self.active_route.as_deref()
    }

    /// Status code of the error route that rendered, if any.
    pub fn active_error(&self) -> Option<u16> {
        self.active_error
    }

    pub fn args(&self) -> &Captures {
        &self.args
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}
