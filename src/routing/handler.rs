//! Handlers and what they return.
//!
//! A route binds a [`Handler`]: an action run with the request's captures and
//! an optional paired view. Actions return a [`RenderResult`]:
//! - `Body`: pre-rendered text, becomes the response body
//! - `Structured`: ordered data, forwarded positionally to the paired view
//! - `Prepared`: a complete response that replaces the current one

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::http::Response;
use crate::routing::error::{HttpError, RouteError};
use crate::routing::matcher::Captures;
use crate::routing::router::Router;

/// Route action signature.
pub type Action = dyn Fn(&RequestContext<'_>) -> Result<RenderResult, HttpError> + Send + Sync;

/// Error route action signature.
pub type ErrorAction =
    dyn Fn(&HttpError, &RequestContext<'_>) -> Result<RenderResult, HttpError> + Send + Sync;

/// Renderer paired with an action; receives the structured values in order.
pub type View = dyn Fn(Vec<Value>) -> Result<String, HttpError> + Send + Sync;

/// Output of an action.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderResult {
    Body(String),
    Structured(Map<String, Value>),
    Prepared(Response),
}

impl RenderResult {
    /// Interpret a dynamic value: strings are bodies, objects are structured
    /// data, anything else is rejected with a 500 naming its type.
    pub fn from_value(value: Value) -> Result<Self, HttpError> {
        match value {
            Value::String(body) => Ok(RenderResult::Body(body)),
            Value::Object(map) => Ok(RenderResult::Structured(map)),
            other => Err(HttpError::invalid_output(json_type_name(&other))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<String> for RenderResult {
    fn from(body: String) -> Self {
        RenderResult::Body(body)
    }
}

impl From<&str> for RenderResult {
    fn from(body: &str) -> Self {
        RenderResult::Body(body.to_string())
    }
}

impl From<Response> for RenderResult {
    fn from(response: Response) -> Self {
        RenderResult::Prepared(response)
    }
}

impl From<Map<String, Value>> for RenderResult {
    fn from(data: Map<String, Value>) -> Self {
        RenderResult::Structured(data)
    }
}

/// A route's action and its optional view.
#[derive(Clone)]
pub struct Handler {
    action: Arc<Action>,
    view: Option<Arc<View>>,
}

impl Handler {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&RequestContext<'_>) -> Result<RenderResult, HttpError> + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            view: None,
        }
    }

    /// Pair a view that renders this action's structured output.
    pub fn with_view<V>(mut self, view: V) -> Self
    where
        V: Fn(Vec<Value>) -> Result<String, HttpError> + Send + Sync + 'static,
    {
        self.view = Some(Arc::new(view));
        self
    }

    /// Run the action. A panic becomes a 500.
    pub fn call(&self, ctx: &RequestContext<'_>) -> Result<RenderResult, HttpError> {
        guarded(|| (self.action)(ctx))
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_deref()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("has_view", &self.view.is_some())
            .finish()
    }
}

/// An error route's action and its optional view.
#[derive(Clone)]
pub struct ErrorHandler {
    action: Arc<ErrorAction>,
    view: Option<Arc<View>>,
}

impl ErrorHandler {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&HttpError, &RequestContext<'_>) -> Result<RenderResult, HttpError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            action: Arc::new(action),
            view: None,
        }
    }

    pub fn with_view<V>(mut self, view: V) -> Self
    where
        V: Fn(Vec<Value>) -> Result<String, HttpError> + Send + Sync + 'static,
    {
        self.view = Some(Arc::new(view));
        self
    }

    /// Whether both handlers share the same action.
    pub fn same_as(&self, other: &ErrorHandler) -> bool {
        Arc::ptr_eq(&self.action, &other.action)
    }

    pub fn call(
        &self,
        error: &HttpError,
        ctx: &RequestContext<'_>,
    ) -> Result<RenderResult, HttpError> {
        guarded(|| (self.action)(error, ctx))
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_deref()
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("has_view", &self.view.is_some())
            .finish()
    }
}

/// Render structured values through `view`. A panic becomes a 500.
pub fn render_view(view: &View, values: Vec<Value>) -> Result<String, HttpError> {
    guarded(|| view(values))
}

fn guarded<T>(f: impl FnOnce() -> Result<T, HttpError>) -> Result<T, HttpError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = panic_message(&*payload);
        tracing::error!(panic = %message, "Handler panicked");
        Err(HttpError::internal(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// What an action sees of the request being dispatched.
pub struct RequestContext<'a> {
    router: &'a Router,
    route: Option<&'a str>,
    args: &'a Captures,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(router: &'a Router, route: Option<&'a str>, args: &'a Captures) -> Self {
        Self {
            router,
            route,
            args,
        }
    }

    /// A captured placeholder value; a missing one is a 500.
    pub fn param(&self, name: &str) -> Result<&'a str, HttpError> {
        self.args.get(name).ok_or_else(|| {
            HttpError::internal(format!(
                "route \"{}\" has no parameter \"{}\"",
                self.route.unwrap_or_default(),
                name
            ))
        })
    }

    pub fn args(&self) -> &'a Captures {
        self.args
    }

    /// Name of the matched route, `None` when no route matched.
    pub fn active_route(&self) -> Option<&'a str> {
        self.route
    }

    pub fn developer_mode(&self) -> bool {
        self.router.developer_mode()
    }

    pub fn router(&self) -> &'a Router {
        self.router
    }

    /// Route-relative URL, see [`Router::generate_url`].
    pub fn generate_url(&self, name: &str, args: &[&str]) -> Result<String, RouteError> {
        self.router.generate_url(name, args)
    }

    /// URL including the deployment base path.
    pub fn absolute_url(&self, name: &str, args: &[&str]) -> Result<String, RouteError> {
        self.router.absolute_url(name, args)
    }

    /// A prepared 303 towards another route.
    pub fn redirect_to(&self, name: &str, args: &[&str]) -> Result<RenderResult, HttpError> {
        let url = self.absolute_url(name, args)?;
        Ok(RenderResult::Prepared(Response::redirect(url)))
    }
}
