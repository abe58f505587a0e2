//! Front controller router for server-rendered web applications.
//!
//! Routes are registered once at startup through an [`kernel::Application`],
//! then every request is matched segment by segment, dispatched to its
//! handler and turned into a [`http::Response`]. Failures go through
//! per-status error routes with a built-in fallback.

pub mod config;
pub mod http;
pub mod kernel;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use http::{HttpServer, RequestDescriptor, Response};
pub use kernel::{Application, Bootstrap, Kernel};
pub use routing::{ErrorHandler, Handler, HttpError, RenderResult, RequestContext, Router};
