//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Application::register_routes / register_error_routes
//!     → router.rs (add_route, add_error_route)
//!     → table.rs (normalize, derive name, reject duplicates)
//!     → matcher.rs (compile pattern into segments)
//!     → Freeze as immutable Arc<Router>
//!
//! Per request:
//!     RequestDescriptor
//!     → dispatch.rs (strip base path, match, call handler)
//!     → handler.rs (RenderResult: Body | Structured | Prepared)
//!     → on failure: error route for the status code, or "default"
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex: segment-wise comparison only
//! - First registered match wins
//! - Dispatch state is per request, the route table is shared

pub mod dispatch;
pub mod error;
pub mod fallback;
pub mod handler;
pub mod matcher;
pub mod router;
pub mod table;

pub use dispatch::{Dispatch, DispatchAbort};
pub use error::{HttpError, RouteError};
pub use handler::{ErrorHandler, Handler, RenderResult, RequestContext};
pub use matcher::{Captures, PathPattern, Segment};
pub use router::{ErrorCode, Router};
pub use table::{Route, RouteMatch, RouteTable};
