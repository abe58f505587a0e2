//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → request.rs (RequestDescriptor: redirect URL, script name, document root)
//!     → [kernel → router dispatch]
//!     → response.rs (status, raw headers, body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::RequestDescriptor;
pub use response::Response;
pub use server::HttpServer;
