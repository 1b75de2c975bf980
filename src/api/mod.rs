//! REST API surface.
//!
//! Routes are nested under `/api/`. Login and registration are public;
//! everything else requires a bearer session token. The router is
//! composable — `api_router()` returns a `Router` that can be mounted on
//! any axum server.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ServerHandle};
pub use types::ApiContext;
