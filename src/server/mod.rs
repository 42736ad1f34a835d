//! Server core functionality
//!
//! This module contains the HTTP server, its router and the API handlers
//! that translate requests into storage operations.

pub mod core;
pub mod handlers;
pub mod responses;
pub mod routes;

pub use self::core::Server;
pub use handlers::AppState;
pub use routes::build_router;
