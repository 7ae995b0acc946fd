//! HTTP service for report drafting and playbook retrieval
//!
//! Uses axum for routing and schemars for the JSON endpoint types.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod services;
pub mod types;

pub use routing::{create_router, AppState};
pub use server::start_server;
