//! Shopfloor API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! WebSocket live channel) so integration tests and the binary entrypoint
//! can both access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
