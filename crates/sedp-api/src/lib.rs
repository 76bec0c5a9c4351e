//! HTTP layer for the SEDP registration service: axum handlers, the JWT
//! admin guard and the outbound WhatsApp webhook.

pub mod auth;
pub mod content;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notify;
pub mod registrations;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
