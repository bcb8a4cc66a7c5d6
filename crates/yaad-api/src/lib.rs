//! Yaad API crate - axum HTTP surface for the skill.
//!
//! Accepts platform turns on `POST /skill` and reports liveness and
//! durable-store health on `GET /health`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
