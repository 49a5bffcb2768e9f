//! Estate API Library
//!
//! HTTP handlers, authentication, middleware and application setup for the
//! property listing service.

mod handlers;
mod middleware;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
