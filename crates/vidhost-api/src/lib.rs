//! vidhost API
//!
//! HTTP surface for video upload, catalog listing, login and the media
//! proxy. `setup::initialize_app` wires the blob store, catalog and media
//! processors into an axum router.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
