//! Data models for the application
//!
//! Catalog records and the request/response shapes built from them.

mod user;
mod video;

pub use user::*;
pub use video::*;
