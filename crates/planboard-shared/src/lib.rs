//! Types shared by the planboard client and the development backend.
//!
//! Nothing in here performs I/O: entity models, request bodies, the response
//! envelope, form schemas and the image upload guard.

pub mod api;
pub mod models;
pub mod schema;
pub mod upload;

pub use models::*;
