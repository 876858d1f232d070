//! HTTP API for Cabinet.
//!
//! This module exposes the file lifecycle over REST. Bearer tokens are
//! verified here; issuing them is left to an external auth service.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
