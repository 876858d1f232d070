//! Cabinet - a multi-user file cabinet.
//!
//! Users upload files, file them into folders, and share them publicly or
//! keep them private. An HTTP API is provided in [`web`].

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{CabinetError, Result};
pub use file::{FileService, FileStorage, Principal};
