//! REST API client module for the Depot file storage service.
//!
//! This module provides the `ApiClient` for communicating with a Depot
//! server: account registration, login, and the upload/list/download
//! file operations.
//!
//! All file operations use bearer token authentication obtained through
//! the `/token/` endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
