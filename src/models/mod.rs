//! Data models for Depot entities.
//!
//! - `FileRecord`: one stored file as reported by the listing endpoint

pub mod file;

pub use file::FileRecord;
