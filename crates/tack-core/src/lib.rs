//! Core types and trait definitions for Tack's threaded comments and
//! notifications.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod comment;
pub mod error;
pub mod notification;
pub mod store;

pub use error::{Error, ErrorKind, Result, StoreError};
