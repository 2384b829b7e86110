//! Core types for Packsmith
//!
//! This module holds the error type shared by every component and the user-facing
//! error context used by the CLI.
//!
//! - [`ContentError`] - the closed set of content error kinds
//! - [`ErrorContext`] - an error plus details and a suggestion, rendered in color
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] into an [`ErrorContext`]

pub mod error;

pub use error::{ContentError, ErrorContext, user_friendly_error};
