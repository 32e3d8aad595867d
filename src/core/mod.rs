//! Core types and functionality for weft
//!
//! This module forms the foundation of weft's type system: the crate-wide
//! error enum, the user-facing error context wrapper, and the conversion
//! helpers used by the CLI.
//!
//! # Modules
//!
//! ## `error` - Comprehensive Error Handling
//!
//! - [`WeftError`] - Enumerated error types covering all weft failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Design Principles
//!
//! ## Loud contracts, quiet plumbing
//! Dependency-graph and lifecycle failures degrade silently (empty results,
//! logged warnings). Resource/import contract failures are loud and block
//! usage of the offending component class. The error types here exist for the
//! loud half.

pub mod error;

pub use error::{ErrorContext, Result, WeftError, user_friendly_error};
