//! Cross-platform utilities and helpers
//!
//! This module provides small path utilities shared by the resolver and the
//! CLI. All helpers are purely lexical: they never touch the filesystem, so
//! they behave identically for paths that do not (yet) exist.
//!
//! # Modules
//!
//! - [`paths`] - Lexical path normalization and root-relative display

pub mod paths;

pub use paths::{normalize_path, relative_to};
