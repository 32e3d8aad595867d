//! Integration test suite for weft
//!
//! End-to-end tests that exercise the library through real project layouts
//! on disk: a manifest, frontend/backend/common directories with actual
//! module files, and the `weft` binary itself.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolver**: dependency resolution over on-disk projects
//! - **routing**: component lifecycle and route resolution scenarios
//! - **cli**: `weft tree` binary behavior

mod cli;
mod resolver;
mod routing;
