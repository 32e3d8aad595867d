//! weft - fullstack web UI framework core
//!
//! weft is the build-graph and runtime-protocol core of a fullstack web UI
//! framework. It decides which modules ship to the frontend, drives the
//! lifecycle of components from construction through anchoring and teardown,
//! and resolves client-side routes through a component tree.
//!
//! # Architecture Overview
//!
//! weft splits a project into frontend, backend and common directory groups
//! (described by `weft.toml`) and keeps server-only code out of client-bound
//! dependency graphs:
//! - The **resolver** walks import statements recursively, memoizes every
//!   module's transitive dependency set per build session, suppresses cycles,
//!   and lets concurrent root resolutions proceed independently.
//! - The **component** model couples author-written behavior (an explicit
//!   capability trait with optional hooks) with a per-instance lifecycle
//!   state machine built on awaitable one-shot gates.
//! - The **routing** protocol asks each component in a tree to claim one
//!   path segment at a time, delegating downward and reconstructing the
//!   accepted route on the way back up.
//!
//! # Core Modules
//!
//! ## Build graph
//! - [`resolver`] - dependency resolution, caching, import scanning, graph
//!   analysis
//! - [`manifest`] - weft.toml parsing, directory classification, import maps
//!
//! ## Runtime protocols
//! - [`component`] - the [`Component`](component::Component) capability trait,
//!   lifecycle gates, class registries
//! - [`routing`] - route representation, recursive route resolution, the
//!   address-bar coordinator
//!
//! ## Supporting modules
//! - [`cli`] - the `weft` command-line interface
//! - [`core`] - error types and user-facing error contexts
//! - [`utils`] - lexical path helpers
//!
//! # Example: frontend dependency graph
//!
//! ```rust,no_run
//! use weft::manifest::{Manifest, ProjectLayout};
//! use weft::resolver::{DependencyResolver, ModuleId};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let root = Path::new("/srv/my-app");
//! let manifest = Manifest::load(&root.join("weft.toml"))?;
//! let resolver = DependencyResolver::from_manifest(&manifest, root)?;
//!
//! let entry = ModuleId::from_path(&root.join("frontend/entrypoint.ts"));
//! let shipped = resolver.resolve(&entry).await;
//! println!("{} modules ship to the client", shipped.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example: component lifecycle
//!
//! ```rust,no_run
//! use weft::component::{Component, ComponentBuilder, ComponentClass, Options};
//! use std::sync::Arc;
//!
//! struct Page;
//!
//! #[async_trait::async_trait]
//! impl Component for Page {
//!     async fn on_create(&self) -> anyhow::Result<()> {
//!         // runs exactly once per instance, on first attach
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let class = ComponentClass::builder("Page").build()?;
//! let page = ComponentBuilder::new(class, Arc::new(Page)).build();
//! page.construct(Options::new(), &[("title", "\"Home\"")]).await?;
//! page.attach(None).await;
//! page.anchored().wait().await;
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cli;
pub mod core;
pub mod manifest;
pub mod resolver;

// Runtime protocols
pub mod component;
pub mod routing;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
