//! Frontend module dependency resolution.
//!
//! This module decides which modules ship to the frontend: starting from an
//! entrypoint, it walks static imports, dynamic loads and re-exports,
//! resolves every specifier to a canonical identity, and accumulates the
//! transitive dependency set per module. The walk is memoized per build
//! session, tolerant of cycles, and safe under concurrent root requests.
//!
//! # Architecture
//!
//! - [`ModuleId`](module_id::ModuleId) - canonical identity (local path or URL)
//! - [`scanner`] - regex-based specifier extraction from source text
//! - [`DependencyCache`](cache::DependencyCache) - session-scoped memoized sets
//! - [`DependencyResolver`] - the recursive walker and its coordination state
//! - [`DependencyGraph`](graph::DependencyGraph) - petgraph view for analysis
//!
//! # Resolution semantics
//!
//! For each module the resolver:
//! 1. returns the cached set when resolution already completed (never re-scans),
//! 2. returns an empty, uncached set when the module is already on the current
//!    walk's visitation path (cycle suppression - a sibling walk may still
//!    resolve the module fully later),
//! 3. otherwise loads the content, scans specifiers, skips type-only and
//!    external-registry references, remaps through the import map, drops
//!    backend modules that are not explicitly exposed, and recurses into every
//!    surviving specifier with a copied visitation path.
//!
//! Load failures degrade silently: the failing module's dependency set is
//! cached as empty and never retried.
//!
//! # Concurrency
//!
//! Child resolutions fan out and are joined in aggregate; none blocks its
//! siblings. Every externally-initiated ("root") resolution registers itself
//! with a tracker so that [`DependencyResolver::load_dependency_list`] can
//! await *all* outstanding roots before reading results - a caller never
//! observes a partially computed graph. Two concurrent root requests for the
//! same file are not coalesced below the cycle guard; the duplicated walk is
//! an accepted cost for a build-time tool.

pub mod cache;
pub mod graph;
pub mod module_id;
pub mod scanner;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use tokio::sync::Notify;

use crate::core::Result;
use crate::manifest::{DirKind, ImportMap, Manifest, ProjectLayout};
use crate::utils::relative_to;

pub use cache::DependencyCache;
pub use graph::DependencyGraph;
pub use module_id::ModuleId;

/// Loads module content by canonical identity.
///
/// The default implementation reads local files and fetches web modules;
/// tests inject in-memory loaders to observe scan counts and simulate
/// failures.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Returns the source text of the module.
    async fn load(&self, id: &ModuleId) -> anyhow::Result<String>;
}

/// Filesystem + HTTP module loader.
#[derive(Debug, Default)]
pub struct DefaultLoader {
    client: reqwest::Client,
}

impl DefaultLoader {
    /// Creates a loader with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModuleLoader for DefaultLoader {
    async fn load(&self, id: &ModuleId) -> anyhow::Result<String> {
        match id {
            ModuleId::Local(path) => Ok(tokio::fs::read_to_string(path).await?),
            ModuleId::Web(url) => {
                let response = self.client.get(url.clone()).send().await?.error_for_status()?;
                Ok(response.text().await?)
            }
        }
    }
}

/// Tracks in-flight root resolutions so readers can await quiescence.
#[derive(Debug, Default)]
struct RootTracker {
    active: AtomicUsize,
    notify: Notify,
}

impl RootTracker {
    fn begin(self: Arc<Self>) -> RootGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        RootGuard(self)
    }

    /// Resolves once no root resolution is in flight.
    async fn wait_idle(&self) {
        loop {
            // register interest before checking, so a completion between the
            // check and the await cannot be missed
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct RootGuard(Arc<RootTracker>);

impl Drop for RootGuard {
    fn drop(&mut self) {
        if self.0.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.notify.notify_waiters();
        }
    }
}

/// Nested presentation of a resolved dependency graph.
///
/// Keys are module identities, with local files rendered relative to the
/// project root. A `None` value marks a module that was already expanded
/// elsewhere in the tree (or has no recorded resolution), so cyclic graphs
/// materialize as finite trees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyTree(pub BTreeMap<String, Option<DependencyTree>>);

/// Recursive, cached, concurrently-deduplicated dependency resolver.
///
/// A `DependencyResolver` is a build-session object: it owns its cache and
/// coordination state, so independent sessions never share results. See the
/// [module docs](self) for the resolution semantics.
pub struct DependencyResolver {
    cache: DependencyCache,
    layout: ProjectLayout,
    import_map: ImportMap,
    exposed_backend: HashSet<ModuleId>,
    external_prefixes: Vec<String>,
    loader: Arc<dyn ModuleLoader>,
    roots: Arc<RootTracker>,
    scans: AtomicUsize,
}

impl DependencyResolver {
    /// Creates a resolver for the given project layout with default settings:
    /// empty import map, no exposed backend modules, the standard external
    /// prefixes, and the filesystem/HTTP loader.
    #[must_use]
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            cache: DependencyCache::new(),
            layout,
            import_map: ImportMap::default(),
            exposed_backend: HashSet::new(),
            external_prefixes: crate::manifest::DEFAULT_EXTERNAL_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            loader: Arc::new(DefaultLoader::new()),
            roots: Arc::new(RootTracker::default()),
            scans: AtomicUsize::new(0),
        }
    }

    /// Builds a resolver from a parsed manifest, loading the configured
    /// import map from disk when one is declared.
    ///
    /// # Errors
    ///
    /// Returns an error when the declared import map cannot be loaded.
    pub fn from_manifest(manifest: &Manifest, root: &Path) -> Result<Self> {
        let layout = ProjectLayout::new(&manifest.app, root);
        let mut resolver = Self::new(layout);
        if let Some(map_path) = &manifest.app.import_map {
            resolver.import_map = ImportMap::load(&root.join(map_path))?;
        }
        resolver.exposed_backend = manifest.app.exposed_backend_modules(root);
        resolver.external_prefixes = manifest.app.external_prefixes.clone();
        Ok(resolver)
    }

    /// Replaces the import map.
    #[must_use]
    pub fn with_import_map(mut self, import_map: ImportMap) -> Self {
        self.import_map = import_map;
        self
    }

    /// Replaces the exposed-backend-module set.
    #[must_use]
    pub fn with_exposed_backend(mut self, exposed: HashSet<ModuleId>) -> Self {
        self.exposed_backend = exposed;
        self
    }

    /// Replaces the module loader.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// The resolver's dependency cache.
    #[must_use]
    pub fn cache(&self) -> &DependencyCache {
        &self.cache
    }

    /// Number of modules whose content was actually loaded and scanned.
    ///
    /// Cache hits and cycle suppressions do not scan, so this counter makes
    /// memoization observable.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Whether a completed dependency set exists for `file`.
    #[must_use]
    pub fn has_dependency_list(&self, file: &ModuleId) -> bool {
        self.cache.contains(file)
    }

    /// Resolves the transitive dependency set of `file` (a root resolution).
    ///
    /// Infallible by design: modules that cannot be loaded contribute an
    /// empty, sticky-cached set. Concurrent root calls for *different* files
    /// proceed independently; a second root call for a file currently
    /// mid-resolution re-walks rather than coalescing (accepted duplicated
    /// work for a build-time tool).
    pub async fn resolve(&self, file: &ModuleId) -> Arc<HashSet<ModuleId>> {
        self.resolve_inner(file.clone(), Vec::new(), true).await
    }

    fn resolve_inner(
        &self,
        file: ModuleId,
        tree: Vec<ModuleId>,
        is_root: bool,
    ) -> BoxFuture<'_, Arc<HashSet<ModuleId>>> {
        Box::pin(async move {
            if let Some(cached) = self.cache.get(&file) {
                return cached;
            }

            // cycle: this walk already passed through the module. Return an
            // empty contribution without caching - a sibling, non-cyclic walk
            // may still resolve it fully.
            if tree.contains(&file) {
                return Arc::new(HashSet::new());
            }

            let _guard = is_root.then(|| Arc::clone(&self.roots).begin());

            let mut tree = tree;
            tree.push(file.clone());

            let source = match self.loader.load(&file).await {
                Ok(source) => {
                    self.scans.fetch_add(1, Ordering::SeqCst);
                    source
                }
                Err(err) => {
                    // i/o errors are expected for invalid paths; the outcome
                    // is a sticky empty set
                    tracing::debug!("failed to load module {file}: {err:#}");
                    return self.cache.insert(file, HashSet::new());
                }
            };

            let mut dependencies = HashSet::new();
            let mut pending = Vec::new();

            for import in scanner::scan_module_specifiers(&source) {
                if self.is_external(&import.specifier) {
                    continue;
                }
                let resolved = match self.resolve_specifier(&file, &import.specifier) {
                    Ok(id) => id,
                    Err(err) => {
                        tracing::debug!(
                            "skipping unresolvable specifier '{}' in {file}: {err}",
                            import.specifier
                        );
                        continue;
                    }
                };
                // backend modules stay out of frontend graphs unless exposed
                if self.is_hidden_backend(&resolved) {
                    continue;
                }
                pending.push(self.resolve_inner(resolved.clone(), tree.clone(), false));
                dependencies.insert(resolved);
            }

            for child_set in join_all(pending).await {
                dependencies.extend(child_set.iter().cloned());
            }

            self.cache.insert(file, dependencies)
        })
    }

    /// Resolves `file` and awaits every outstanding root resolution before
    /// returning the nested tree view, so the result is never a partially
    /// computed graph.
    pub async fn load_dependency_list(&self, file: &ModuleId) -> Option<DependencyTree> {
        self.resolve(file).await;
        self.roots.wait_idle().await;
        self.dependency_tree(file)
    }

    /// Reconstructs a nested tree view of `file`'s dependencies from the
    /// flat cache.
    ///
    /// Returns `None` when no resolution has been recorded for `file`.
    /// Re-visited modules appear as leaves rather than being re-expanded, so
    /// the tree is finite even for cyclic graphs.
    #[must_use]
    pub fn dependency_tree(&self, file: &ModuleId) -> Option<DependencyTree> {
        let mut visited = HashSet::new();
        self.tree_node(file, &mut visited)
    }

    fn tree_node(&self, file: &ModuleId, visited: &mut HashSet<ModuleId>) -> Option<DependencyTree> {
        visited.insert(file.clone());

        let dependencies = self.cache.get(file)?;
        let mut nodes = BTreeMap::new();
        for dep in dependencies.iter() {
            let key = self.display_key(dep);
            if visited.contains(dep) {
                nodes.insert(key, None);
            } else {
                nodes.insert(key, self.tree_node(dep, visited));
            }
        }
        Some(DependencyTree(nodes))
    }

    /// Renders a module identity for presentation: local files become
    /// root-relative paths, web modules keep their URL.
    #[must_use]
    pub fn display_key(&self, id: &ModuleId) -> String {
        match id.as_local_path() {
            Some(path) => relative_to(path, self.layout.root()),
            None => id.canonical(),
        }
    }

    fn is_external(&self, specifier: &str) -> bool {
        self.external_prefixes.iter().any(|prefix| specifier.starts_with(prefix))
    }

    fn is_hidden_backend(&self, id: &ModuleId) -> bool {
        let Some(path) = id.as_local_path() else {
            return false;
        };
        self.layout.dir_kind(path) == Some(DirKind::Backend) && !self.exposed_backend.contains(id)
    }

    fn resolve_specifier(&self, referrer: &ModuleId, specifier: &str) -> Result<ModuleId> {
        if let Some(mapped) = self.import_map.resolve(specifier) {
            // relative import-map targets resolve against the project root
            if mapped.starts_with("./") || mapped.starts_with("../") {
                return Ok(ModuleId::from_path(&self.layout.root().join(mapped)));
            }
            return ModuleId::parse(&mapped);
        }
        referrer.resolve(specifier)
    }
}
