//! Project manifest parsing and layout classification (weft.toml)
//!
//! A weft project is described by a `weft.toml` manifest at the project root.
//! The manifest names the frontend, backend and common directory groups,
//! optionally points at an import map, and whitelists backend modules that
//! may appear in frontend dependency graphs.
//!
//! # Manifest Format (weft.toml)
//!
//! ```toml
//! [app]
//! name = "my-app"
//! frontend = ["frontend"]
//! backend = ["backend"]
//! common = ["common"]
//! import_map = "importmap.json"
//! expose_backend = ["backend/api.ts"]
//! external_prefixes = ["npm:", "node:", "https://deno.land/"]
//! ```
//!
//! All directory entries are interpreted relative to the manifest's own
//! directory. [`find_manifest`] discovers the manifest by walking up from a
//! starting directory, so commands work from anywhere inside a project.
//!
//! # Directory classification
//!
//! [`ProjectLayout::dir_kind`] answers which group a module path belongs to.
//! The resolver uses this to keep backend-only modules out of frontend
//! dependency graphs: a specifier resolving into a backend directory is
//! dropped unless it is listed in `expose_backend`.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Result, WeftError};
use crate::resolver::module_id::ModuleId;
use crate::utils::normalize_path;

/// Manifest file name searched for in the project tree.
pub const MANIFEST_NAME: &str = "weft.toml";

/// Default external specifier prefixes skipped by the resolver.
///
/// Specifiers under these prefixes address package registries or CDNs whose
/// transitive dependencies are not part of the application's frontend graph.
pub const DEFAULT_EXTERNAL_PREFIXES: &[&str] = &["npm:", "node:", "https://deno.land/"];

/// Top-level manifest structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manifest {
    /// The `[app]` table.
    pub app: AppConfig,
}

/// The `[app]` table of weft.toml.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Application name.
    #[serde(default)]
    pub name: Option<String>,

    /// Frontend directory groups, relative to the manifest directory.
    #[serde(default = "default_frontend")]
    pub frontend: Vec<PathBuf>,

    /// Backend directory groups, relative to the manifest directory.
    #[serde(default = "default_backend")]
    pub backend: Vec<PathBuf>,

    /// Common (shared) directory groups, relative to the manifest directory.
    #[serde(default = "default_common")]
    pub common: Vec<PathBuf>,

    /// Optional import map file, relative to the manifest directory.
    #[serde(default)]
    pub import_map: Option<PathBuf>,

    /// Backend modules exposed to frontend dependency graphs.
    #[serde(default)]
    pub expose_backend: Vec<PathBuf>,

    /// External specifier prefixes to skip during resolution.
    #[serde(default = "default_external_prefixes")]
    pub external_prefixes: Vec<String>,
}

fn default_frontend() -> Vec<PathBuf> {
    vec![PathBuf::from("frontend")]
}

fn default_backend() -> Vec<PathBuf> {
    vec![PathBuf::from("backend")]
}

fn default_common() -> Vec<PathBuf> {
    vec![PathBuf::from("common")]
}

fn default_external_prefixes() -> Vec<String> {
    DEFAULT_EXTERNAL_PREFIXES.iter().map(|p| (*p).to_string()).collect()
}

impl Manifest {
    /// Parses a manifest from a file.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::ManifestParseError`] on syntax errors and IO
    /// failures.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WeftError::ManifestParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| WeftError::ManifestParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Searches for `weft.toml` in `start` and all parent directories.
///
/// # Errors
///
/// Returns [`WeftError::ManifestNotFound`] when no manifest exists anywhere
/// up the tree.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        dir = current.parent();
    }
    Err(WeftError::ManifestNotFound)
}

/// Which directory group a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    /// Served to the client.
    Frontend,
    /// Server-only code, excluded from frontend graphs by default.
    Backend,
    /// Shared between both.
    Common,
}

/// Resolved project layout: the manifest's directory groups as absolute paths.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    frontend: Vec<PathBuf>,
    backend: Vec<PathBuf>,
    common: Vec<PathBuf>,
}

impl ProjectLayout {
    /// Builds a layout from a parsed manifest and the directory containing it.
    #[must_use]
    pub fn new(config: &AppConfig, root: &Path) -> Self {
        let absolutize =
            |dirs: &[PathBuf]| dirs.iter().map(|d| normalize_path(&root.join(d))).collect();
        Self {
            root: normalize_path(root),
            frontend: absolutize(&config.frontend),
            backend: absolutize(&config.backend),
            common: absolutize(&config.common),
        }
    }

    /// The project root (the manifest's directory).
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classifies a module path into its directory group.
    ///
    /// Backend wins over frontend wins over common, matching the order the
    /// groups are consulted when deciding graph membership. Paths outside
    /// every group return `None`.
    #[must_use]
    pub fn dir_kind(&self, path: &Path) -> Option<DirKind> {
        if self.backend.iter().any(|dir| path.starts_with(dir)) {
            return Some(DirKind::Backend);
        }
        if self.frontend.iter().any(|dir| path.starts_with(dir)) {
            return Some(DirKind::Frontend);
        }
        if self.common.iter().any(|dir| path.starts_with(dir)) {
            return Some(DirKind::Common);
        }
        None
    }

    /// Validates that every configured directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::AppDirectoryMissing`] or
    /// [`WeftError::AppDirectoryNotADirectory`] for the first offending entry.
    pub fn validate(&self) -> Result<()> {
        for (kind, dirs) in [
            ("frontend", &self.frontend),
            ("backend", &self.backend),
            ("common", &self.common),
        ] {
            for dir in dirs {
                if !dir.exists() {
                    return Err(WeftError::AppDirectoryMissing {
                        kind: kind.to_string(),
                        path: dir.display().to_string(),
                    });
                }
                if !dir.is_dir() {
                    return Err(WeftError::AppDirectoryNotADirectory {
                        kind: kind.to_string(),
                        path: dir.display().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Resolves the `expose_backend` entries into canonical module identities.
    #[must_use]
    pub fn exposed_backend_modules(&self, root: &Path) -> HashSet<ModuleId> {
        self.expose_backend
            .iter()
            .map(|p| ModuleId::from_path(&root.join(p)))
            .collect()
    }
}

/// A parsed import map: specifier → canonical target.
///
/// Follows the standard import-map JSON shape (`{"imports": {...}}`). Exact
/// keys remap whole specifiers; keys ending in `/` remap specifier prefixes,
/// so `"lib/": "https://cdn.example.com/lib/"` maps `lib/util.ts` to
/// `https://cdn.example.com/lib/util.ts`. Scopes are not supported.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportMap {
    /// Specifier mappings.
    #[serde(default)]
    pub imports: BTreeMap<String, String>,
}

impl ImportMap {
    /// Loads an import map from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::ImportMapError`] on IO or JSON failures.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WeftError::ImportMapError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| WeftError::ImportMapError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Remaps a specifier through the import map, if a mapping applies.
    #[must_use]
    pub fn resolve(&self, specifier: &str) -> Option<String> {
        if let Some(target) = self.imports.get(specifier) {
            return Some(target.clone());
        }
        for (key, target) in &self.imports {
            if key.ends_with('/')
                && let Some(rest) = specifier.strip_prefix(key.as_str())
            {
                return Some(format!("{target}{rest}"));
            }
        }
        None
    }
}
