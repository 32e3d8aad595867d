//! Canonical module identities.
//!
//! Every module in a dependency graph is keyed by its canonical identity: the
//! fully resolved, absolute form of a module reference. Local files are
//! normalized absolute paths; web modules are parsed URLs. Using the canonical
//! form as the cache key guarantees that `a/./b.ts` and `a/b.ts` are the same
//! graph node.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::core::{Result, WeftError};
use crate::utils::normalize_path;

/// Canonical identity of a module: a normalized absolute file path or a web URL.
///
/// Equality and hashing operate on the canonical form, so a `ModuleId` can be
/// used directly as a cache or graph key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    /// A local file, stored as a lexically normalized absolute path.
    Local(PathBuf),
    /// A web-addressed module.
    Web(Url),
}

impl ModuleId {
    /// Parses an absolute module reference into a canonical identity.
    ///
    /// Accepts `http(s)://` URLs, `file://` URLs, and absolute filesystem
    /// paths. Relative specifiers have no meaning without a referrer - resolve
    /// them with [`ModuleId::resolve`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::InvalidModuleSpecifier`] for relative or otherwise
    /// unresolvable references.
    pub fn parse(reference: &str) -> Result<Self> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(Self::Web(Url::parse(reference)?));
        }
        if let Some(path) = reference.strip_prefix("file://") {
            return Ok(Self::from_path(Path::new(path)));
        }
        if Path::new(reference).is_absolute() {
            return Ok(Self::from_path(Path::new(reference)));
        }
        Err(WeftError::InvalidModuleSpecifier {
            specifier: reference.to_string(),
            reason: "not an absolute path or URL".to_string(),
        })
    }

    /// Creates a local identity from a path, normalizing it lexically.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self::Local(normalize_path(path))
    }

    /// Whether this identity refers to a web-addressed module.
    #[must_use]
    pub const fn is_web(&self) -> bool {
        matches!(self, Self::Web(_))
    }

    /// The local path behind this identity, if any.
    #[must_use]
    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            Self::Local(path) => Some(path),
            Self::Web(_) => None,
        }
    }

    /// Resolves a specifier relative to this module.
    ///
    /// `./` and `../` specifiers join against the referrer (RFC 3986 join for
    /// web modules, lexical join for local files). Absolute references pass
    /// through [`ModuleId::parse`]. Bare specifiers are rejected here - they
    /// must be remapped by an import map first.
    ///
    /// # Errors
    ///
    /// Returns [`WeftError::InvalidModuleSpecifier`] when the specifier is
    /// bare or the join produces an invalid URL.
    pub fn resolve(&self, specifier: &str) -> Result<Self> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            return match self {
                Self::Local(path) => {
                    let parent = path.parent().unwrap_or_else(|| Path::new("/"));
                    Ok(Self::from_path(&parent.join(specifier)))
                }
                Self::Web(url) => Ok(Self::Web(url.join(specifier)?)),
            };
        }
        Self::parse(specifier)
    }

    /// The canonical string form of this identity.
    ///
    /// Local files render as `file://` URLs, matching the form used in
    /// dependency listings and error messages.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "file://{}", path.display()),
            Self::Web(url) => write!(f, "{url}"),
        }
    }
}
