//! Route representation and structural equality.
//!
//! A route is an ordered sequence of path segments. Equality is structural:
//! two routes are equal when their segment sequences are equal, regardless of
//! how they were spelled - `/a/b`, `a/b` and `a/b/` all parse to the same
//! route, and the empty route equals `/`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An ordered sequence of path segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route {
    segments: Vec<String>,
}

impl Route {
    /// The root route (no segments).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a route from segments, dropping empty ones so the structural
    /// equality invariant holds by construction.
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self {
            segments: segments.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Parses a slash-delimited path string. Leading and trailing slashes do
    /// not affect the result.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').map(str::to_string).collect())
    }

    /// The route's segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// The route after the first segment.
    #[must_use]
    pub fn rest(&self) -> Self {
        Self {
            segments: self.segments.iter().skip(1).cloned().collect(),
        }
    }

    /// A new route with `segment` prepended.
    #[must_use]
    pub fn prepended(&self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if segment.is_empty() {
            return self.clone();
        }
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(segment);
        segments.extend(self.segments.iter().cloned());
        Self {
            segments,
        }
    }

    /// A new route with `segment` appended.
    #[must_use]
    pub fn joined(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        let segment = segment.into();
        if !segment.is_empty() {
            segments.push(segment);
        }
        Self {
            segments,
        }
    }

    /// The slash-delimited representation, always with a leading slash
    /// (`/` for the root route).
    #[must_use]
    pub fn routename(&self) -> String {
        if self.segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.routename())
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl FromIterator<String> for Route {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
