//! Error handling for weft
//!
//! This module provides the error types and user-friendly error reporting for
//! the weft framework core. The error system is designed around two
//! principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`WeftError`] - Enumerated error types for all failure cases in weft
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Project configuration**: [`WeftError::ManifestNotFound`],
//!   [`WeftError::ManifestParseError`], [`WeftError::AppDirectoryMissing`], etc.
//! - **Module resolution**: [`WeftError::InvalidModuleSpecifier`],
//!   [`WeftError::ImportMapError`]
//! - **Component resource contracts**: [`WeftError::ResourceExportNotFound`],
//!   [`WeftError::ResourceLoadFailed`], [`WeftError::ResourcesDisabled`],
//!   [`WeftError::ComponentModuleUnknown`], [`WeftError::ResourceFileMissing`],
//!   [`WeftError::StandaloneProperty`]
//!
//! Note the deliberate asymmetry with the rest of the crate: dependency
//! resolution and lifecycle hook failures degrade silently (empty cached
//! results, logged warnings) and never surface here. Resource and import
//! contract failures are loud - a component class whose declared contract
//! cannot be satisfied must not be silently half-initialized.
//!
//! # Error Conversion and Context
//!
//! Common standard library errors are automatically converted:
//! - [`std::io::Error`] → [`WeftError::IoError`]
//! - [`toml::de::Error`] → [`WeftError::TomlError`]
//! - [`serde_json::Error`] → [`WeftError::JsonError`]
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly
//! format with contextual suggestions for CLI display.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for weft operations
///
/// Each variant represents a specific failure mode and carries the context
/// needed to produce an actionable message: file paths, component class
/// names, export names, and reasons.
#[derive(Error, Debug)]
pub enum WeftError {
    /// Project manifest (weft.toml) not found in current or parent directories
    #[error("weft.toml not found in current directory or any parent directory")]
    ManifestNotFound,

    /// Project manifest could not be parsed as TOML
    #[error("Failed to parse manifest at {path}: {reason}")]
    ManifestParseError {
        /// Path to the manifest file
        path: String,
        /// Parse failure details
        reason: String,
    },

    /// A configured app directory (frontend/backend/common) does not exist
    #[error("The specified {kind} directory '{path}' does not exist")]
    AppDirectoryMissing {
        /// Directory group: "frontend", "backend", or "common"
        kind: String,
        /// The missing path
        path: String,
    },

    /// A configured app directory path exists but is not a directory
    #[error("The specified {kind} path '{path}' is not a directory")]
    AppDirectoryNotADirectory {
        /// Directory group: "frontend", "backend", or "common"
        kind: String,
        /// The offending path
        path: String,
    },

    /// Import map file could not be read or parsed
    #[error("Failed to load import map from {path}: {reason}")]
    ImportMapError {
        /// Path to the import map file
        path: String,
        /// Failure details
        reason: String,
    },

    /// A module specifier could not be turned into a canonical identity
    #[error("Invalid module specifier '{specifier}': {reason}")]
    InvalidModuleSpecifier {
        /// The offending specifier text
        specifier: String,
        /// Why it could not be resolved
        reason: String,
    },

    /// A declared component export is not present in any resource file
    #[error("'{export}' is not exported in {searched}")]
    ResourceExportNotFound {
        /// Component class name
        class: String,
        /// The declared export name
        export: String,
        /// The resource files that were searched, joined with " or "
        searched: String,
    },

    /// A component resource file could not be loaded
    #[error("Error loading resource module '{location}' for component class '{class}': {reason}")]
    ResourceLoadFailed {
        /// Component class name
        class: String,
        /// Resource module location
        location: String,
        /// Load failure details
        reason: String,
    },

    /// A component declares imports but has resources disabled
    #[error(
        "Could not load export '{export}' for component class '{class}' - external resources \
         are disabled. Either enable resources for the class or remove the declared import."
    )]
    ResourcesDisabled {
        /// Component class name
        class: String,
        /// The declared export name
        export: String,
    },

    /// A component class was registered without a source module
    #[error(
        "Could not load export '{export}' for component class '{class}'. The component module \
         could not be initialized correctly (missing class module registration?)"
    )]
    ComponentModuleUnknown {
        /// Component class name
        class: String,
        /// The declared export name
        export: String,
    },

    /// A component declares imports but no resource file exists next to its module
    #[error(
        "No resource module file found for export '{export}' in component class '{class}'. \
         Please create a resource file '{expected}' or declare an explicit resource location."
    )]
    ResourceFileMissing {
        /// Component class name
        class: String,
        /// The declared export name
        export: String,
        /// The expected sidecar file location
        expected: String,
    },

    /// An export declared with an explicit location is not exported there
    #[error(
        "Could not load export '{export}' for component class '{class}': not exported from \
         location '{location}'"
    )]
    ResourceExportMissingAtLocation {
        /// Component class name
        class: String,
        /// The declared export name
        export: String,
        /// The explicit resource location
        location: String,
    },

    /// A standalone property lacks a supporting id/content/layout/child declaration
    #[error(
        "Standalone property '{property}' on component class '{class}' is only supported in \
         combination with an id, content, layout or child declaration"
    )]
    StandaloneProperty {
        /// Component class name
        class: String,
        /// The property name
        property: String,
    },

    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// Generic error with a message
    #[error("{message}")]
    Other {
        /// The error message
        message: String,
    },
}

/// A [`Result`] alias for weft operations.
pub type Result<T, E = WeftError> = std::result::Result<T, E>;

/// Error context wrapper providing user-friendly messages
///
/// Wraps a [`WeftError`] with an optional suggestion and details for CLI
/// display. Suggestions are actionable steps shown in green; details give
/// background shown in yellow.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying weft error
    pub error: WeftError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`WeftError`]
    #[must_use]
    pub const fn new(error: WeftError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details about the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// This function is the main entry point for converting arbitrary errors into
/// user-friendly messages for CLI display. It recognizes [`WeftError`]
/// variants and common IO failures and attaches tailored suggestions.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(weft_error) = error.downcast_ref::<WeftError>() {
        return create_error_context(weft_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(WeftError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check file ownership or run with elevated permissions")
                .with_details("weft does not have permission to read or write a required file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(WeftError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(WeftError::Other {
        message,
    })
}

/// Map each [`WeftError`] variant to an [`ErrorContext`] with tailored suggestions.
fn create_error_context(error: &WeftError) -> ErrorContext {
    match error {
        WeftError::ManifestNotFound => ErrorContext::new(WeftError::ManifestNotFound)
            .with_suggestion(
                "Create a weft.toml in your project root describing the frontend, backend and \
                 common directories",
            )
            .with_details("weft searches for weft.toml in the current directory and all parents"),

        WeftError::ManifestParseError { path, reason } => {
            ErrorContext::new(WeftError::ManifestParseError {
                path: path.clone(),
                reason: reason.clone(),
            })
            .with_suggestion("Check the TOML syntax of your weft.toml")
        }

        WeftError::AppDirectoryMissing { kind, path } => {
            ErrorContext::new(WeftError::AppDirectoryMissing {
                kind: kind.clone(),
                path: path.clone(),
            })
            .with_suggestion(format!(
                "Create the {kind} directory or update the '{kind}' entry in weft.toml"
            ))
        }

        WeftError::ImportMapError { path, reason } => ErrorContext::new(WeftError::ImportMapError {
            path: path.clone(),
            reason: reason.clone(),
        })
        .with_suggestion("Import maps must be JSON objects of the form {\"imports\": {...}}"),

        WeftError::ResourceExportNotFound { class, export, searched } => {
            ErrorContext::new(WeftError::ResourceExportNotFound {
                class: class.clone(),
                export: export.clone(),
                searched: searched.clone(),
            })
            .with_suggestion(format!(
                "Add an '{export}' export to one of the resource modules of '{class}', or \
                 remove the declared import"
            ))
            .with_details(
                "A component's declared imports are a contract: if an export cannot be located, \
                 the component class is unusable",
            )
        }

        _ => ErrorContext::new(WeftError::Other {
            message: error.to_string(),
        }),
    }
}
