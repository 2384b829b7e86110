//! Error handling for Packsmith
//!
//! This module provides the error type shared by the unifier, the splitter and the
//! catalog builder, plus user-friendly error reporting for the CLI. The error system
//! is designed around two core principles:
//! 1. **Strongly-typed errors** so callers can react to a specific failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ContentError`] - Enumerated error kinds for every contract violation
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Operations return [`anyhow::Result`]; contract violations are raised as
//! [`ContentError`] values so callers can `downcast_ref::<ContentError>()` them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use packsmith_cli::core::{ContentError, user_friendly_error};
//!
//! let error = ContentError::OutputExists {
//!     path: "Packs/Demo/Integrations/Demo/integration-Demo.yml".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Suggests re-running with --force
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Packsmith operations
///
/// The first ten variants form the closed set of content error kinds. The remaining
/// variants wrap lower-level failures so that `?` works on I/O and parser results.
///
/// # Examples
///
/// ```rust,no_run
/// use packsmith_cli::core::ContentError;
///
/// fn handle_error(error: &ContentError) {
///     match error {
///         ContentError::OutputExists { path } => {
///             eprintln!("{path} already exists, pass --force to overwrite");
///         }
///         ContentError::DuplicateContentId { id, kind, .. } => {
///             eprintln!("{kind} '{id}' is defined twice");
///         }
///         _ => eprintln!("Unexpected error: {error}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum ContentError {
    /// Input path has the wrong shape for the requested operation
    ///
    /// Raised when `unify` is given something that is not a directory, or `split`
    /// is given a yml that is not a unified content item.
    #[error("Invalid input {path}: {reason}")]
    InvalidInput {
        /// The offending input path
        path: String,
        /// Why the input was rejected
        reason: String,
    },

    /// The package directory does not contain exactly one usable manifest
    #[error("Could not determine the manifest of package {path}: {reason}")]
    ManifestAmbiguous {
        /// The package directory
        path: String,
        /// What was found instead of a single manifest
        reason: String,
    },

    /// The package directory does not contain exactly one code file
    #[error("Could not determine the code file of package {path}: {reason}")]
    CodeFileAmbiguous {
        /// The package directory
        path: String,
        /// What was found instead of a single code file
        reason: String,
    },

    /// An imported API module has no source on disk
    #[error("API module '{module}' was not found at {path}")]
    MissingApiModule {
        /// The module name, e.g. `MicrosoftApiModule`
        module: String,
        /// Where the module source was expected
        path: String,
    },

    /// A field the unifier would inline is already populated
    #[error("Field '{field}' is already populated in {path}")]
    DuplicateInlineField {
        /// The yml key, e.g. `image` or `detaileddescription`
        field: String,
        /// The manifest that already carries the field
        path: String,
    },

    /// `dockerimage45` is present but the version bounds do not straddle the split point
    #[error("Cannot split on dockerimage45: {bound} {value} is {relation} {split}")]
    VersionBoundsConflict {
        /// `fromversion` or `toversion`
        bound: String,
        /// The declared bound
        value: String,
        /// Human description of the violated side, e.g. "at or above"
        relation: String,
        /// The split version
        split: String,
    },

    /// The destination already exists and `force` was not given
    #[error("Output already exists: {path}")]
    OutputExists {
        /// The colliding path
        path: String,
    },

    /// A version field has an unsupported format
    #[error("Invalid version '{version}' in field '{field}'")]
    InvalidVersion {
        /// The field that holds the version
        field: String,
        /// The rejected value
        version: String,
    },

    /// Two records of the same kind collide
    #[error("Duplicate {kind} id '{id}' found in {first} and {second}")]
    DuplicateContentId {
        /// The duplicated id
        id: String,
        /// The id-set bucket, e.g. `integrations`
        kind: String,
        /// Pack (or source) of the first record
        first: String,
        /// Pack (or source) of the second record
        second: String,
    },

    /// A content document could not be read or has the wrong structure
    #[error("Malformed document {path}: {reason}")]
    MalformedDocument {
        /// The document path
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for ContentError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidInput {
                path,
                reason,
            } => Self::InvalidInput {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::ManifestAmbiguous {
                path,
                reason,
            } => Self::ManifestAmbiguous {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::CodeFileAmbiguous {
                path,
                reason,
            } => Self::CodeFileAmbiguous {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::MissingApiModule {
                module,
                path,
            } => Self::MissingApiModule {
                module: module.clone(),
                path: path.clone(),
            },
            Self::DuplicateInlineField {
                field,
                path,
            } => Self::DuplicateInlineField {
                field: field.clone(),
                path: path.clone(),
            },
            Self::VersionBoundsConflict {
                bound,
                value,
                relation,
                split,
            } => Self::VersionBoundsConflict {
                bound: bound.clone(),
                value: value.clone(),
                relation: relation.clone(),
                split: split.clone(),
            },
            Self::OutputExists {
                path,
            } => Self::OutputExists {
                path: path.clone(),
            },
            Self::InvalidVersion {
                field,
                version,
            } => Self::InvalidVersion {
                field: field.clone(),
                version: version.clone(),
            },
            Self::DuplicateContentId {
                id,
                kind,
                first,
                second,
            } => Self::DuplicateContentId {
                id: id.clone(),
                kind: kind.clone(),
                first: first.clone(),
                second: second.clone(),
            },
            Self::MalformedDocument {
                path,
                reason,
            } => Self::MalformedDocument {
                path: path.clone(),
                reason: reason.clone(),
            },
            // Underlying error types are not Clone; keep the message
            Self::Io(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Yaml(e) => Self::Other {
                message: format!("YAML error: {e}"),
            },
            Self::Json(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying a suggestion and details for CLI display
///
/// # Examples
///
/// ```rust,no_run
/// use packsmith_cli::core::{ContentError, ErrorContext};
///
/// let context = ErrorContext::new(ContentError::OutputExists { path: "out.yml".into() })
///     .with_suggestion("Re-run with --force to overwrite")
///     .with_details("The unifier never overwrites existing files by default");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ContentError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ContentError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
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
/// Recognizes, in order:
/// - [`ContentError`] variants, with tailored suggestions
/// - [`std::io::Error`] kinds with filesystem guidance
/// - anything else, rendered with its full cause chain
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(content_error) = error.downcast_ref::<ContentError>() {
        return create_error_context(content_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ContentError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check the ownership and permissions of the content repository")
                .with_details("Packsmith needs to read package directories and write output files");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ContentError::Other {
                    message: format!("File not found: {io_error}"),
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

    ErrorContext::new(ContentError::Other {
        message,
    })
}

/// Map each [`ContentError`] variant to an [`ErrorContext`] with suggestions.
fn create_error_context(error: ContentError) -> ErrorContext {
    match &error {
        ContentError::InvalidInput { .. } => ErrorContext::new(error)
            .with_suggestion("unify expects a package directory; split expects a unified yml with a 'script' or 'rules' field"),

        ContentError::ManifestAmbiguous { .. } => ErrorContext::new(error)
            .with_suggestion("Keep exactly one <name>.yml manifest in the package directory")
            .with_details("Unified files (integration-*.yml, script-*.yml, *_unified.yml) are ignored when locating the manifest"),

        ContentError::CodeFileAmbiguous { .. } => ErrorContext::new(error)
            .with_suggestion("Keep exactly one code file matching the script type; test files and CommonServer files are ignored"),

        ContentError::MissingApiModule { module, .. } => {
            let suggestion = format!(
                "Make sure Packs/ApiModules/Scripts/{module}/{module}.py exists, or set api_modules_dir in the config file"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ContentError::DuplicateInlineField { .. } => ErrorContext::new(error)
            .with_suggestion("Remove the field from the manifest or re-run with --force")
            .with_details("The image and detailed description are read from the package files during unify"),

        ContentError::VersionBoundsConflict { .. } => ErrorContext::new(error)
            .with_suggestion("Items with dockerimage45 must have fromversion below 5.0.0 and toversion at or above 5.0.0")
            .with_details("Two documents are emitted: one for 5.0.0 and later, one for 4.5.9 and earlier"),

        ContentError::OutputExists { .. } => ErrorContext::new(error)
            .with_suggestion("Remove the existing output or re-run with --force to overwrite it"),

        ContentError::InvalidVersion { .. } => ErrorContext::new(error)
            .with_suggestion("Versions must use the dotted x.y.z form, e.g. 6.5.0"),

        ContentError::DuplicateContentId { .. } => ErrorContext::new(error)
            .with_suggestion("Give one of the items a new id, or separate their fromversion/toversion ranges or marketplaces"),

        ContentError::MalformedDocument { .. } => ErrorContext::new(error)
            .with_suggestion("Check the YAML/JSON syntax of the document"),

        _ => ErrorContext::new(error),
    }
}
