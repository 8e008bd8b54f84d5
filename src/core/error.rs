//! Error handling for the launcher.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! Failures fall into three classes with different propagation rules:
//! - Transport failures ([`LiftoffError::Network`]) are expected and
//!   user-recoverable. They abort the current update run, leave all
//!   persisted state untouched, and are reported with a retry suggestion.
//! - Corrupt local state ([`LiftoffError::StateCorruption`]) is recovered
//!   inline by the stores, which substitute a safe default. The variant
//!   exists so the substitution can be logged; it never aborts a run.
//! - Everything else is unexpected and is surfaced with full detail plus
//!   the configured support contact.
//!
//! Use [`user_friendly_error`] to convert any error into a displayable
//! [`ErrorContext`] with contextual suggestions.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for launcher operations.
///
/// Each variant carries the detail needed to render an actionable message.
/// Variants holding foreign error types (`Io`, `Toml`, `Json`) exist for
/// `?`-conversion at the boundaries; everything the launcher raises itself
/// uses the structured variants.
#[derive(Error, Debug)]
pub enum LiftoffError {
    /// Network failure while talking to the update service.
    ///
    /// Covers connectivity problems, timeouts, DNS failures, and HTTP error
    /// statuses. Always recoverable by retrying once the connection works.
    #[error("Network error during {operation}")]
    Network {
        /// The network operation that failed (e.g. "latest version check")
        operation: String,
        /// Reason reported by the transport layer
        reason: String,
    },

    /// A local state file exists but cannot be parsed.
    ///
    /// The stores recover from this by falling back to a default record, so
    /// this variant is logged rather than shown as a fatal error.
    #[error("State file {file} is corrupt")]
    StateCorruption {
        /// Path of the unparseable state file
        file: String,
        /// Parse failure detail
        reason: String,
    },

    /// The update server answered, but not with what the protocol expects.
    #[error("Unexpected response from the update server during {operation}")]
    InvalidServerResponse {
        /// The operation whose response was malformed
        operation: String,
        /// What was wrong with the response
        reason: String,
    },

    /// Launcher manifest (liftoff.toml) not found.
    #[error("Launcher manifest not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Launcher manifest parsing error.
    #[error("Invalid launcher manifest syntax in {file}")]
    ConfigParseError {
        /// Path to the manifest that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// File system error.
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the error occurred
        path: String,
    },

    /// Permission denied.
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// The operation that was denied
        operation: String,
        /// Path where permission was denied
        path: String,
    },

    /// A change-set entry would escape the install directory.
    #[error("Change set entry is not a safe relative path: {path}")]
    UnsafePath {
        /// The offending path as reported by the server
        path: String,
    },

    /// The application executable could not be started.
    #[error("Failed to launch {executable}")]
    LaunchFailed {
        /// Path of the executable that failed to start
        executable: String,
        /// Reason for the failure
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

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

impl LiftoffError {
    /// Whether this is a transport-class failure (expected, retryable).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// Wraps a [`LiftoffError`] and adds an optional suggestion and details.
/// This is the form in which errors reach the terminal:
/// 1. **Error**: the main message in red
/// 2. **Details**: additional context in yellow (optional)
/// 3. **Suggestion**: actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying launcher error
    pub error: LiftoffError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details attached.
    #[must_use]
    pub const fn new(error: LiftoffError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add explanatory details, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
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

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes the launcher's own error types and common foreign errors
/// (`std::io::Error`, `toml::de::Error`) and attaches suggestions matched to
/// the failure. Anything else is rendered generically with its full cause
/// chain so nothing is lost.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(liftoff_error) = error.downcast_ref::<LiftoffError>() {
        return create_error_context(liftoff_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(LiftoffError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion(
                    "Try running with elevated permissions or check file ownership",
                )
                .with_details(
                    "The launcher does not have permission to read or write its install directory",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(LiftoffError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(LiftoffError::ConfigParseError {
            file: "liftoff.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion(
            "Check the TOML syntax in liftoff.toml. Verify quotes, brackets, and table headers",
        );
    }

    // Generic error, include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LiftoffError::Other {
        message,
    })
}

/// Map each launcher error to a context with tailored suggestions.
fn create_error_context(error: &LiftoffError) -> ErrorContext {
    match error {
        LiftoffError::Network { operation, reason } => {
            ErrorContext::new(LiftoffError::Network {
                operation: operation.clone(),
                reason: reason.clone(),
            })
            .with_suggestion(
                "Couldn't connect to the update server. Check your internet connection or try again later",
            )
            .with_details(format!(
                "The {operation} failed ({reason}). Nothing was changed on disk; a later run resumes where this one stopped"
            ))
        }

        LiftoffError::StateCorruption { file, reason } => {
            ErrorContext::new(LiftoffError::StateCorruption {
                file: file.clone(),
                reason: reason.clone(),
            })
            .with_suggestion(format!(
                "Delete {file} to reset it. The launcher falls back to defaults automatically"
            ))
            .with_details(
                "A corrupt state file is treated as empty; at worst the next update refetches files it already had",
            )
        }

        LiftoffError::InvalidServerResponse { operation, reason } => {
            ErrorContext::new(LiftoffError::InvalidServerResponse {
                operation: operation.clone(),
                reason: reason.clone(),
            })
            .with_suggestion(
                "The update server may be misconfigured or running an incompatible version",
            )
            .with_details(reason.clone())
        }

        LiftoffError::ConfigNotFound { path } => {
            ErrorContext::new(LiftoffError::ConfigNotFound {
                path: path.clone(),
            })
            .with_suggestion(
                "Create a liftoff.toml next to the launcher binary with [remote] and [app] sections",
            )
            .with_details(
                "The manifest names the update endpoint, the managed projects, and the executable to launch",
            )
        }

        LiftoffError::ConfigParseError { file, reason } => {
            ErrorContext::new(LiftoffError::ConfigParseError {
                file: file.clone(),
                reason: reason.clone(),
            })
            .with_suggestion(format!(
                "Check the TOML syntax in {file}. Common issues: missing quotes, unmatched brackets"
            ))
            .with_details(reason.clone())
        }

        LiftoffError::PermissionDenied { operation, path } => {
            ErrorContext::new(LiftoffError::PermissionDenied {
                operation: operation.clone(),
                path: path.clone(),
            })
            .with_suggestion(match cfg!(windows) {
                true => "Run as Administrator or check file permissions in File Explorer",
                false => "Use 'sudo' or check file permissions with 'ls -la'",
            })
            .with_details(format!("Cannot {operation} due to insufficient permissions on {path}"))
        }

        LiftoffError::UnsafePath { path } => {
            ErrorContext::new(LiftoffError::UnsafePath {
                path: path.clone(),
            })
            .with_suggestion("Report this to the update server operator")
            .with_details(
                "The server listed a file outside the install directory; the update was aborted before writing anything there",
            )
        }

        LiftoffError::LaunchFailed { executable, reason } => {
            ErrorContext::new(LiftoffError::LaunchFailed {
                executable: executable.clone(),
                reason: reason.clone(),
            })
            .with_suggestion("Run 'liftoff update' to download the application, then try again")
            .with_details(reason.clone())
        }

        LiftoffError::FileSystemError { operation, path } => {
            ErrorContext::new(LiftoffError::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            })
            .with_suggestion("Check that the install directory exists and is writable")
        }

        LiftoffError::Io(e) => ErrorContext::new(LiftoffError::Other {
            message: format!("IO error: {e}"),
        }),
        LiftoffError::Toml(e) => ErrorContext::new(LiftoffError::Other {
            message: format!("TOML parsing error: {e}"),
        }),
        LiftoffError::Json(e) => ErrorContext::new(LiftoffError::Other {
            message: format!("JSON error: {e}"),
        }),
        LiftoffError::Other { message } => ErrorContext::new(LiftoffError::Other {
            message: message.clone(),
        }),
    }
}
