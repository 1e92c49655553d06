//! Error types for Sitegraft operations.
//!
//! This module defines the main error type [`SitegraftError`] which represents
//! every fatal failure of a run (fetching, reading HTML, publishing), and
//! [`ConfigReloadWarning`], the non-fatal outcome of asking the external web
//! server to validate and reload its configuration.
//!
//! # Example
//!
//! ```rust
//! use sitegraft_core::{Result, SitegraftError};
//!
//! fn require_keyword(keyword: &str) -> Result<&str> {
//!     if keyword.trim().is_empty() {
//!         return Err(SitegraftError::InvalidKeyword);
//!     }
//!     Ok(keyword)
//! }
//! # assert!(require_keyword("rust").is_ok());
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Main error type for a Sitegraft run.
///
/// Every variant is fatal: it unwinds to the caller and nothing further is
/// published. Server reload problems are reported separately through
/// [`ConfigReloadWarning`].
#[derive(Error, Debug)]
pub enum SitegraftError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when the seed URL cannot be parsed or is not http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The keyword is empty or whitespace only.
    #[error("Keyword must not be empty")]
    InvalidKeyword,

    /// The crawl could not retrieve the seed page.
    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    /// Invalid CSS selector or an unusable parse tree.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// An HTML file could not be read or decoded as UTF-8 text.
    ///
    /// Malformed markup never produces this error; the HTML parser is
    /// tolerant and always yields a tree.
    #[error("Cannot read {} as text: {reason}", .path.display())]
    ParseError { path: PathBuf, reason: String },

    /// A filesystem move failed while swapping the document root.
    ///
    /// The document root is left in whatever state the failed step produced.
    #[error("Publish failed while {step} ({} -> {}): {source}", .from.display(), .to.display())]
    PublishError {
        step: PublishStep,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Recursive HTML file discovery failed.
    #[error("Failed to walk directory: {0}")]
    WalkError(String),

    /// File I/O errors outside the publish swap.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// The step of the publish sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    /// Creating the document root's parent directory.
    PrepareParent,
    /// Removing a backup left behind by an earlier run.
    ClearStaleBackup,
    /// Moving the live document root into the backup slot.
    Backup,
    /// Moving the working tree into the document root.
    Swap,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            PublishStep::PrepareParent => "preparing the document root parent",
            PublishStep::ClearStaleBackup => "clearing a stale backup",
            PublishStep::Backup => "backing up the document root",
            PublishStep::Swap => "moving the working tree into place",
        };
        f.write_str(step)
    }
}

/// Non-fatal failure of the external server's validate/reload commands.
///
/// Content is already published when this is produced, so callers log it
/// and still report success.
#[derive(Error, Debug)]
pub enum ConfigReloadWarning {
    /// The server binary could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but reported failure.
    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Result type alias for SitegraftError.
///
/// This is a convenience alias for `std::result::Result<T, SitegraftError>`.
pub type Result<T> = std::result::Result<T, SitegraftError>;
