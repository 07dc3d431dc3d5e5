//! Centralized error handling for Partree.
//!
//! The engines themselves never fail: a unit of work that does not pass
//! validation only leaves an absent slot (or an empty branch) in the result.
//! [`PartreeError`] covers the ambient surface around them: building thread
//! pools, loading configuration, parsing paths and reading or writing tree
//! snapshots.
//!
//! ## Error Categories
//!
//! - **I/O Errors** ([`PartreeError::Io`]): snapshot and config file access
//! - **Serialization Errors** ([`PartreeError::Serialization`]): bincode encoding/decoding
//! - **Format Errors** ([`PartreeError::Format`]): snapshot header mismatch or corruption
//! - **Config Errors** ([`PartreeError::Config`]): malformed TOML or invalid values
//! - **Path Errors** ([`PartreeError::Path`]): malformed `{a;b;c}` path text
//! - **Internal Errors** ([`PartreeError::Internal`]): thread pool setup, broken invariants
//!
//! ## Error Propagation with `?`
//!
//! ```rust
//! use partree::TreePath;
//!
//! fn parse_two() -> partree::Result<(TreePath, TreePath)> {
//!     Ok(("{0;1}".parse()?, "{2}".parse()?))
//! }
//! # parse_two()?;
//! # Ok::<(), partree::PartreeError>(())
//! ```

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// A specialized `Result` type for Partree operations.
pub type Result<T> = std::result::Result<T, PartreeError>;

/// The master error enum covering all failure domains in Partree.
///
/// This type is `Clone`; I/O errors are wrapped in `Arc` so that an error
/// captured on a worker thread can be handed back to the caller cheaply.
#[derive(Debug, Clone, Error)]
pub enum PartreeError {
    /// Low-level I/O failure while reading or writing snapshots or config files.
    #[error("I/O Error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// Bincode encoding or decoding failure.
    #[error("Serialization Error: {0}")]
    Serialization(String),

    /// A snapshot does not carry the expected magic bytes or version.
    #[error("Format Error: {0}")]
    Format(String),

    /// Configuration could not be parsed or holds an invalid value.
    #[error("Config Error: {0}")]
    Config(String),

    /// Path text is not of the form `{a;b;c}`.
    #[error("Path Error: {0}")]
    Path(String),

    /// Logic error or resource setup failure (thread pool construction).
    #[error("Internal Logic Error: {0}")]
    Internal(String),
}

impl From<io::Error> for PartreeError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<toml::de::Error> for PartreeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for PartreeError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::Internal(format!("thread pool: {err}"))
    }
}
