//! Error types and handling for sitemap resolution.
//!
//! Every failure in the pipeline maps onto one [`Error`] variant. Failures tied
//! to a single sitemap document carry the reference that produced them, and the
//! resolver wraps them in [`Error::Resolution`] before surfacing them.
//!
//! ## Error Categories
//!
//! - **Fetch errors**: transport failures, timeouts and non-success statuses
//! - **Decompression errors**: malformed or truncated gzip streams
//! - **Parse errors**: malformed XML or an unrecognized root element
//! - **Resolution errors**: any of the above, tagged with the failing reference
//! - **Configuration errors**: invalid limits, depths or config files
//!
//! ```rust
//! use sitemap_core::Error;
//!
//! fn report(err: &Error) {
//!     match err.reference() {
//!         Some(reference) => eprintln!("{reference}: {err} ({})", err.category()),
//!         None => eprintln!("{err} ({})", err.category()),
//!     }
//! }
//!
//! report(&Error::Parse("unexpected root element <html>".to_string()));
//! ```

use thiserror::Error;

/// The main error type for sitemap resolution.
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP request for a sitemap document failed before a response arrived.
    ///
    /// Covers connection failures, TLS errors, timeouts and body read failures.
    #[error("Fetch failed for '{url}': {source}")]
    Fetch {
        /// Reference that was being fetched.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Fetch failed for '{url}': HTTP {status}")]
    HttpStatus {
        /// Reference that was being fetched.
        url: String,
        /// Status code returned by the server.
        status: u16,
    },

    /// A compressed sitemap could not be decoded.
    ///
    /// Raised for malformed gzip data, truncated streams, stream read failures
    /// and documents that exceed the configured size limit once decompressed.
    #[error("Decompression failed for '{url}': {source}")]
    Decompression {
        /// Reference whose body failed to decompress.
        url: String,
        /// Underlying I/O error from the decoder.
        #[source]
        source: std::io::Error,
    },

    /// The document is not a well-formed sitemap.
    ///
    /// Occurs for malformed XML, a root element other than `urlset` or
    /// `sitemapindex`, documents mixing both shapes, and empty documents.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resolving one reference failed.
    ///
    /// Wraps the underlying fetch, decompression or parse failure together
    /// with the reference that was being resolved.
    #[error("Failed to resolve sitemap '{reference}': {source}")]
    Resolution {
        /// Reference whose resolution failed.
        reference: String,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// A sitemap reference is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An admission gate was closed while tasks were still waiting on it.
    #[error("Resource limited: {0}")]
    ResourceLimited(String),

    /// A spawned resolution task stopped without producing a result.
    #[error("Task failed: {0}")]
    Task(String),

    /// I/O operation failed while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Wrap `source` with the reference whose resolution it broke.
    ///
    /// Already-wrapped errors are returned unchanged so the innermost
    /// reference is the one reported.
    #[must_use]
    pub fn resolution(reference: impl Into<String>, source: Self) -> Self {
        match source {
            Self::Resolution { .. } => source,
            other => Self::Resolution {
                reference: reference.into(),
                source: Box::new(other),
            },
        }
    }

    /// The sitemap reference this error is attributed to, if any.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Resolution { reference, .. } => Some(reference),
            Self::Fetch { url, .. } | Self::HttpStatus { url, .. } | Self::Decompression { url, .. } => {
                Some(url)
            },
            _ => None,
        }
    }

    /// The innermost cause, looking through [`Error::Resolution`] wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Resolution { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for timeouts, connection failures and 5xx/429 statuses.
    /// The resolver itself never retries; this is a hint for callers.
    ///
    /// ```rust
    /// use sitemap_core::Error;
    ///
    /// let busy = Error::HttpStatus { url: "https://x.test/sitemap.xml".into(), status: 503 };
    /// let gone = Error::HttpStatus { url: "https://x.test/sitemap.xml".into(), status: 404 };
    /// assert!(busy.is_recoverable());
    /// assert!(!gone.is_recoverable());
    /// assert!(!Error::Parse("bad root".into()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_timeout() || source.is_connect(),
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Resolution { source, .. } => source.is_recoverable(),
            Self::Io(e) | Self::Decompression { source: e, .. } => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// [`Error::Resolution`] reports the category of its underlying cause so
    /// callers can tell a network failure from a parse failure without
    /// unwrapping.
    ///
    /// - `"fetch"` - transport failures and HTTP statuses
    /// - `"decompression"` - gzip decoding
    /// - `"parse"` - XML and classification
    /// - `"invalid_url"` - malformed references
    /// - `"config"` - configuration
    /// - `"resource_limited"` - admission gate failures
    /// - `"task"` - panicked or cancelled resolution tasks
    /// - `"io"` / `"serialization"` - config file handling
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Fetch { .. } | Self::HttpStatus { .. } => "fetch",
            Self::Decompression { .. } => "decompression",
            Self::Parse(_) => "parse",
            Self::Resolution { source, .. } => source.category(),
            Self::InvalidUrl(_) => "invalid_url",
            Self::Config(_) => "config",
            Self::ResourceLimited(_) => "resource_limited",
            Self::Task(_) => "task",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, sitemap_core::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
