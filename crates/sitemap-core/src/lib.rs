//! # sitemap-core
//!
//! Core functionality for sitemap-urls: resolving XML sitemaps into the page
//! URLs they list.
//!
//! Given one or more sitemap references, the resolver fetches each document,
//! classifies it as a URL set or a sitemap index, follows index children, and
//! aggregates every page location. Gzip-compressed children are streamed and
//! decompressed under a configurable concurrency limit.
//!
//! ## Architecture
//!
//! - **Limiter**: semaphore-backed admission gate for concurrent tasks
//! - **Fetcher**: HTTP retrieval, buffered or streaming, behind [`DocumentSource`]
//! - **Decompression**: pull-based gzip decoding behind [`Decompress`]
//! - **Parser**: event-based XML classification and extraction
//! - **Resolver**: the phased pipeline tying the above together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitemap_core::RequestHeaders;
//!
//! # async fn run() -> sitemap_core::Result<()> {
//! let urls = sitemap_core::resolve(
//!     &["https://example.com/sitemap_index.xml"],
//!     4,
//!     &RequestHeaders::new(),
//! )
//! .await?;
//!
//! println!("Found {} pages", urls.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. Failures tied to one sitemap
//! name it:
//!
//! ```rust,no_run
//! use sitemap_core::{Error, RequestHeaders};
//!
//! # async fn run() {
//! match sitemap_core::resolve(&["https://example.com/sitemap.xml"], 1, &RequestHeaders::new()).await {
//!     Ok(urls) => println!("{} pages", urls.len()),
//!     Err(e @ Error::Resolution { .. }) if e.is_recoverable() => eprintln!("Try again: {e}"),
//!     Err(e) => eprintln!("Failed ({}): {e}", e.category()),
//! }
//! # }
//! ```

/// Resolver settings, file loading and environment overrides
pub mod config;
/// Streaming gzip decompression
pub mod decompress;
/// Fetched documents and parsed sitemap contents
pub mod document;
/// Error types and result aliases
pub mod error;
/// HTTP retrieval of sitemap documents
pub mod fetcher;
/// Concurrency limiting
pub mod limiter;
/// Sitemap XML parsing and classification
pub mod parser;
/// Sitemap locators
pub mod reference;
/// Phased resolution pipeline
pub mod resolver;

// Re-export commonly used types
pub use config::{ErrorPolicy, FetchConfig, ResolverConfig};
pub use decompress::{ByteStream, Decompress, GzipDecompressor};
pub use document::{ChangeFrequency, ParsedSitemap, RawDocument, UrlEntry};
pub use error::{Error, Result};
pub use fetcher::{DocumentSource, Fetcher, RequestHeaders};
pub use limiter::Limiter;
pub use parser::{is_sitemap_index, parse_document, parse_sitemap};
pub use reference::SitemapReference;
pub use resolver::{Resolution, Resolver, resolve};
