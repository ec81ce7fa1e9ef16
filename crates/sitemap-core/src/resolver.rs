//! Phased resolution of sitemap references into page URLs.
//!
//! A call walks the sitemap tree one level at a time. Level one fetches and
//! parses every given reference. Each further level takes the children of the
//! indices found on the level before, fetches the plain ones, then streams and
//! decompresses the compressed ones under the decompression limiter. Every
//! phase finishes before the next one starts, and each phase's results are
//! merged in the order its tasks were submitted.

use crate::config::{ErrorPolicy, ResolverConfig};
use crate::decompress::{ByteStream, Decompress, GzipDecompressor, byte_stream_from, is_gzip};
use crate::document::{ParsedSitemap, UrlEntry};
use crate::fetcher::{DocumentSource, Fetcher, RequestHeaders, header_map};
use crate::limiter::Limiter;
use crate::parser::parse_document;
use crate::reference::SitemapReference;
use crate::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Outcome of one [`Resolver::resolve`] call.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Page entries in phase order: parents, then plain children, then
    /// compressed children, level by level.
    pub entries: Vec<UrlEntry>,
    /// References that failed under [`ErrorPolicy::BestEffort`], each wrapped
    /// in [`Error::Resolution`]. Always empty under fail-fast.
    pub failures: Vec<Error>,
    /// Children of indices found on the last resolved level.
    pub unexpanded: Vec<SitemapReference>,
    /// Number of documents fetched and parsed successfully.
    pub documents: usize,
}

impl Resolution {
    /// Page locations in result order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.loc.as_str())
    }

    /// Consume the resolution, keeping only the page locations.
    pub fn into_urls(self) -> Vec<String> {
        self.entries.into_iter().map(|entry| entry.loc).collect()
    }

    /// True when nothing failed and nothing was left unexpanded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.unexpanded.is_empty()
    }
}

/// Resolves sitemap references into the page URLs they list.
///
/// ```rust,no_run
/// use sitemap_core::{RequestHeaders, Resolver, ResolverConfig};
///
/// # async fn run() -> sitemap_core::Result<()> {
/// let resolver = Resolver::new(ResolverConfig::with_concurrency(4))?;
/// let resolution = resolver
///     .resolve(["https://example.com/sitemap.xml"], &RequestHeaders::new())
///     .await?;
/// for url in resolution.urls() {
///     println!("{url}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Resolver<S = Fetcher, D = GzipDecompressor> {
    config: ResolverConfig,
    source: Arc<S>,
    decompressor: Arc<D>,
}

impl Resolver {
    /// Resolver using HTTP and gzip, built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` is invalid or the HTTP client
    /// cannot be built from it.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        let source = Fetcher::from_config(&config.fetch)?;
        let decompressor = GzipDecompressor::new(config.fetch.max_document_bytes);
        Self::with_parts(config, source, decompressor)
    }
}

impl<S, D> Resolver<S, D>
where
    S: DocumentSource + 'static,
    D: Decompress + 'static,
{
    /// Resolver with caller-supplied document source and decompressor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` is invalid.
    pub fn with_parts(config: ResolverConfig, source: S, decompressor: D) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source: Arc::new(source),
            decompressor: Arc::new(decompressor),
        })
    }

    /// Settings this resolver runs with.
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `references` into page entries.
    ///
    /// `headers` are sent with every request of this call. Limiters are
    /// created per call, so concurrent calls on one resolver do not share
    /// slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] before any request is made if a header name
    /// or value is not valid HTTP.
    ///
    /// Under [`ErrorPolicy::FailFast`], returns the first failure of the first
    /// failing phase (in submission order) as [`Error::Resolution`]. Under
    /// [`ErrorPolicy::BestEffort`] failures are reported in
    /// [`Resolution::failures`] instead.
    #[instrument(skip_all, fields(concurrency = self.config.concurrency, max_depth = self.config.max_depth))]
    pub async fn resolve<I, R>(&self, references: I, headers: &RequestHeaders) -> Result<Resolution>
    where
        I: IntoIterator<Item = R>,
        R: Into<SitemapReference>,
    {
        header_map(headers.iter())?;
        let run = Arc::new(Run {
            source: Arc::clone(&self.source),
            decompressor: Arc::clone(&self.decompressor),
            headers: headers.clone(),
            fetch_gate: Limiter::new(self.config.fetch_concurrency)?,
            decompress_gate: Limiter::new(self.config.concurrency)?,
        });

        let mut resolution = Resolution::default();
        let mut earlier_levels = HashSet::new();

        let parents: Vec<SitemapReference> = references.into_iter().map(Into::into).collect();
        info!(count = parents.len(), "Resolving parent sitemaps");
        earlier_levels.extend(parents.iter().cloned());
        let outcomes = run.plain_phase(parents).await;
        let mut pending = self.merge(outcomes, &mut resolution)?;

        for level in 2..=self.config.max_depth {
            let children = not_in_earlier_levels(pending, &earlier_levels);
            if children.is_empty() {
                pending = Vec::new();
                break;
            }
            earlier_levels.extend(children.iter().cloned());

            let (compressed, plain): (Vec<_>, Vec<_>) = children
                .into_iter()
                .partition(SitemapReference::is_compressed);
            info!(
                level,
                plain = plain.len(),
                compressed = compressed.len(),
                "Resolving child sitemaps"
            );

            let outcomes = run.plain_phase(plain).await;
            let mut next = self.merge(outcomes, &mut resolution)?;
            let outcomes = run.compressed_phase(compressed).await;
            next.extend(self.merge(outcomes, &mut resolution)?);
            pending = next;
        }

        let unexpanded = not_in_earlier_levels(pending, &earlier_levels);
        if !unexpanded.is_empty() {
            debug!(
                count = unexpanded.len(),
                "Depth limit reached, leaving nested sitemaps unexpanded"
            );
            resolution.unexpanded = unexpanded;
        }

        info!(
            urls = resolution.entries.len(),
            documents = resolution.documents,
            failures = resolution.failures.len(),
            "Resolved sitemaps"
        );
        Ok(resolution)
    }

    /// Fold one phase's outcomes into `resolution`, returning the child
    /// references of any indices in submission order.
    fn merge(
        &self,
        outcomes: Vec<Outcome>,
        resolution: &mut Resolution,
    ) -> Result<Vec<SitemapReference>> {
        let mut children = Vec::new();
        for (reference, result) in outcomes {
            match result {
                Ok(ParsedSitemap::UrlSet(entries)) => {
                    resolution.documents += 1;
                    resolution.entries.extend(entries);
                },
                Ok(ParsedSitemap::Index(found)) => {
                    resolution.documents += 1;
                    children.extend(found);
                },
                Err(err) => {
                    let err = Error::resolution(reference.as_str(), err);
                    match self.config.error_policy {
                        ErrorPolicy::FailFast => return Err(err),
                        ErrorPolicy::BestEffort => {
                            warn!(error = %err, "Skipping sitemap that failed to resolve");
                            resolution.failures.push(err);
                        },
                    }
                },
            }
        }
        Ok(children)
    }
}

type Outcome = (SitemapReference, Result<ParsedSitemap>);

/// State shared by the tasks of one resolve call.
struct Run<S, D> {
    source: Arc<S>,
    decompressor: Arc<D>,
    headers: RequestHeaders,
    fetch_gate: Limiter,
    decompress_gate: Limiter,
}

impl<S, D> Run<S, D>
where
    S: DocumentSource + 'static,
    D: Decompress + 'static,
{
    async fn plain_phase(self: &Arc<Self>, references: Vec<SitemapReference>) -> Vec<Outcome> {
        let tasks = references
            .into_iter()
            .map(|reference| {
                let run = Arc::clone(self);
                let target = reference.clone();
                let handle = tokio::spawn(async move { run.load_plain(&target).await });
                (reference, handle)
            })
            .collect();
        join_in_order(tasks).await
    }

    async fn compressed_phase(self: &Arc<Self>, references: Vec<SitemapReference>) -> Vec<Outcome> {
        let tasks = references
            .into_iter()
            .map(|reference| {
                let run = Arc::clone(self);
                let target = reference.clone();
                let handle = tokio::spawn(async move {
                    run.decompress_gate
                        .run(|| run.load_compressed(&target))
                        .await
                });
                (reference, handle)
            })
            .collect();
        join_in_order(tasks).await
    }

    async fn load_plain(&self, reference: &SitemapReference) -> Result<ParsedSitemap> {
        let document = self
            .fetch_gate
            .run(|| self.source.fetch(reference, &self.headers))
            .await?;

        if is_gzip(&document.body) {
            debug!(url = %reference, "Sitemap body is gzip data, decompressing");
            let body = byte_stream_from(document.body);
            let xml = self
                .decompress_gate
                .run(|| self.decompress(reference, body))
                .await?;
            return parse_document(&xml);
        }
        parse_document(&document.body)
    }

    /// Fetch, decode and parse one compressed child. Runs inside a
    /// decompression slot.
    async fn load_compressed(&self, reference: &SitemapReference) -> Result<ParsedSitemap> {
        let mut body = self.source.fetch_stream(reference, &self.headers).await?;

        let first = loop {
            match body
                .try_next()
                .await
                .map_err(|source| decompression_error(reference, source))?
            {
                Some(chunk) if chunk.is_empty() => {},
                Some(chunk) => break chunk,
                None => {
                    return Err(decompression_error(
                        reference,
                        std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "empty response body",
                        ),
                    ));
                },
            }
        };

        // Servers that send `Content-Encoding: gzip` get decoded by the
        // transport; the payload is then plain XML. Gzip always opens with
        // 0x1f, which never starts an XML document.
        if first.first() != Some(&GZIP_LEAD_BYTE) {
            debug!(url = %reference, "Compressed sitemap arrived decoded, parsing as plain XML");
            let mut xml = first.to_vec();
            while let Some(chunk) = body
                .try_next()
                .await
                .map_err(|source| decompression_error(reference, source))?
            {
                xml.extend_from_slice(&chunk);
            }
            return parse_document(&xml);
        }

        let rejoined: ByteStream = Box::pin(stream::once(async move { Ok(first) }).chain(body));
        let xml = self.decompress(reference, rejoined).await?;
        debug!(url = %reference, bytes = xml.len(), "Decompressed sitemap");
        parse_document(&xml)
    }

    async fn decompress(&self, reference: &SitemapReference, body: ByteStream) -> Result<Vec<u8>> {
        self.decompressor
            .decompress(body)
            .await
            .map_err(|source| decompression_error(reference, source))
    }
}

const GZIP_LEAD_BYTE: u8 = 0x1f;

fn decompression_error(reference: &SitemapReference, source: std::io::Error) -> Error {
    Error::Decompression {
        url: reference.to_string(),
        source,
    }
}

/// Await spawned tasks in submission order.
async fn join_in_order(
    tasks: Vec<(SitemapReference, JoinHandle<Result<ParsedSitemap>>)>,
) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(tasks.len());
    for (reference, handle) in tasks {
        let result = handle.await.unwrap_or_else(|e| {
            Err(Error::Task(format!("resolving '{reference}' did not complete: {e}")))
        });
        outcomes.push((reference, result));
    }
    outcomes
}

/// Drop references already resolved on an earlier level, which would only
/// lead back up the tree. Repeats within one level are kept, each
/// contributing its own entries.
fn not_in_earlier_levels(
    references: Vec<SitemapReference>,
    earlier_levels: &HashSet<SitemapReference>,
) -> Vec<SitemapReference> {
    references
        .into_iter()
        .filter(|reference| {
            let cyclic = earlier_levels.contains(reference);
            if cyclic {
                debug!(url = %reference, "Skipping sitemap already resolved on an earlier level");
            }
            !cyclic
        })
        .collect()
}

/// Resolve `references` with default settings and the given decompression
/// concurrency, returning page URLs in result order.
///
/// ```rust,no_run
/// # async fn run() -> sitemap_core::Result<()> {
/// let urls = sitemap_core::resolve(
///     &["https://example.com/sitemap.xml"],
///     2,
///     &sitemap_core::RequestHeaders::new(),
/// )
/// .await?;
/// println!("{} pages", urls.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`Error::Config`] for a zero `concurrency` or a header name or value
/// that is not valid HTTP, and [`Error::Resolution`] for the first reference
/// that fails.
pub async fn resolve<R: AsRef<str>>(
    references: &[R],
    concurrency: usize,
    headers: &RequestHeaders,
) -> Result<Vec<String>> {
    let resolver = Resolver::new(ResolverConfig::with_concurrency(concurrency))?;
    let resolution = resolver
        .resolve(
            references
                .iter()
                .map(|reference| SitemapReference::new(reference.as_ref())),
            headers,
        )
        .await?;
    Ok(resolution.into_urls())
}
