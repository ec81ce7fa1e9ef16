//! HTTP retrieval of sitemap documents.

use crate::config::FetchConfig;
use crate::decompress::ByteStream;
use crate::document::RawDocument;
use crate::reference::SitemapReference;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tracing::{debug, instrument};

/// Request headers supplied by the caller for every fetch of one run.
pub type RequestHeaders = HashMap<String, String>;

/// Where the resolver gets document bytes from.
///
/// [`Fetcher`] is the HTTP implementation; tests and embedders can supply
/// their own.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the whole body of `reference`.
    async fn fetch(
        &self,
        reference: &SitemapReference,
        headers: &RequestHeaders,
    ) -> Result<RawDocument>;

    /// Open `reference` as an incremental byte stream.
    ///
    /// Errors that happen after the response starts arrive through the
    /// stream as I/O errors.
    async fn fetch_stream(
        &self,
        reference: &SitemapReference,
        headers: &RequestHeaders,
    ) -> Result<ByteStream>;
}

/// HTTP client for sitemap documents.
///
/// One request per call, no retries. Non-success statuses become
/// [`Error::HttpStatus`]; transport failures and timeouts become
/// [`Error::Fetch`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&FetchConfig::default())
    }

    /// Creates a fetcher with a custom request timeout (primarily for tests).
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let config = FetchConfig::default();
        Self::build(&config, timeout)
    }

    /// Creates a fetcher from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a configured header is not a valid HTTP
    /// header or the client cannot be built.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        Self::build(config, config.timeout())
    }

    fn build(config: &FetchConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .default_headers(header_map(config.headers.iter())?)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        reference: &SitemapReference,
        headers: &RequestHeaders,
    ) -> Result<Response> {
        let url = reference.as_str();
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|source| Error::Fetch {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Sitemap request failed");
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentSource for Fetcher {
    #[instrument(level = "debug", skip_all, fields(url = %reference))]
    async fn fetch(
        &self,
        reference: &SitemapReference,
        headers: &RequestHeaders,
    ) -> Result<RawDocument> {
        let response = self.send(reference, headers).await?;
        let body = response.bytes().await.map_err(|source| Error::Fetch {
            url: reference.to_string(),
            source,
        })?;

        debug!(bytes = body.len(), "Fetched sitemap document");
        Ok(RawDocument::new(reference.clone(), body))
    }

    #[instrument(level = "debug", skip_all, fields(url = %reference))]
    async fn fetch_stream(
        &self,
        reference: &SitemapReference,
        headers: &RequestHeaders,
    ) -> Result<ByteStream> {
        let response = self.send(reference, headers).await?;
        debug!(
            content_length = response.content_length(),
            "Streaming sitemap document"
        );
        Ok(Box::pin(response.bytes_stream().map_err(io::Error::other)))
    }
}

pub(crate) fn header_map<'a>(headers: impl Iterator<Item = (&'a String, &'a String)>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("invalid value for header '{name}': {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
