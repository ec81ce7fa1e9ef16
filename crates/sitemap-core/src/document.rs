//! Sitemap documents: raw bodies and their parsed forms.

use crate::reference::SitemapReference;
use crate::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The body of a fetched sitemap document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Reference the body was fetched from.
    pub reference: SitemapReference,
    /// Response body, exactly as received.
    pub body: Bytes,
    /// Whether the reference names a compressed document.
    pub compressed: bool,
}

impl RawDocument {
    /// Wrap a fetched body, deriving `compressed` from the reference suffix.
    pub fn new(reference: SitemapReference, body: impl Into<Bytes>) -> Self {
        let compressed = reference.is_compressed();
        Self {
            reference,
            body: body.into(),
            compressed,
        }
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A single page entry from a URL set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlEntry {
    /// The page location.
    pub loc: String,
    /// Last modification date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<DateTime<Utc>>,
    /// How frequently the page changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFrequency>,
    /// Priority relative to other pages of the site (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>,
}

impl UrlEntry {
    /// Entry with a location and no metadata.
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }
}

/// Change frequency hints from a sitemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// The page changes every time it is accessed.
    Always,
    /// The page changes hourly.
    Hourly,
    /// The page changes daily.
    Daily,
    /// The page changes weekly.
    Weekly,
    /// The page changes monthly.
    Monthly,
    /// The page changes yearly.
    Yearly,
    /// The page is archived and will not change.
    Never,
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(Error::Parse(format!("Invalid changefreq value: {s}"))),
        }
    }
}

/// A classified sitemap document.
///
/// Produced once per document by [`crate::parser::parse_document`]; the
/// variant decides whether the resolver collects locations or schedules
/// children.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSitemap {
    /// `<urlset>`: terminal page entries, in document order.
    UrlSet(Vec<UrlEntry>),
    /// `<sitemapindex>`: child sitemap references, in document order.
    Index(Vec<SitemapReference>),
}

impl ParsedSitemap {
    /// Short label for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UrlSet(_) => "urlset",
            Self::Index(_) => "sitemapindex",
        }
    }

    /// Number of entries or children.
    pub fn len(&self) -> usize {
        match self {
            Self::UrlSet(entries) => entries.len(),
            Self::Index(children) => children.len(),
        }
    }

    /// Whether the document lists nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
