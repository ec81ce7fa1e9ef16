//! Sitemap XML parsing and classification.
//!
//! Turns the bytes of one sitemap document into a [`ParsedSitemap`]. The root
//! element decides the shape:
//!
//! - **URL set**: `<urlset>` with `<url>` entries, each contributing its `<loc>`
//! - **Sitemap index**: `<sitemapindex>` with `<sitemap>` entries pointing to
//!   further sitemap documents
//!
//! Anything else is a parse error. No schema validation is performed and
//! namespace prefixes are ignored, so `<sm:urlset>` classifies like `<urlset>`.
//! Only direct children of an entry are read, which keeps extension elements
//! such as `<image:image><image:loc>` from overriding the page location.
//!
//! ```
//! use sitemap_core::{ParsedSitemap, parser::parse_document};
//!
//! let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <sitemap><loc>https://example.com/sitemap-posts.xml.gz</loc></sitemap>
//! </sitemapindex>"#;
//!
//! match parse_document(xml)? {
//!     ParsedSitemap::Index(children) => assert!(children[0].is_compressed()),
//!     ParsedSitemap::UrlSet(_) => unreachable!(),
//! }
//! # Ok::<(), sitemap_core::Error>(())
//! ```

use crate::document::{ChangeFrequency, ParsedSitemap, UrlEntry};
use crate::reference::SitemapReference;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parse and classify one sitemap document.
///
/// # Errors
///
/// Returns [`Error::Parse`] if:
/// - The XML is malformed or truncated
/// - The root element is neither `urlset` nor `sitemapindex`
/// - The document has no root element, or more than one
/// - The document mixes `<url>` and `<sitemap>` entries
///
/// Entries without a non-empty `<loc>` are skipped with a warning rather than
/// failing the document.
#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn parse_document(bytes: &[u8]) -> Result<ParsedSitemap> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut builder = DocumentBuilder::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => builder.start(e.local_name().as_ref())?,
            Ok(Event::Empty(e)) => {
                builder.start(e.local_name().as_ref())?;
                builder.end()?;
            },
            Ok(Event::End(_)) => builder.end()?,
            Ok(Event::Text(e)) if builder.capturing() => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Parse(format!("XML parse error: {e}")))?;
                builder.push_text(&text);
            },
            Ok(Event::CData(e)) if builder.capturing() => {
                builder.push_text(&String::from_utf8_lossy(&e));
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Parse(format!(
                    "XML parse error at byte {}: {e}",
                    reader.buffer_position()
                )));
            },
            _ => {},
        }
        buf.clear();
    }

    builder.finish()
}

/// Parse a URL set into its entries.
///
/// # Errors
///
/// Returns an error if the document is malformed or is a sitemap index
/// (use [`parse_document`] to handle both shapes).
///
/// # Examples
///
/// ```
/// use sitemap_core::parser::parse_sitemap;
///
/// let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
/// <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url>
///     <loc>https://example.com/page1</loc>
///     <lastmod>2024-01-15</lastmod>
///   </url>
/// </urlset>"#;
///
/// let entries = parse_sitemap(xml).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].loc, "https://example.com/page1");
/// ```
pub fn parse_sitemap(xml: &str) -> Result<Vec<UrlEntry>> {
    match parse_document(xml.as_bytes())? {
        ParsedSitemap::UrlSet(entries) => Ok(entries),
        ParsedSitemap::Index(_) => Err(Error::Parse(
            "XML is a sitemap index, not a URL set".to_string(),
        )),
    }
}

/// Check whether the document's root element is `<sitemapindex>`.
#[must_use]
pub fn is_sitemap_index(xml: &str) -> bool {
    root_element_name(xml.as_bytes()).as_deref() == Some("sitemapindex")
}

/// Local name of the first element in the document, if any.
fn root_element_name(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            },
            Ok(Event::Eof) | Err(_) => return None,
            _ => {},
        }
        buf.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    UrlSet,
    Index,
}

impl Root {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"urlset" => Some(Self::UrlSet),
            b"sitemapindex" => Some(Self::Index),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::UrlSet => "urlset",
            Self::Index => "sitemapindex",
        }
    }

    const fn entry_name(self) -> &'static str {
        match self {
            Self::UrlSet => "url",
            Self::Index => "sitemap",
        }
    }

    const fn foreign_entry_name(self) -> &'static str {
        match self {
            Self::UrlSet => "sitemap",
            Self::Index => "url",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

impl Field {
    fn from_name(root: Root, name: &[u8]) -> Option<Self> {
        match (root, name) {
            (_, b"loc") => Some(Self::Loc),
            (_, b"lastmod") => Some(Self::Lastmod),
            (Root::UrlSet, b"changefreq") => Some(Self::Changefreq),
            (Root::UrlSet, b"priority") => Some(Self::Priority),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PendingEntry {
    loc: Option<String>,
    lastmod: Option<DateTime<Utc>>,
    changefreq: Option<ChangeFrequency>,
    priority: Option<f32>,
}

/// Event-driven accumulator for one document.
///
/// Depth 1 is the root, depth 2 an entry, depth 3 an entry field.
#[derive(Debug, Default)]
struct DocumentBuilder {
    root: Option<Root>,
    depth: usize,
    entry: Option<PendingEntry>,
    field: Option<Field>,
    text: String,
    entries: Vec<UrlEntry>,
    children: Vec<SitemapReference>,
    seen: usize,
    skipped: usize,
}

impl DocumentBuilder {
    fn start(&mut self, name: &[u8]) -> Result<()> {
        match (self.depth, self.root) {
            (0, Some(_)) => {
                return Err(Error::Parse(
                    "document has more than one root element".to_string(),
                ));
            },
            (0, None) => {
                let root = Root::from_name(name).ok_or_else(|| {
                    Error::Parse(format!(
                        "unrecognized root element <{}>, expected <urlset> or <sitemapindex>",
                        String::from_utf8_lossy(name)
                    ))
                })?;
                self.root = Some(root);
            },
            (1, Some(root)) => {
                if name == root.entry_name().as_bytes() {
                    self.entry = Some(PendingEntry::default());
                } else if name == root.foreign_entry_name().as_bytes() {
                    return Err(Error::Parse(format!(
                        "<{}> contains <{}> entries; a sitemap is either a urlset or a sitemapindex",
                        root.name(),
                        root.foreign_entry_name()
                    )));
                }
            },
            (2, Some(root)) if self.entry.is_some() => {
                self.field = Field::from_name(root, name);
                self.text.clear();
            },
            _ => {},
        }
        self.depth += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        match self.depth {
            0 => {
                return Err(Error::Parse(
                    "closing tag without matching opening tag".to_string(),
                ));
            },
            3 => {
                if let Some(field) = self.field.take() {
                    self.apply_field(field);
                }
            },
            2 => {
                if let Some(entry) = self.entry.take() {
                    self.finish_entry(entry);
                }
            },
            _ => {},
        }
        self.depth -= 1;
        Ok(())
    }

    const fn capturing(&self) -> bool {
        self.depth == 3 && self.field.is_some()
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn apply_field(&mut self, field: Field) {
        let text = std::mem::take(&mut self.text);
        let value = text.trim();
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match field {
            Field::Loc if !value.is_empty() => entry.loc = Some(value.to_string()),
            Field::Loc => {},
            Field::Lastmod => entry.lastmod = parse_lastmod(value),
            Field::Changefreq => entry.changefreq = value.parse().ok(),
            Field::Priority => entry.priority = parse_priority(value),
        }
    }

    fn finish_entry(&mut self, entry: PendingEntry) {
        self.seen += 1;
        let Some(root) = self.root else {
            return;
        };

        let Some(loc) = entry.loc else {
            self.skipped += 1;
            warn!(
                position = self.seen,
                element = root.entry_name(),
                "Skipping sitemap entry without <loc>"
            );
            return;
        };

        match root {
            Root::UrlSet => self.entries.push(UrlEntry {
                loc,
                lastmod: entry.lastmod,
                changefreq: entry.changefreq,
                priority: entry.priority,
            }),
            Root::Index => self.children.push(SitemapReference::from_index_loc(&loc)),
        }
    }

    fn finish(self) -> Result<ParsedSitemap> {
        if self.depth > 0 {
            return Err(Error::Parse(
                "unexpected end of document: unclosed elements remain".to_string(),
            ));
        }

        let parsed = match self.root {
            Some(Root::UrlSet) => ParsedSitemap::UrlSet(self.entries),
            Some(Root::Index) => ParsedSitemap::Index(self.children),
            None => return Err(Error::Parse("document has no root element".to_string())),
        };

        debug!(
            kind = parsed.kind(),
            entries = parsed.len(),
            skipped = self.skipped,
            "Parsed sitemap document"
        );
        Ok(parsed)
    }
}

/// Parse a lastmod date string into a `DateTime<Utc>`.
///
/// Supports multiple date formats:
/// - `2024-01-15` (date only)
/// - `2024-01-15T10:30:00Z` (ISO 8601 with Z)
/// - `2024-01-15T10:30:00+00:00` (ISO 8601 with offset)
/// - `2024-01-15T10:30:00.000Z` (with milliseconds)
fn parse_lastmod(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    // W3C datetime allows minutes without seconds
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    debug!(date_str = %s, "Could not parse lastmod date");
    None
}

/// Parse a priority value, clamping to 0.0-1.0 range.
fn parse_priority(s: &str) -> Option<f32> {
    s.parse::<f32>()
        .ok()
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 1.0))
}
