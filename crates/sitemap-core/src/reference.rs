//! Sitemap references: the locators handed to the resolver.

use crate::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// Suffix marking a gzip-compressed sitemap document.
const COMPRESSED_SUFFIX: &str = ".gz";

/// An absolute URI identifying a sitemap document.
///
/// The string is kept exactly as supplied and is what gets requested over the
/// network. Equality and hashing use the [normalized](Self::normalized) form,
/// which drops one trailing `/`, so `https://x.test/sitemap.xml/` and
/// `https://x.test/sitemap.xml` are the same reference.
#[derive(Debug, Clone, Eq)]
pub struct SitemapReference {
    raw: String,
}

impl SitemapReference {
    /// Wrap a locator without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Wrap a locator after checking that it is an absolute http(s) URL.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{raw}: unsupported scheme '{}'",
                url.scheme()
            )));
        }
        Ok(Self {
            raw: raw.trim().to_string(),
        })
    }

    /// Build the reference for a `<loc>` found inside a sitemap index.
    ///
    /// Index children are stored trimmed of one trailing `/`, so the string
    /// that gets fetched is the normalized form.
    pub fn from_index_loc(loc: &str) -> Self {
        Self::new(trim_one_separator(loc.trim()))
    }

    /// The locator as it will be requested.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The locator with exactly one trailing `/` removed, if present.
    pub fn normalized(&self) -> &str {
        trim_one_separator(&self.raw)
    }

    /// Whether the final path segment carries the compressed suffix.
    ///
    /// The check is case-insensitive. Query strings and fragments are ignored
    /// when the reference parses as a URL; otherwise the whole string is
    /// tested.
    pub fn is_compressed(&self) -> bool {
        let normalized = self.normalized();
        let path = Url::parse(normalized)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| normalized.to_string());
        has_compressed_suffix(&path)
    }
}

fn trim_one_separator(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

fn has_compressed_suffix(path: &str) -> bool {
    let path = trim_one_separator(path);
    path.len() >= COMPRESSED_SUFFIX.len()
        && path
            .get(path.len() - COMPRESSED_SUFFIX.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(COMPRESSED_SUFFIX))
}

impl PartialEq for SitemapReference {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Hash for SitemapReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for SitemapReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for SitemapReference {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for SitemapReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SitemapReference {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_trailing_separator_is_same_reference() {
        let with = SitemapReference::new("https://x.test/sitemap_index.xml/");
        let without = SitemapReference::new("https://x.test/sitemap_index.xml");

        assert_eq!(with, without);
        assert_eq!(with.normalized(), "https://x.test/sitemap_index.xml");

        let set: HashSet<_> = [with, without].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_only_one_separator_is_trimmed() {
        let reference = SitemapReference::new("https://x.test/dir//");
        assert_eq!(reference.normalized(), "https://x.test/dir/");
        assert_ne!(reference, SitemapReference::new("https://x.test/dir"));
    }

    #[test]
    fn test_index_loc_is_stored_normalized() {
        let reference = SitemapReference::from_index_loc("  https://x.test/child.xml/ ");
        assert_eq!(reference.as_str(), "https://x.test/child.xml");
    }

    #[test]
    fn test_compressed_suffix_is_case_insensitive() {
        for raw in [
            "https://x.test/sitemap-1.xml.gz",
            "https://x.test/sitemap-1.xml.GZ",
            "https://x.test/sitemap-1.xml.Gz",
            "https://x.test/sitemap-1.xml.gz/",
            "https://x.test/sitemap-1.xml.gz?v=2",
        ] {
            assert!(SitemapReference::new(raw).is_compressed(), "{raw}");
        }

        for raw in [
            "https://x.test/sitemap.xml",
            "https://x.test/gz",
            "https://x.test/sitemap.xml?format=gz",
            "https://x.test/sitemap.gzip",
        ] {
            assert!(!SitemapReference::new(raw).is_compressed(), "{raw}");
        }
    }

    #[test]
    fn test_parse_rejects_non_http() {
        assert!(SitemapReference::parse("https://x.test/sitemap.xml").is_ok());
        assert!(matches!(
            SitemapReference::parse("ftp://x.test/sitemap.xml"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            SitemapReference::parse("sitemap.xml"),
            Err(Error::InvalidUrl(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_trailing_separator_normalizes(path in "[a-z0-9_-]{1,12}(\\.xml)?") {
            let bare = SitemapReference::new(format!("https://x.test/{path}"));
            let slashed = SitemapReference::new(format!("https://x.test/{path}/"));
            prop_assert_eq!(&bare, &slashed);
            prop_assert_eq!(bare.is_compressed(), slashed.is_compressed());
        }

        #[test]
        fn prop_gz_case_does_not_matter(stem in "[a-z0-9_-]{1,12}", upper in any::<bool>()) {
            let suffix = if upper { "GZ" } else { "gz" };
            let reference = SitemapReference::new(format!("https://x.test/{stem}.xml.{suffix}"));
            prop_assert!(reference.is_compressed());
        }
    }
}
