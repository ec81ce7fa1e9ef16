//! # Input Parsing Utilities
//!
//! Value parsers for command-line arguments. They are forgiving of
//! surrounding whitespace but reject anything that would fail later as a
//! malformed request.

use sitemap_core::SitemapReference;

/// Parse a `NAME:VALUE` request header.
///
/// Whitespace around the name and value is trimmed, so the curl-style
/// `"Authorization: Bearer abc"` works. The value may itself contain `:`.
///
/// # Errors
///
/// Returns a message when the separator is missing or the name is empty or
/// contains whitespace.
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header '{raw}' must look like NAME:VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header '{raw}' has an empty name"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("header name '{name}' must not contain whitespace"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse a sitemap argument, requiring an absolute http(s) URL.
///
/// # Errors
///
/// Returns the validation message when the URL is malformed or uses another
/// scheme.
pub fn parse_reference(raw: &str) -> Result<SitemapReference, String> {
    SitemapReference::parse(raw.trim()).map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Authorization: Bearer abc").unwrap(),
            ("Authorization".to_string(), "Bearer abc".to_string())
        );
        assert_eq!(
            parse_header("X-Forwarded-Host:a.test:8080").unwrap(),
            ("X-Forwarded-Host".to_string(), "a.test:8080".to_string())
        );
        assert_eq!(
            parse_header("X-Empty:").unwrap(),
            ("X-Empty".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_header_rejects_malformed() {
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header(": value").is_err());
        assert!(parse_header("Bad Name: value").is_err());
    }

    #[test]
    fn test_parse_reference() {
        let reference = parse_reference(" https://a.test/sitemap.xml ").unwrap();
        assert_eq!(reference.as_str(), "https://a.test/sitemap.xml");

        let err = parse_reference("a.test/sitemap.xml").unwrap_err();
        assert!(err.contains("a.test/sitemap.xml"), "unexpected message: {err}");
        assert!(parse_reference("file:///etc/passwd").is_err());
    }
}
