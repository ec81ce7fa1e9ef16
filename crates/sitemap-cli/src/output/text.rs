//! Plain text output

use sitemap_core::Resolution;
use std::io::{self, Write};

/// Write one page URL per line.
pub fn write_urls(resolution: &Resolution, out: &mut impl Write) -> io::Result<()> {
    for url in resolution.urls() {
        writeln!(out, "{url}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sitemap_core::UrlEntry;

    #[test]
    fn test_one_url_per_line() {
        let resolution = Resolution {
            entries: vec![UrlEntry::new("https://a.test/1"), UrlEntry::new("https://a.test/2")],
            ..Resolution::default()
        };
        let mut out = Vec::new();
        write_urls(&resolution, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://a.test/1\nhttps://a.test/2\n"
        );
    }

    #[test]
    fn test_empty_resolution_writes_nothing() {
        let mut out = Vec::new();
        write_urls(&Resolution::default(), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
