//! JSON output formatting

use anyhow::Result;
use serde::Serialize;
use sitemap_core::{Error, Resolution};
use std::io::Write;

/// Report written by `--format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub urls: Vec<&'a str>,
    pub failures: Vec<FailureRecord>,
    pub unexpanded: Vec<&'a str>,
    pub documents: usize,
}

/// One failed sitemap.
#[derive(Debug, Serialize)]
pub struct FailureRecord {
    pub reference: Option<String>,
    pub category: &'static str,
    pub message: String,
}

impl From<&Error> for FailureRecord {
    fn from(err: &Error) -> Self {
        Self {
            reference: err.reference().map(ToString::to_string),
            category: err.category(),
            message: err.root_cause().to_string(),
        }
    }
}

impl<'a> From<&'a Resolution> for Report<'a> {
    fn from(resolution: &'a Resolution) -> Self {
        Self {
            urls: resolution.urls().collect(),
            failures: resolution.failures.iter().map(FailureRecord::from).collect(),
            unexpanded: resolution
                .unexpanded
                .iter()
                .map(|reference| reference.as_str())
                .collect(),
            documents: resolution.documents,
        }
    }
}

/// Write the whole resolution as one pretty-printed JSON object.
pub fn write_report(resolution: &Resolution, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &Report::from(resolution))?;
    writeln!(out)?;
    Ok(())
}

/// Write each URL entry as newline-delimited JSON.
pub fn write_entries(resolution: &Resolution, out: &mut impl Write) -> Result<()> {
    for entry in &resolution.entries {
        serde_json::to_writer(&mut *out, entry)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::Value;
    use sitemap_core::{SitemapReference, UrlEntry};

    fn sample() -> Resolution {
        Resolution {
            entries: vec![UrlEntry::new("https://a.test/1")],
            failures: vec![Error::resolution(
                "https://a.test/broken.xml",
                Error::Parse("unexpected root element <html>".to_string()),
            )],
            unexpanded: vec![SitemapReference::new("https://a.test/deeper.xml")],
            documents: 2,
        }
    }

    #[test]
    fn test_report_shape() {
        let mut out = Vec::new();
        write_report(&sample(), &mut out).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["urls"], serde_json::json!(["https://a.test/1"]));
        assert_eq!(value["unexpanded"], serde_json::json!(["https://a.test/deeper.xml"]));
        assert_eq!(value["documents"], 2);
        assert_eq!(value["failures"][0]["reference"], "https://a.test/broken.xml");
        assert_eq!(value["failures"][0]["category"], "parse");
        assert!(
            value["failures"][0]["message"]
                .as_str()
                .unwrap()
                .contains("<html>")
        );
    }

    #[test]
    fn test_entries_are_one_object_per_line() {
        let mut resolution = sample();
        resolution.entries.push(UrlEntry::new("https://a.test/2"));

        let mut out = Vec::new();
        write_entries(&resolution, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["loc"], "https://a.test/2");
        assert!(lines[0].get("lastmod").is_none());
    }
}
