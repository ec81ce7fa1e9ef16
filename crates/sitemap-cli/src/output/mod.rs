//! # Output Formatting
//!
//! Renders a [`Resolution`] to stdout in one of three shapes:
//!
//! - **Text**: one page URL per line, nothing else
//! - **JSON**: a single report object with URLs, failures and unexpanded sitemaps
//! - **JSONL**: one URL entry per line with its sitemap metadata
//!
//! ```bash
//! sitemap-urls https://example.com/sitemap.xml | wc -l
//! sitemap-urls -f json https://example.com/sitemap.xml | jq '.failures'
//! sitemap-urls -f jsonl https://example.com/sitemap.xml | jq -r 'select(.lastmod) | .loc'
//! ```

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sitemap_core::Resolution;
use std::io::Write;

pub mod json;
pub mod text;

/// Output format for CLI results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One URL per line (default).
    #[default]
    Text,
    /// Single JSON report object.
    Json,
    /// JSON Lines, one URL entry per line.
    Jsonl,
}

impl OutputFormat {
    /// Check if this format is machine-readable (JSON or JSONL).
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json | Self::Jsonl)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Write `resolution` to `out` in `format`.
///
/// # Errors
///
/// Returns an error if writing or serialization fails.
pub fn render(resolution: &Resolution, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => text::write_urls(resolution, out)?,
        OutputFormat::Json => json::write_report(resolution, out)?,
        OutputFormat::Jsonl => json::write_entries(resolution, out)?,
    }
    out.flush()?;
    Ok(())
}
