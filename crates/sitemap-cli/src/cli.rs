//! # CLI Structure and Argument Parsing
//!
//! `sitemap-urls` takes one or more sitemap URLs and prints every page URL
//! they reference, following sitemap indices and decompressing `.gz`
//! children along the way.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Plain listing, one URL per line
//! sitemap-urls https://example.com/sitemap_index.xml
//!
//! # Decode up to four compressed sitemaps at once
//! sitemap-urls -c 4 https://example.com/sitemap_index.xml
//!
//! # Authenticated sitemap, JSON report, keep going past failures
//! sitemap-urls -H "Authorization: Bearer abc" --best-effort -f json \
//!     https://example.com/private/sitemap.xml
//! ```
//!
//! ## Configuration Precedence
//!
//! Flags win over `SITEMAP_*` environment variables, which win over the
//! `--config` file, which wins over built-in defaults.

use clap::Parser;
use sitemap_core::SitemapReference;
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::utils::parsing::{parse_header, parse_reference};

/// Main CLI structure for the `sitemap-urls` command
#[derive(Parser, Clone, Debug)]
#[command(name = "sitemap-urls")]
#[command(version)]
#[command(
    about = "List every page URL referenced by XML sitemaps and sitemap indices",
    long_about = None
)]
pub struct Cli {
    /// Sitemap or sitemap index URLs to resolve
    #[arg(value_name = "SITEMAP", required = true, value_parser = parse_reference)]
    pub sitemaps: Vec<SitemapReference>,

    /// Compressed sitemaps fetched and decompressed at once [default: 1]
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Plain sitemaps fetched at once [default: 64]
    #[arg(long, value_name = "N")]
    pub fetch_concurrency: Option<usize>,

    /// Extra request header sent with every fetch (repeatable, one value per
    /// name)
    #[arg(
        short = 'H',
        long = "header",
        value_name = "NAME:VALUE",
        value_parser = parse_header
    )]
    pub headers: Vec<(String, String)>,

    /// Levels of sitemap indices to follow, counting the given sitemaps [default: 2]
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u8>,

    /// Report failed sitemaps instead of aborting on the first one
    #[arg(long)]
    pub best_effort: bool,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH", env = "SITEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show debug logs on stderr
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_all_options() {
        let cli = Cli::try_parse_from([
            "sitemap-urls",
            "-c",
            "4",
            "--fetch-concurrency",
            "8",
            "-H",
            "Authorization: Bearer abc",
            "-H",
            "X-Trace:1",
            "--max-depth",
            "3",
            "--best-effort",
            "--timeout",
            "5",
            "-f",
            "json",
            "https://a.test/sitemap.xml",
            "https://b.test/sitemap.xml.gz",
        ])
        .unwrap();

        assert_eq!(cli.sitemaps.len(), 2);
        assert!(cli.sitemaps[1].is_compressed());
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.fetch_concurrency, Some(8));
        assert_eq!(
            cli.headers,
            vec![
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(cli.max_depth, Some(3));
        assert!(cli.best_effort);
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_requires_a_sitemap() {
        assert!(Cli::try_parse_from(["sitemap-urls"]).is_err());
    }

    #[test]
    fn test_rejects_non_http_sitemap() {
        assert!(Cli::try_parse_from(["sitemap-urls", "ftp://a.test/sitemap.xml"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(
            Cli::try_parse_from(["sitemap-urls", "-v", "-q", "https://a.test/s.xml"]).is_err()
        );
    }
}
