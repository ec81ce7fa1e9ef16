//! Resolve the given sitemaps and print their page URLs.

use anyhow::{Context, Result, bail};
use sitemap_core::{ErrorPolicy, RequestHeaders, Resolver, ResolverConfig};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::output;

/// Layer the config file, `SITEMAP_*` variables and flags into one config.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded, an environment
/// override is malformed, or the final settings are invalid.
pub fn build_config(cli: &Cli) -> Result<ResolverConfig> {
    let mut config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ResolverConfig::default(),
    };
    config.apply_env()?;

    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(fetch_concurrency) = cli.fetch_concurrency {
        config.fetch_concurrency = fetch_concurrency;
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if cli.best_effort {
        config.error_policy = ErrorPolicy::BestEffort;
    }

    config.validate()?;
    Ok(config)
}

/// Collect `-H` flags into request headers.
///
/// # Errors
///
/// Returns an error if a header name is given more than once, compared
/// case-insensitively.
pub fn request_headers(headers: &[(String, String)]) -> Result<RequestHeaders> {
    let mut seen = RequestHeaders::with_capacity(headers.len());
    for (name, value) in headers {
        if seen.keys().any(|existing| existing.eq_ignore_ascii_case(name)) {
            bail!("header '{name}' given more than once");
        }
        seen.insert(name.clone(), value.clone());
    }
    Ok(seen)
}

/// Run one resolution and render it to stdout.
///
/// Exits unsuccessfully when best-effort resolution recorded failures and
/// found no URLs at all.
pub async fn resolve(cli: &Cli) -> Result<ExitCode> {
    let config = build_config(cli)?;
    debug!(?config, "Resolved configuration");

    let headers = request_headers(&cli.headers)?;
    let resolver = Resolver::new(config)?;
    let resolution = resolver.resolve(cli.sitemaps.iter().cloned(), &headers).await?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    output::render(&resolution, cli.format, &mut out)?;

    if !resolution.unexpanded.is_empty() {
        warn!(
            count = resolution.unexpanded.len(),
            "Some nested sitemap indices were not followed; raise --max-depth to include them"
        );
    }

    if !resolution.failures.is_empty() && resolution.entries.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(
            ["sitemap-urls"]
                .iter()
                .chain(args)
                .chain(&["https://a.test/s.xml"]),
        )
        .unwrap()
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.toml");
        std::fs::write(&path, "concurrency = 3\nmax_depth = 4\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = build_config(&cli(&["--config", &path, "-c", "7"])).unwrap();
        assert_eq!(config.concurrency, 7);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
    }

    #[test]
    fn test_best_effort_and_timeout_flags() {
        let config = build_config(&cli(&["--best-effort", "--timeout", "9"])).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::BestEffort);
        assert_eq!(config.fetch.timeout_secs, 9);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        assert!(build_config(&cli(&["-c", "0"])).is_err());
        assert!(build_config(&cli(&["--max-depth", "0"])).is_err());
    }

    #[test]
    fn test_request_headers_collects_distinct_names() {
        let headers = request_headers(&cli(&["-H", "Accept:text/xml", "-H", "X-Token:abc"]).headers)
            .unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-Token"], "abc");
    }

    #[test]
    fn test_request_headers_rejects_repeated_name() {
        let err = request_headers(
            &cli(&["-H", "Authorization:Bearer a", "-H", "authorization:Bearer b"]).headers,
        )
        .unwrap_err();
        assert!(err.to_string().contains("given more than once"));
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let err = build_config(&cli(&["--config", "/nonexistent/sitemap.toml"])).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sitemap.toml"));
    }
}
