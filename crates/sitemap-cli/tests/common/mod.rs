#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a configured `sitemap-urls` command suitable for integration tests.
///
/// Clears every `SITEMAP_*` override so the host environment cannot leak in.
#[allow(dead_code)]
pub fn sitemap_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitemap-urls"));
    cmd.timeout(CMD_TIMEOUT);
    for key in [
        "SITEMAP_CONFIG",
        "SITEMAP_CONCURRENCY",
        "SITEMAP_FETCH_CONCURRENCY",
        "SITEMAP_MAX_DEPTH",
        "SITEMAP_TIMEOUT_SECS",
        "SITEMAP_USER_AGENT",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

#[allow(dead_code)]
pub fn urlset(locs: &[&str]) -> String {
    let urls: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{loc}</loc></url>"))
        .collect();
    format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{urls}</urlset>"#)
}

#[allow(dead_code)]
pub fn index(locs: &[String]) -> String {
    let sitemaps: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{loc}</loc></sitemap>"))
        .collect();
    format!(
        r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{sitemaps}</sitemapindex>"#
    )
}

#[allow(dead_code)]
pub fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[allow(dead_code)]
pub async fn serve(server: &MockServer, route: &str, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .mount(server)
        .await;
}
