//! Structural decomposition of absolute http/https URLs.
//!
//! Link rewriting needs the raw pieces of a URL exactly as written: an
//! explicit `:8080` must survive into `origin` so that origin comparison
//! against the configured base URL stays textual. `url::Url` normalizes
//! default ports away, so decomposition is done with a regex instead.

use std::sync::OnceLock;

use regex::Regex;

/// Pieces of an absolute http/https URL.
///
/// `pathname` stops before `?`/`#`; `search` includes its leading `?` and
/// `hash` its leading `#` (both empty when absent). `origin + pathname +
/// search + hash` reconstructs the parsed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub protocol: String,
    pub host: String,
    pub hostname: String,
    pub origin: String,
    pub port: Option<u16>,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(https?)://(([^:/?#]*)(?::([0-9]+))?)(/[^?#]*)(\?[^#]*|)(#.*|)$")
            .expect("static url pattern compiles")
    })
}

/// Decompose an absolute http/https URL.
///
/// Returns `None` for anything the pattern does not match (other schemes,
/// relative paths, garbage). Callers treat `None` as "leave this link
/// alone", never as an error.
pub fn parse_url(href: &str) -> Option<ParsedUrl> {
    let caps = url_pattern().captures(href)?;

    let protocol = caps[1].to_string();
    let host = caps[2].to_string();
    let hostname = caps[3].to_string();
    let port = caps.get(4).and_then(|m| m.as_str().parse().ok());
    let origin = format!("{}://{}", protocol, host);

    Some(ParsedUrl {
        protocol,
        host,
        hostname,
        origin,
        port,
        pathname: caps[5].to_string(),
        search: caps.get(6).map(|m| m.as_str().to_string()).unwrap_or_default(),
        hash: caps.get(7).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

/// Origin of a URL that may omit the path entirely, like a configured base
/// URL of the form `https://example.com`. Retries with a root path appended
/// so the same decomposition rules apply.
pub fn origin_of(url: &str) -> Option<String> {
    if let Some(parsed) = parse_url(url) {
        return Some(parsed.origin);
    }
    parse_url(&format!("{}/", url)).map(|parsed| parsed.origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_url() {
        let parsed = parse_url("https://example.com:8080/docs/page?x=1&y=2#top").unwrap();
        assert_eq!(parsed.protocol, "https");
        assert_eq!(parsed.host, "example.com:8080");
        assert_eq!(parsed.hostname, "example.com");
        assert_eq!(parsed.port, Some(8080));
        assert_eq!(parsed.origin, "https://example.com:8080");
        assert_eq!(parsed.pathname, "/docs/page");
        assert_eq!(parsed.search, "?x=1&y=2");
        assert_eq!(parsed.hash, "#top");
    }

    #[test]
    fn search_and_hash_default_to_empty() {
        let parsed = parse_url("http://example.com/about").unwrap();
        assert_eq!(parsed.port, None);
        assert_eq!(parsed.search, "");
        assert_eq!(parsed.hash, "");
    }

    #[test]
    fn reconstruction_round_trips() {
        let urls = [
            "https://example.com/",
            "http://example.com:3000/a/b.md",
            "https://example.com/foo?x=1#bar",
            "http://sub.example.com/p?q=#frag",
        ];
        for url in urls {
            let p = parse_url(url).unwrap();
            let rebuilt = format!("{}{}{}{}", p.origin, p.pathname, p.search, p.hash);
            assert_eq!(rebuilt, url);
        }
    }

    #[test]
    fn malformed_urls_return_none() {
        assert!(parse_url("ftp://example.com/file").is_none());
        assert!(parse_url("mailto:hi@example.com").is_none());
        assert!(parse_url("/relative/path").is_none());
        assert!(parse_url("example.com/no-scheme").is_none());
        assert!(parse_url("").is_none());
        // Absolute but missing the path slash
        assert!(parse_url("https://example.com").is_none());
    }

    #[test]
    fn origin_of_accepts_bare_base_url() {
        assert_eq!(
            origin_of("https://example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            origin_of("https://example.com:8080/site").as_deref(),
            Some("https://example.com:8080")
        );
        assert!(origin_of("not a url").is_none());
    }
}
