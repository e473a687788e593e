//! HTTP access to page sources and the essay rendering service.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::EssayServiceConfig;

/// Error during fetch
pub struct FetchError {
    pub message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Characters escaped when embedding a source URL in a query component.
/// Mirrors what the essay service expects from its JS clients, which encode
/// with `encodeURIComponent` (alphanumerics plus `-_.!~*'()` left intact).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Map a route path to the Markdown source file it is served from.
/// The root route reads `index.md`; any other path appends `.md`.
pub fn static_page_source(route_path: &str) -> String {
    if route_path == "/" {
        "index.md".to_string()
    } else {
        format!("{}.md", route_path.trim_start_matches('/'))
    }
}

/// Absolute URL of the Markdown source for a static page route.
pub fn static_page_url(base_url: &str, route_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        static_page_source(route_path)
    )
}

/// Absolute URL of the Markdown source behind an essay route's wildcard.
pub fn essay_source_url(base_url: &str, path_match: &str) -> String {
    format!(
        "{}/content/{}.md",
        base_url.trim_end_matches('/'),
        path_match
    )
}

/// URL of the essay rendering service for a given source document.
/// `nocss` asks the service for bare markup; the optional context string is
/// forwarded verbatim.
pub fn essay_service_url(config: &EssayServiceConfig, src: &str) -> String {
    let mut url = format!(
        "{}/essay?src={}&nocss",
        config.endpoint,
        utf8_percent_encode(src, QUERY_COMPONENT)
    );
    if let Some(context) = &config.context {
        url.push_str("&context=");
        url.push_str(context);
    }
    url
}

/// Fetch a URL and return the response body (blocking).
///
/// Non-success statuses are reported as errors. No retry or backoff: the
/// caller owns failure handling.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(
            "Mozilla/5.0 (compatible; inkroute/0.2; ",
            "+https://github.com/ext-sakamoro/inkroute)"
        ))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError {
            message: format!("Client error: {}", e),
        })?;

    let response = client
        .get(url)
        .header("Accept", "text/markdown,text/html,text/plain;q=0.9,*/*;q=0.8")
        .send()
        .map_err(|e| FetchError {
            message: format!("Request failed: {}", e),
        })?
        .error_for_status()
        .map_err(|e| FetchError {
            message: format!("Bad status: {}", e),
        })?;

    response.text().map_err(|e| FetchError {
        message: format!("Failed to read body: {}", e),
    })
}
