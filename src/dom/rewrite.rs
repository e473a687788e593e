//! Internal link interception and image path rewriting.
//!
//! Runs once per freshly mounted content fragment. Anchors that resolve to
//! the site's own origin lose their `href` and gain a navigation binding so
//! a click routes client-side instead of reloading; images under
//! `/images/` are pinned to the canonical base URL regardless of where the
//! fragment was fetched from.

use crate::dom::{DomNode, DomTree};
use crate::net::query::parse_query_string;
use crate::net::url::{origin_of, parse_url};
use crate::router::NavRequest;

/// Marker attribute on intercepted anchors. Its value indexes into the
/// binding list returned by the rewrite; its presence makes re-running the
/// rewrite on the same tree a no-op for that element.
pub const NAV_BINDING_ATTR: &str = "data-nav";

const IMAGE_PATH_PREFIX: &str = "/images/";

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with("//") {
        return format!("https:{}", href);
    }
    if let Ok(base_url) = url::Url::parse(base) {
        if let Ok(resolved) = base_url.join(href) {
            return resolved.to_string();
        }
    }
    href.to_string()
}

/// Rewrite anchors and images in a mounted content fragment.
///
/// New navigation bindings are appended to `bindings`; the element's
/// `data-nav` attribute holds the binding index. Origins are compared by
/// exact equality with the configured base URL's origin. Anchors on foreign
/// origins keep their `href` and stay ordinary links.
pub fn rewrite_links(tree: &mut DomTree, base_url: &str, bindings: &mut Vec<NavRequest>) {
    let Some(base_origin) = origin_of(base_url) else {
        log::warn!("unparseable base url {:?}, skipping link rewrite", base_url);
        return;
    };
    let base_trimmed = base_url.trim_end_matches('/');

    tree.root.for_each_element_mut(&mut |el: &mut DomNode| {
        if el.tag == "a" {
            rewrite_anchor(el, base_trimmed, &base_origin, bindings);
        } else if el.tag == "img" {
            rewrite_image(el, base_trimmed, &base_origin);
        }
    });
}

fn rewrite_anchor(
    el: &mut DomNode,
    base_url: &str,
    base_origin: &str,
    bindings: &mut Vec<NavRequest>,
) {
    if el.attr(NAV_BINDING_ATTR).is_some() {
        return; // already intercepted
    }
    let Some(href) = el.attr("href").filter(|h| !h.is_empty()) else {
        return;
    };
    let Some(parsed) = parse_url(&resolve_url(base_url, href)) else {
        return;
    };
    if parsed.origin != base_origin {
        return;
    }

    el.remove_attr("href");
    el.set_attr(NAV_BINDING_ATTR, bindings.len().to_string());
    bindings.push(NavRequest {
        path: parsed.pathname,
        query: parse_query_string(&parsed.search),
        hash: parsed.hash,
    });
}

fn rewrite_image(el: &mut DomNode, base_url: &str, base_origin: &str) {
    let Some(src) = el.attr("src").filter(|s| !s.is_empty()) else {
        return;
    };
    let Some(parsed) = parse_url(&resolve_url(base_url, src)) else {
        return;
    };
    if parsed.pathname.starts_with(IMAGE_PATH_PREFIX) && parsed.origin == base_origin {
        el.set_attr("src", format!("{}{}", base_url, parsed.pathname));
    }
}
