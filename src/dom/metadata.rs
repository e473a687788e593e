//! Page metadata extraction.
//!
//! Static pages carry an inline marker element; essays embed structured
//! `application/ld+json` payloads (or deliver the same items through the
//! injector channel, see `engine::poll`). Either way the result lands in
//! the shared store's title/banner.

use serde::Deserialize;

use crate::dom::{DomNode, DomTree};
use crate::store::SiteStore;

const LD_JSON_TYPE: &str = "application/ld+json";
const IMAGE_PATH_PREFIX: &str = "/images/";

/// One entry of an essay's embedded data array. Only `type == "essay"`
/// items are applied; everything else is carried for the host to inspect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EssayDataItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

/// Read the inline `<var data-page …>` marker of a static page and commit
/// title/banner to the store. The first marker in document order wins; a
/// missing marker or missing attribute falls back to the site-wide default.
pub fn apply_static_page_metadata(tree: &DomTree, store: &mut SiteStore) {
    let marker = tree
        .root
        .find_element(&|el| el.tag == "var" && el.attr("data-page").is_some());

    let title = marker
        .and_then(|m| m.attr("title"))
        .unwrap_or(store.site_title())
        .to_string();
    let banner = marker
        .and_then(|m| m.attr("data-banner"))
        .unwrap_or(store.site_banner())
        .to_string();

    store.set_title(title);
    store.set_banner(banner);
}

/// Collect essay data items from embedded `application/ld+json` blocks.
/// Each block holds either an array of items or a single item; blocks that
/// fail to parse are logged and skipped.
pub fn extract_essay_items(tree: &DomTree) -> Vec<EssayDataItem> {
    let mut items = Vec::new();
    tree.root.for_each_element(&mut |el: &DomNode| {
        if el.tag != "script" || el.attr("type") != Some(LD_JSON_TYPE) {
            return;
        }
        let payload = el.collect_text();
        match serde_json::from_str::<Vec<EssayDataItem>>(&payload) {
            Ok(parsed) => items.extend(parsed),
            Err(_) => match serde_json::from_str::<EssayDataItem>(&payload) {
                Ok(single) => items.push(single),
                Err(err) => log::warn!("unparseable ld+json block: {}", err),
            },
        }
    });
    items
}

/// Apply essay metadata to the store. Banner paths under `/images/` are
/// prefixed with the base URL so they resolve against the canonical origin.
pub fn apply_essay_metadata(items: &[EssayDataItem], store: &mut SiteStore) {
    for item in items.iter().filter(|item| item.kind == "essay") {
        if let Some(title) = &item.title {
            store.set_title(title.clone());
        }
        if let Some(banner) = &item.banner {
            let image_url = if banner.starts_with(IMAGE_PATH_PREFIX) {
                format!("{}{}", store.base_url().trim_end_matches('/'), banner)
            } else {
                banner.clone()
            };
            store.set_banner(image_url);
        }
    }
}
