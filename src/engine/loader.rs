//! Page load orchestration.
//!
//! Mirrors the host's event loop: `load_static_page`/`load_essay` start a
//! background fetch, `check_fetch` commits the result when it arrives, and
//! `tick` drives the pollers for essay readiness and metadata. Everything
//! that touches the store happens on the caller's thread; the spawned
//! thread only fetches (and renders Markdown) and sends the result back
//! over a channel.
//!
//! Starting a new load resets all per-page state — in-flight results and
//! pending polls of the previous page are cancelled, not leaked.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::config::EssayServiceConfig;
use crate::dom::metadata::{
    apply_essay_metadata, apply_static_page_metadata, extract_essay_items, EssayDataItem,
};
use crate::dom::parser::parse_fragment;
use crate::dom::rewrite::rewrite_links;
use crate::dom::DomTree;
use crate::engine::poll::{EssayMetadataPoller, ReadinessPoller, POLL_INTERVAL};
use crate::engine::PageError;
use crate::net::fetch::{self, FetchError};
use crate::render::render_markdown;
use crate::router::{NavRequest, Route, Router};
use crate::store::SiteStore;

/// Height of the fixed site header; scroll targets sit this far below the
/// top of the scrollable container.
pub const HEADER_OFFSET_PX: u32 = 56;

/// Element the essay readiness poll waits for.
pub const ESSAY_CONTENT_ID: &str = "visual-essay";

/// Layout spacer whose measured height feeds [`PageEngine::notify_resize`].
pub const ESSAY_SPACER_ID: &str = "essay-spacer";

/// Container scroll requests are executed against.
pub const SCROLL_CONTAINER_ID: &str = "scrollableContent";

/// Scroll side effect for the host to execute against its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollRequest {
    ToTop,
    ToElement { id: String, header_offset_px: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    StaticPage,
    Essay,
}

struct PendingLoad {
    kind: LoadKind,
    route: Route,
}

/// Orchestrates fetching, rendering, committing and post-mount side
/// effects for one page at a time.
pub struct PageEngine {
    store: SiteStore,
    essay_config: EssayServiceConfig,
    poll_interval: Duration,

    fetch_rx: Option<Receiver<Result<String, FetchError>>>,
    pending: Option<PendingLoad>,

    content: Option<DomTree>,
    essay: Option<String>,
    nav_bindings: Vec<NavRequest>,

    readiness: Option<ReadinessPoller>,
    metadata_poller: Option<EssayMetadataPoller>,
    essay_data_tx: Option<Sender<Vec<EssayDataItem>>>,
    essay_data_rx: Option<Receiver<Vec<EssayDataItem>>>,

    scroll_request: Option<ScrollRequest>,
    spacer_sync: bool,
}

impl PageEngine {
    pub fn new(store: SiteStore, essay_config: EssayServiceConfig) -> Self {
        Self {
            store,
            essay_config,
            poll_interval: POLL_INTERVAL,
            fetch_rx: None,
            pending: None,
            content: None,
            essay: None,
            nav_bindings: Vec::new(),
            readiness: None,
            metadata_poller: None,
            essay_data_tx: None,
            essay_data_rx: None,
            scroll_request: None,
            spacer_sync: false,
        }
    }

    /// Override the retry delay of the readiness/metadata polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn store(&self) -> &SiteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SiteStore {
        &mut self.store
    }

    /// Raw essay response of the current page, rewritten once mounted.
    pub fn essay(&self) -> Option<&str> {
        self.essay.as_deref()
    }

    pub fn nav_bindings(&self) -> &[NavRequest] {
        &self.nav_bindings
    }

    /// Sender the metadata injector resolves once essay data is available.
    /// Present only while an essay page is mounted.
    pub fn essay_data_sender(&self) -> Option<Sender<Vec<EssayDataItem>>> {
        self.essay_data_tx.clone()
    }

    // ─── Loading ─────────────────────────────────────────────────────────

    /// Start loading a static Markdown page for the given route.
    pub fn load_static_page(&mut self, route: Route) {
        self.reset_page_state();

        let url = fetch::static_page_url(self.store.base_url(), &route.path);
        log::info!("loading static page {}", url);

        let (tx, rx) = mpsc::channel();
        self.fetch_rx = Some(rx);
        self.pending = Some(PendingLoad {
            kind: LoadKind::StaticPage,
            route,
        });

        thread::spawn(move || {
            let result = fetch::fetch_text(&url).map(|md| render_markdown(&md));
            let _ = tx.send(result);
        });
    }

    /// Start loading an externally rendered essay for the given route.
    pub fn load_essay(&mut self, route: Route) {
        self.reset_page_state();

        let src = fetch::essay_source_url(self.store.base_url(), &route.path_match);
        let url = fetch::essay_service_url(&self.essay_config, &src);
        log::info!("loading essay {}", url);

        let (tx, rx) = mpsc::channel();
        self.fetch_rx = Some(rx);
        self.pending = Some(PendingLoad {
            kind: LoadKind::Essay,
            route,
        });

        thread::spawn(move || {
            let _ = tx.send(fetch::fetch_text(&url));
        });
    }

    /// Cancel the in-flight load and all pending polls.
    pub fn cancel_pending(&mut self) {
        self.reset_page_state();
    }

    fn reset_page_state(&mut self) {
        self.fetch_rx = None;
        self.pending = None;
        self.content = None;
        self.essay = None;
        self.nav_bindings.clear();
        self.readiness = None;
        self.metadata_poller = None;
        self.essay_data_tx = None;
        self.essay_data_rx = None;
        self.scroll_request = None;
        self.spacer_sync = false;
    }

    /// Poll the async fetch channel and commit the page when the result
    /// arrives. Returns `Ok(true)` once a page was committed; fetch
    /// failures surface here, uncaught and unretried.
    pub fn check_fetch(&mut self) -> Result<bool, PageError> {
        let Some(rx) = &self.fetch_rx else {
            return Ok(false);
        };
        let Ok(result) = rx.try_recv() else {
            return Ok(false);
        };
        self.fetch_rx = None;
        let pending = self.pending.take();

        let body = result.map_err(|e| PageError {
            message: e.message,
            phase: "fetch",
        })?;

        match pending {
            Some(PendingLoad {
                kind: LoadKind::StaticPage,
                route,
            }) => self.commit_static_page(body, &route),
            Some(PendingLoad {
                kind: LoadKind::Essay,
                route,
            }) => self.commit_essay(body, &route),
            None => return Ok(false),
        }
        Ok(true)
    }

    /// Drive the readiness and metadata polls. Call from the host loop.
    pub fn tick(&mut self) {
        if let Some(poller) = &mut self.readiness {
            if poller.poll(self.content.as_ref()) {
                self.readiness = None;
                self.on_essay_ready();
            }
        }
        if let Some(poller) = &mut self.metadata_poller {
            if let Some(items) = poller.poll() {
                self.metadata_poller = None;
                apply_essay_metadata(&items, &mut self.store);
            }
        }
    }

    // ─── Commit paths ────────────────────────────────────────────────────

    /// Rendered HTML arrived for a static page: commit it, extract the
    /// inline metadata marker, rewrite links, and queue the fragment scroll.
    fn commit_static_page(&mut self, html: String, route: &Route) {
        self.store.set_html(html.as_str());

        let mut tree = parse_fragment(&html);
        apply_static_page_metadata(&tree, &mut self.store);
        rewrite_links(&mut tree, self.store.base_url(), &mut self.nav_bindings);
        let rewritten = tree.to_html();
        self.store.set_html(rewritten);

        if let Some(elem_id) = route.hash.strip_prefix('#').filter(|id| !id.is_empty()) {
            if tree.contains_id(elem_id) {
                self.scroll_request = Some(ScrollRequest::ToElement {
                    id: elem_id.to_string(),
                    header_offset_px: HEADER_OFFSET_PX,
                });
            }
        }
        self.content = Some(tree);
    }

    /// The essay service responded: keep the raw document and start waiting
    /// for its content element to mount.
    fn commit_essay(&mut self, body: String, _route: &Route) {
        self.content = Some(parse_fragment(&body));
        self.essay = Some(body);

        let (tx, rx) = mpsc::channel();
        self.essay_data_tx = Some(tx);
        self.essay_data_rx = Some(rx);
        self.readiness = Some(ReadinessPoller::with_interval(
            ESSAY_CONTENT_ID,
            self.poll_interval,
        ));
    }

    /// The essay content element exists: wire the spacer sync, scroll to
    /// the top, apply metadata (embedded or awaited), and rewrite links.
    fn on_essay_ready(&mut self) {
        self.spacer_sync = true;
        self.scroll_request = Some(ScrollRequest::ToTop);

        let Some(tree) = &mut self.content else {
            return;
        };

        let items = extract_essay_items(tree);
        if items.is_empty() {
            if let Some(rx) = self.essay_data_rx.take() {
                self.metadata_poller =
                    Some(EssayMetadataPoller::with_interval(rx, self.poll_interval));
            }
        } else {
            apply_essay_metadata(&items, &mut self.store);
        }

        rewrite_links(tree, self.store.base_url(), &mut self.nav_bindings);
        self.essay = Some(tree.to_html());
    }

    // ─── Host callbacks ──────────────────────────────────────────────────

    /// Replace the engine's view of the mounted content. Hosts call this
    /// when their mount differs from the committed fragment (an essay shell
    /// filling in asynchronously).
    pub fn set_content(&mut self, html: &str) {
        self.content = Some(parse_fragment(html));
    }

    /// Dispatch the navigation bound to an intercepted anchor. The index is
    /// the anchor's `data-nav` attribute value.
    pub fn click(&mut self, binding: usize, router: &mut dyn Router) -> bool {
        match self.nav_bindings.get(binding) {
            Some(request) => {
                router.push(request.clone());
                true
            }
            None => false,
        }
    }

    /// Resize notification for the essay spacer element. `None` means the
    /// element does not exist, which resets the height to zero.
    pub fn notify_resize(&mut self, spacer_height: Option<u32>) {
        if self.spacer_sync {
            self.store.set_spacer_height(spacer_height.unwrap_or(0));
        }
    }

    /// Scroll side effect queued by the last commit or mount, if any.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_request.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RecordingRouter;
    use crate::store::SiteStore;

    const BASE: &str = "https://example.com";

    fn engine() -> PageEngine {
        let store = SiteStore::new(BASE).with_site_defaults("Site", "/images/site.png");
        PageEngine::new(store, EssayServiceConfig::default())
            .with_poll_interval(Duration::ZERO)
    }

    #[test]
    fn static_commit_applies_metadata_and_rewrites_links() {
        let mut engine = engine();
        let html = concat!(
            r#"<var data-page title="Docs" data-banner="/images/docs.png"></var>"#,
            r#"<p><a href="https://example.com/foo?x=1#bar">go</a></p>"#,
            r#"<img src="/images/a.png">"#,
        );
        engine.commit_static_page(html.to_string(), &Route::new("/docs"));

        assert_eq!(engine.store().title(), "Docs");
        assert_eq!(engine.store().banner(), "/images/docs.png");
        assert!(!engine.store().html().contains("href="));
        assert!(engine
            .store()
            .html()
            .contains(r#"src="https://example.com/images/a.png""#));
        assert_eq!(engine.nav_bindings().len(), 1);
    }

    #[test]
    fn click_dispatches_bound_navigation() {
        let mut engine = engine();
        engine.commit_static_page(
            r#"<a href="https://example.com/foo?x=1#bar">go</a>"#.to_string(),
            &Route::new("/"),
        );

        let mut router = RecordingRouter::default();
        assert!(engine.click(0, &mut router));
        assert_eq!(router.pushed.len(), 1);
        assert_eq!(router.pushed[0].path, "/foo");
        assert_eq!(router.pushed[0].query.get("x").map(String::as_str), Some("1"));
        assert_eq!(router.pushed[0].hash, "#bar");

        assert!(!engine.click(7, &mut router));
    }

    #[test]
    fn fragment_route_queues_offset_scroll() {
        let mut engine = engine();
        engine.commit_static_page(
            r#"<h2 id="usage">Usage</h2>"#.to_string(),
            &Route::new("/docs").with_hash("#usage"),
        );
        assert_eq!(
            engine.take_scroll_request(),
            Some(ScrollRequest::ToElement {
                id: "usage".to_string(),
                header_offset_px: HEADER_OFFSET_PX,
            })
        );
        // Taken once
        assert!(engine.take_scroll_request().is_none());
    }

    #[test]
    fn missing_fragment_target_scrolls_nowhere() {
        let mut engine = engine();
        engine.commit_static_page(
            "<p>no anchors</p>".to_string(),
            &Route::new("/docs").with_hash("#absent"),
        );
        assert!(engine.take_scroll_request().is_none());
    }

    #[test]
    fn essay_with_embedded_metadata_applies_on_ready() {
        let mut engine = engine();
        let body = concat!(
            r#"<div id="visual-essay">"#,
            r#"<script type="application/ld+json">"#,
            r#"[{"type":"essay","title":"T","banner":"/images/e.png"}]"#,
            r#"</script>"#,
            r#"<a href="https://example.com/next">next</a>"#,
            r#"</div>"#,
        );
        engine.commit_essay(body.to_string(), &Route::new("/essay/a"));
        engine.tick();

        assert_eq!(engine.store().title(), "T");
        assert_eq!(engine.store().banner(), "https://example.com/images/e.png");
        assert_eq!(engine.take_scroll_request(), Some(ScrollRequest::ToTop));
        assert_eq!(engine.nav_bindings().len(), 1);
        assert!(engine.essay().unwrap().contains("data-nav"));
    }

    #[test]
    fn essay_metadata_arrives_through_injector_channel() {
        let mut engine = engine();
        engine.commit_essay(
            r#"<div id="visual-essay">loading</div>"#.to_string(),
            &Route::new("/essay/a"),
        );
        engine.tick();

        // No embedded payload: title unchanged, injector sender armed.
        assert_eq!(engine.store().title(), "");
        let tx = engine.essay_data_sender().expect("sender available");

        engine.tick();
        assert_eq!(engine.store().title(), "");

        tx.send(vec![EssayDataItem {
            kind: "essay".into(),
            title: Some("Injected".into()),
            banner: None,
        }])
        .unwrap();
        engine.tick();
        assert_eq!(engine.store().title(), "Injected");
    }

    #[test]
    fn essay_waits_for_content_element() {
        let mut engine = engine();
        engine.commit_essay("<div>shell</div>".to_string(), &Route::new("/essay/a"));
        engine.tick();
        assert!(engine.take_scroll_request().is_none());

        engine.set_content(r#"<div id="visual-essay"></div>"#);
        engine.tick();
        assert_eq!(engine.take_scroll_request(), Some(ScrollRequest::ToTop));
    }

    #[test]
    fn resize_updates_spacer_only_after_essay_mount() {
        let mut engine = engine();
        engine.notify_resize(Some(300));
        assert_eq!(engine.store().spacer_height(), 0);

        engine.commit_essay(
            r#"<div id="visual-essay"></div>"#.to_string(),
            &Route::new("/essay/a"),
        );
        engine.tick();
        engine.notify_resize(Some(300));
        assert_eq!(engine.store().spacer_height(), 300);
        engine.notify_resize(None);
        assert_eq!(engine.store().spacer_height(), 0);
    }

    #[test]
    fn new_load_cancels_previous_page_polls() {
        let mut engine = engine();
        engine.commit_essay(
            r#"<div id="visual-essay"></div>"#.to_string(),
            &Route::new("/essay/a"),
        );
        engine.tick();
        assert!(engine.essay().is_some());

        engine.cancel_pending();
        assert!(engine.essay_data_sender().is_none());
        assert!(engine.essay().is_none());
        assert!(engine.nav_bindings().is_empty());
        assert!(engine.take_scroll_request().is_none());

        // A resize after teardown must not write stale state.
        engine.notify_resize(Some(500));
        assert_eq!(engine.store().spacer_height(), 0);
    }

    #[test]
    fn check_fetch_is_idle_without_pending_load() {
        let mut engine = engine();
        assert!(matches!(engine.check_fetch(), Ok(false)));
    }
}
