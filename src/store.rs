//! Process-wide presentation state for the current page.
//!
//! Single-threaded by design: the engine and the host mutate the store from
//! the same thread, so there is no locking. A new page load simply
//! overwrites what the previous one wrote.

use std::collections::HashSet;

/// One entry of the site navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMenuItem {
    pub path: String,
}

/// Shared site state: what the shell renders and what the engine updates.
#[derive(Debug, Default)]
pub struct SiteStore {
    html: String,
    base_url: String,
    navigation: Vec<NavMenuItem>,
    settings_loaded: bool,
    site_title: String,
    site_banner: String,
    title: String,
    banner: String,
    spacer_height: u32,
}

impl SiteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Site-wide defaults, applied when a page carries no metadata of its own.
    pub fn with_site_defaults(
        mut self,
        site_title: impl Into<String>,
        site_banner: impl Into<String>,
    ) -> Self {
        self.site_title = site_title.into();
        self.site_banner = site_banner.into();
        self
    }

    pub fn with_navigation(mut self, navigation: Vec<NavMenuItem>) -> Self {
        self.navigation = navigation;
        self
    }

    // ─── Getters ─────────────────────────────────────────────────────────

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn navigation(&self) -> &[NavMenuItem] {
        &self.navigation
    }

    /// Set of route paths reachable from the navigation menu.
    pub fn nav_paths(&self) -> HashSet<&str> {
        self.navigation.iter().map(|item| item.path.as_str()).collect()
    }

    pub fn settings_loaded(&self) -> bool {
        self.settings_loaded
    }

    pub fn site_title(&self) -> &str {
        &self.site_title
    }

    pub fn site_banner(&self) -> &str {
        &self.site_banner
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn spacer_height(&self) -> u32 {
        self.spacer_height
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    pub fn set_settings_loaded(&mut self, loaded: bool) {
        self.settings_loaded = loaded;
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        log::debug!("store: title set to {:?}", self.title);
    }

    pub fn set_banner(&mut self, banner: impl Into<String>) {
        self.banner = banner.into();
        log::debug!("store: banner set to {:?}", self.banner);
    }

    pub fn set_spacer_height(&mut self, px: u32) {
        self.spacer_height = px;
    }
}
