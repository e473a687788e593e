//! Routing seam between the engine and the host's client-side router.

use crate::net::query::QueryDict;

/// Route the engine is asked to load. `path_match` carries the wildcard
/// segment for essay routes (`/essay/*` style) and is empty otherwise.
#[derive(Debug, Clone, Default)]
pub struct Route {
    pub path: String,
    pub path_match: String,
    pub query: QueryDict,
    pub hash: String,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn with_path_match(mut self, path_match: impl Into<String>) -> Self {
        self.path_match = path_match.into();
        self
    }
}

/// Navigation dispatched when an intercepted internal link is clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct NavRequest {
    pub path: String,
    pub query: QueryDict,
    pub hash: String,
}

/// Implemented by the host's router. The engine only ever pushes; history
/// management stays on the host side.
pub trait Router {
    fn push(&mut self, request: NavRequest);
}

/// Router that records pushes instead of navigating. Used by tests and by
/// hosts that want to inspect dispatched navigations.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    pub pushed: Vec<NavRequest>,
}

impl Router for RecordingRouter {
    fn push(&mut self, request: NavRequest) {
        self.pushed.push(request);
    }
}
