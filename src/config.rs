//! Environment-driven configuration for the essay rendering service.

/// Where externally rendered essays come from.
#[derive(Debug, Clone, Default)]
pub struct EssayServiceConfig {
    /// Base URL of the rendering service, e.g. `https://render.example.org`.
    pub endpoint: String,
    /// Optional rendering context forwarded to the service.
    pub context: Option<String>,
}

impl EssayServiceConfig {
    /// Read `VE_SERVICE_ENDPOINT` and `VE_CONTEXT` from the environment.
    /// A missing endpoint yields an empty string; callers that never load
    /// essays never notice.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("VE_SERVICE_ENDPOINT").unwrap_or_default(),
            context: std::env::var("VE_CONTEXT").ok().filter(|s| !s.is_empty()),
        }
    }
}
