use serde::{Deserialize, Serialize};

/// HTTP host configuration, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Listen address; when unset the server `host:port` is used.
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    /// Mount point of every module route, e.g. `/api`.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: default_true(),
            cors_enabled: false,
            api_prefix: default_api_prefix(),
            request_timeout_sec: default_request_timeout_sec(),
        }
    }
}

impl ApiIngressConfig {
    /// Prefix normalised to `/segment` form; empty when routes live at the root.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_request_timeout_sec() -> u64 {
    30
}
