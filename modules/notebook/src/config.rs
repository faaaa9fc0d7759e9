use serde::{Deserialize, Serialize};

/// Configuration for the notebook module (`modules.notebook`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotebookConfig {
    /// Application name used in the `X-{app}-alert` response headers.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
        }
    }
}

fn default_app_name() -> String {
    "notebookApp".to_string()
}
