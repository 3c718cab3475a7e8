use serde::Deserialize;

/// Default identifier sent in the `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = "searchcode-sdk/cli";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client identifier, first part of the `User-Agent` header
    pub user_agent: String,

    /// API root, e.g. `https://searchcode.com/api`
    pub base_url: String,

    /// Overall request timeout. Unset means the transport default.
    pub timeout_secs: Option<u64>,

    /// Write debug logs to a file instead of stderr
    pub debug: bool,

    /// File or directory for debug logs
    pub debug_log_path: Option<String>,

    pub debug_log_rotation: Option<DebugLogRotation>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: crate::client::DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
        }
    }
}

/// How debug log files are rotated
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Append to a single file
    #[default]
    None,
    /// One file per day (`<name>.YYYY-MM-DD`)
    Daily,
}
