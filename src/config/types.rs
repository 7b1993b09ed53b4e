use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[audit]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Kind names as accepted on the command line (`deployments`, `sts`, ...)
    pub kinds: Vec<String>,
    pub namespace: Option<String>,
    pub fetch_timeout_secs: u64,
    pub recommended_timeout_secs: u32,
    /// Kubeconfig context; the current context when unset
    pub context: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            kinds: vec![
                "deployments".to_string(),
                "statefulsets".to_string(),
                "daemonsets".to_string(),
            ],
            namespace: None,
            fetch_timeout_secs: 30,
            recommended_timeout_secs: 5,
            context: None,
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            prefix: "exec-probe-audit".to_string(),
        }
    }
}
