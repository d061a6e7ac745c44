use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_path:  String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// A single `.inky` file, or a directory scanned recursively.
    pub script_path: String,
    pub start_label: String,
    /// Upper bound on silent nodes resolved by one `step()` call.
    pub max_silent_steps: usize,
    /// Upper bound on observable nodes collected by an eager run.
    pub max_trace_nodes: usize,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub show_tokens: bool,
    pub show_ast:    bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_path:  "logs/".into(),
            log_level: "info".into(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            script_path: "game/".into(),
            start_label: crate::runtime::DEFAULT_START_LABEL.into(),
            max_silent_steps: 10_000,
            max_trace_nodes: 10_000,
            debug: DebugConfig::default(),
        }
    }
}
