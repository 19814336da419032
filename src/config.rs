//! Compiler configuration
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no file
//! at all) gives the stock behaviour.
//!
//! ```yaml
//! line_marker: "// line "
//! exit_policy: abort_scan
//! strip_script_tags: true
//! swallow_comment_line_break: false
//! script_timeout_ms: 5000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Environment variable naming the YAML file read by
/// [`CompilerConfig::from_env`].
pub const CONFIG_ENV: &str = "PLAY_TEMPLATE_CONFIG";

/// What happens after directive code requests an exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Output is frozen but scanning runs on to `EOF`; later scripts are
    /// still evaluated and their output dropped.
    #[default]
    SuppressOutput,
    /// Scanning stops at the first token boundary after the request.
    AbortScan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Text written by `mark_line` ahead of the source line number.
    pub line_marker: String,
    pub exit_policy: ExitPolicy,
    /// Trim SCRIPT bodies and drop a wrapping `<script>` / `</script>`.
    pub strip_script_tags: bool,
    /// Drop one leading line break from the text that follows a comment.
    pub swallow_comment_line_break: bool,
    /// Upper bound on a single SCRIPT evaluation. `None` waits forever.
    pub script_timeout_ms: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            line_marker: "// line ".to_string(),
            exit_policy: ExitPolicy::default(),
            strip_script_tags: true,
            swallow_comment_line_break: false,
            script_timeout_ms: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("Failed to parse compiler config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read compiler config {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Invalid compiler config {}", path.display()))?;
        info!(path = %path.display(), "Loaded compiler config");
        Ok(config)
    }

    /// Load the file named by `PLAY_TEMPLATE_CONFIG`, or fall back to the
    /// defaults when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn script_timeout(&self) -> Option<Duration> {
        self.script_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.line_marker, "// line ");
        assert_eq!(config.exit_policy, ExitPolicy::SuppressOutput);
        assert!(config.strip_script_tags);
        assert!(!config.swallow_comment_line_break);
        assert_eq!(config.script_timeout(), None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CompilerConfig::from_yaml("exit_policy: abort_scan\nscript_timeout_ms: 250\n")
            .unwrap();
        assert_eq!(config.exit_policy, ExitPolicy::AbortScan);
        assert_eq!(config.script_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.line_marker, "// line ");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(CompilerConfig::from_yaml("").unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(CompilerConfig::from_yaml("exit_policy: halt\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "line_marker: \"<!-- line \"").unwrap();
        writeln!(file, "swallow_comment_line_break: true").unwrap();

        let config = CompilerConfig::load(file.path()).unwrap();
        assert_eq!(config.line_marker, "<!-- line ");
        assert!(config.swallow_comment_line_break);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = CompilerConfig::load("/nonexistent/play-template.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/play-template.yaml"));
    }
}
