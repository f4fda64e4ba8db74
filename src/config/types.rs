//! Harness settings data types.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

/// Log output formatting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Emit ANSI colour codes.
    pub ansi: bool,

    /// Include the event target (module path) in each line.
    pub with_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            ansi: true,
            with_target: true,
        }
    }
}

/// Operator diagnostics emitted during group bootstrap.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Write host operating-system metadata to the debug log in `before_all`.
    pub dump_host_metadata: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            dump_host_metadata: true,
        }
    }
}

/// Root harness settings.
///
/// Loaded with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables.
///
/// Configuration files are discovered in this order:
/// 1. Path passed explicitly to the loader
/// 2. Path specified via `CRDB_HARNESS_CONFIG_PATH`
/// 3. `.crdb-harness.toml` in the current working directory
/// 4. `.crdb-harness.toml` in the home directory
/// 5. `~/.config/crdb-harness/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "CRDB_HARNESS",
    post_merge_hook,
    discovery(
        app_name = "crdb-harness",
        env_var = "CRDB_HARNESS_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".crdb-harness.toml",
    )
)]
pub struct HarnessSettings {
    /// `tracing` filter directive, e.g. `crdb_harness=debug,info`.
    ///
    /// When unset, `RUST_LOG` is consulted, then `info`.
    pub log_filter: Option<String>,

    /// Log output formatting.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub logging: LoggingSettings,

    /// Bootstrap diagnostics.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub diagnostics: DiagnosticsSettings,
}

impl HarnessSettings {
    /// Treat a blank `log_filter` as unset so `RUST_LOG` still applies.
    pub(crate) fn normalise(&mut self) {
        if self
            .log_filter
            .as_deref()
            .is_some_and(|filter| filter.trim().is_empty())
        {
            self.log_filter = None;
        }
    }
}

impl PostMergeHook for HarnessSettings {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.normalise();
        Ok(())
    }
}
