//! Configuration for the harness.
//!
//! Two kinds of configuration live here:
//!
//! - **Declarative group configuration**: the value a test group attaches to
//!   itself through [`TestGroup`], resolved once by [`ConfigResolver`] and
//!   passed through untouched to every step.
//! - **Harness settings**: process-wide [`HarnessSettings`] controlling
//!   logging and diagnostics, loaded with layered precedence (environment
//!   over file over defaults) via the `ortho_config` crate.
//!
//! The settings file is expected at `~/.config/crdb-harness/config.toml` by
//! default.
//!
//! # Example Settings
//!
//! ```toml
//! log_filter = "crdb_harness=debug,info"
//!
//! [logging]
//! ansi = false
//! with_target = true
//!
//! [diagnostics]
//! dump_host_metadata = true
//! ```

mod group;
mod loader;
mod types;

pub use group::{ConfigResolver, TestGroup};
pub use loader::{CONFIG_PATH_ENV_VAR, env_var_names, load_settings, load_settings_with_env};
pub use types::{DiagnosticsSettings, HarnessSettings, LoggingSettings};
