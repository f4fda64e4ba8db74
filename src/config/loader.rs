//! Harness settings loading with layered precedence.
//!
//! Settings are merged from (lowest to highest): application defaults, a
//! configuration file, and `CRDB_HARNESS_*` environment variables. There is no
//! CLI layer; the harness runs inside a host test runner that owns the
//! command line.
//!
//! # Environment Variable Handling
//!
//! Environment variables with unparseable values (e.g.
//! `CRDB_HARNESS_LOGGING_ANSI=maybe` instead of `true`/`false`) return an error
//! immediately rather than silently falling back to defaults. String fields
//! are always accepted.
//!
//! Environment access goes through [`mockable::Env`] so tests can supply
//! variables without touching the process environment.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::HarnessSettings;
use crate::error::{ConfigError, Result};

/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV_VAR: &str = "CRDB_HARNESS_CONFIG_PATH";

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name.
    env_var: &'static str,
    /// The JSON path segments (e.g., `["logging", "ansi"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "CRDB_HARNESS_LOG_FILTER",
        path: &["log_filter"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "CRDB_HARNESS_LOGGING_ANSI",
        path: &["logging", "ansi"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "CRDB_HARNESS_LOGGING_WITH_TARGET",
        path: &["logging", "with_target"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "CRDB_HARNESS_DIAGNOSTICS_DUMP_HOST_METADATA",
        path: &["diagnostics", "dump_host_metadata"],
        var_type: EnvVarType::Bool,
    },
];

/// Returns the environment variable names recognised by the settings loader.
///
/// Tests use this to clear every `CRDB_HARNESS_*` variable without keeping a
/// hand-maintained list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load harness settings from the process environment.
///
/// `explicit_path`, when given and present on disk, takes priority over every
/// discovered settings file.
///
/// # Errors
///
/// Returns `ConfigError` if a settings file is malformed, a typed environment
/// variable has an invalid value, or the layers cannot be merged.
pub fn load_settings(explicit_path: Option<&Utf8Path>) -> Result<HarnessSettings> {
    load_settings_with_env(&DefaultEnv::new(), explicit_path)
}

/// Load harness settings using `env` for environment lookups.
///
/// # Errors
///
/// Same conditions as [`load_settings`].
pub fn load_settings_with_env<E: Env>(
    env: &E,
    explicit_path: Option<&Utf8Path>,
) -> Result<HarnessSettings> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(HarnessSettings::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = settings_file(env, explicit_path) {
        load_settings_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let mut settings = HarnessSettings::merge_from_layers(composer.layers())
        .map_err(ConfigError::OrthoConfig)?;
    settings.normalise();

    Ok(settings)
}

/// Pick the settings file to load, if any.
fn settings_file<E: Env>(env: &E, explicit_path: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    explicit_path
        .map(Utf8Path::to_path_buf)
        .or_else(|| env.string(CONFIG_PATH_ENV_VAR).map(Utf8PathBuf::from))
        .filter(|path| path.exists())
        .or_else(|| {
            let discovery = ConfigDiscovery::builder("crdb-harness")
                .env_var(CONFIG_PATH_ENV_VAR)
                .config_file_name("config.toml")
                .dotfile_name(".crdb-harness.toml")
                .build();
            discovery
                .candidates()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Utf8PathBuf::try_from(p).ok())
        })
}

/// Read a TOML settings file through `cap_std` and push it to the composer.
fn load_settings_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Collect `CRDB_HARNESS_*` variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a boolean variable does not parse.
fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}
