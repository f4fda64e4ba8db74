//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use mockable::MockEnv;
use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::HarnessSettings;

/// Fixture providing `HarnessSettings` parsed from a full TOML example.
#[fixture]
pub fn settings_from_full_toml() -> HarnessSettings {
    let toml = r#"
        log_filter = "crdb_harness=debug,info"

        [logging]
        ansi = false
        with_target = false

        [diagnostics]
        dump_host_metadata = false
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing `HarnessSettings` parsed from a partial TOML example.
#[fixture]
pub fn settings_from_partial_toml() -> HarnessSettings {
    let toml = r#"
        [logging]
        ansi = false
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a `MockEnv` that returns `None` for every variable.
#[fixture]
pub fn empty_env() -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(|_| None);
    env
}

/// Helper: Creates a `MockEnv` answering from a fixed table of variables.
pub fn env_with_vars(mappings: &'static [(&'static str, &'static str)]) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(move |key| {
        mappings
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| String::from(*value))
    });
    env
}

/// Helper: Creates a `MergeComposer` with the defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(HarnessSettings::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `HarnessSettings`.
pub fn merge_settings(
    composer: MergeComposer,
) -> Result<HarnessSettings, Arc<ortho_config::OrthoError>> {
    HarnessSettings::merge_from_layers(composer.layers())
}

/// Helper: Asserts that settings carry every default value.
pub fn assert_settings_have_defaults(settings: &HarnessSettings) {
    assert!(settings.log_filter.is_none(), "log_filter should be None");
    assert!(settings.logging.ansi, "logging.ansi should be true");
    assert!(
        settings.logging.with_target,
        "logging.with_target should be true"
    );
    assert!(
        settings.diagnostics.dump_host_metadata,
        "diagnostics.dump_host_metadata should be true"
    );
}
