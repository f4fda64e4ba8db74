//! Semantic error types for the test-group harness.
//!
//! This module defines the error hierarchy for `crdb-harness`, following the
//! principle of using semantic error enums (via `thiserror`) for conditions
//! the host runner might inspect or report, while step and capability
//! implementations stay free to return opaque `eyre::Report` values that are
//! flattened into these enums at the orchestration boundary.

use std::sync::Arc;

use thiserror::Error;

use crate::orchestrator::{Hook, LifecycleState};

/// Errors that can occur while resolving or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The test group carries no declarative cluster configuration.
    #[error("expected declarative cluster configuration for test group {group}")]
    MissingDeclaration {
        /// Fully qualified name of the offending test-group type.
        group: String,
    },

    /// A settings file could not be read or parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A settings value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised by the shared context store.
#[derive(Debug, Error)]
pub enum ContextError {
    /// No value was ever stored under the requested key.
    #[error("missing context entry '{key}' in namespace '{namespace}'")]
    MissingEntry {
        /// The namespace that was searched.
        namespace: String,
        /// The key that was requested.
        key: String,
    },

    /// A value exists but is not of the requested type.
    #[error("invalid context entry '{key}' in namespace '{namespace}': expected {expected}")]
    InvalidEntry {
        /// The namespace that was searched.
        namespace: String,
        /// The key that was requested.
        key: String,
        /// The type name the caller asked for.
        expected: &'static str,
    },
}

/// Errors raised by the orchestrator lifecycle and its step registry.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A lifecycle hook was invoked from a state that does not permit it.
    #[error("cannot run {hook} while orchestrator is {state}")]
    InvalidTransition {
        /// The hook that was invoked.
        hook: Hook,
        /// The state the orchestrator was in.
        state: LifecycleState,
    },

    /// A step failed during setup; no further setup steps were run.
    #[error("setup step '{step}' failed: {message}")]
    SetupFailed {
        /// The name of the failing step.
        step: String,
        /// The failure reported by the step, including its cause chain.
        message: String,
    },

    /// The registry has already been reversed for cleanup.
    #[error("step registry is already in cleanup order")]
    AlreadyReversed,

    /// An insertion index lies beyond the end of the registry.
    #[error("cannot insert step at index {index}: registry holds {len} steps")]
    IndexOutOfBounds {
        /// The requested insertion index.
        index: usize,
        /// The number of steps currently registered.
        len: usize,
    },

    /// No registered step carries the requested name.
    #[error("no registered step named '{name}'")]
    UnknownStep {
        /// The name that was looked up.
        name: String,
    },
}

/// Top-level error type for the harness.
///
/// Aggregates the domain-specific errors into a single type that the host
/// runner can report. Hosts that prefer opaque reporting convert it into an
/// `eyre::Report`.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// An error occurred while resolving or loading configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while accessing the shared context store.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// An error occurred while driving the group lifecycle.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// A specialised `Result` type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
