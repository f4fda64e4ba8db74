//! Lifecycle orchestration for test groups backed by a CockroachDB process.
//!
//! `crdb-harness` runs an ordered list of provisioning steps before a group
//! of tests and undoes them in reverse afterwards. Steps share a per-group
//! context store, which is how the step that starts the node publishes the
//! connection details that later steps and the tests themselves consume.
//!
//! # Lifecycle
//!
//! A host test runner builds one [`orchestrator::Orchestrator`] per group and
//! drives it through [`orchestrator::GroupCallbacks`]:
//!
//! 1. `before_all` runs every step's setup in registry order and stops at the
//!    first failure.
//! 2. `post_process_test_instance` offers the published
//!    [`details::ProcessDetails`] to each test instance that opts in.
//! 3. `handle_test_execution_error` logs test failures and hands them back.
//! 4. `after_all` reverses the registry and runs cleanup for every step whose
//!    setup was attempted, continuing past cleanup failures.
//!
//! # Modules
//!
//! - [`config`]: Group configuration lookup and layered harness settings
//! - [`context`]: Namespaced key/value store shared by steps
//! - [`details`]: Connection details published by the node-starting step
//! - [`error`]: Semantic error types for the harness
//! - [`host`]: Host operating-system metadata for troubleshooting
//! - [`inject`]: Best-effort hand-off of details to test instances
//! - [`logging`]: `tracing` subscriber installation
//! - [`observer`]: Observation of test failures
//! - [`orchestrator`]: The lifecycle state machine
//! - [`step`]: Steps, baselines and the ordered step registry

pub mod config;
pub mod context;
pub mod details;
pub mod error;
pub mod host;
pub mod inject;
pub mod logging;
pub mod observer;
pub mod orchestrator;
pub mod step;
