//! Lifecycle orchestration for a test group.
//!
//! An [`Orchestrator`] is built once per test group. The host drives it
//! through the four [`GroupCallbacks`] hooks: `before_all` runs every step's
//! setup in registry order, `post_process_test_instance` hands each new test
//! instance the process details, `handle_test_execution_error` observes test
//! failures, and `after_all` reverses the registry and runs cleanup.
//!
//! Orchestrators are single-use. Once `after_all` has run the orchestrator is
//! [`LifecycleState::Done`] and every further hook call fails with
//! [`LifecycleError::InvalidTransition`].

mod diagnostics;
mod state;

use std::marker::PhantomData;

use tracing::{debug, error, info, warn};

pub use diagnostics::{
    InjectionRecord, Phase, RunDiagnostics, StepOutcome, StepStatus, TeardownSummary,
};
pub use state::{Hook, LifecycleState};

use crate::config::{ConfigResolver, HarnessSettings, TestGroup};
use crate::context::ExecutionContext;
use crate::error::{LifecycleError, Result};
use crate::host::{HostMetadataSource, SystemHostMetadata};
use crate::inject::{CapabilityInjector, InjectionOutcome, TestInstance};
use crate::observer::{ExceptionObserver, TestFailure};
use crate::step::{Baseline, StepRegistry};

/// Lifecycle hooks a host test runner invokes for one test group.
///
/// Expected call sequence: `before_all` once, then any interleaving of
/// `post_process_test_instance` and `handle_test_execution_error`, then
/// `after_all` once, even when `before_all` failed or a step panicked.
pub trait GroupCallbacks {
    /// Run setup for the group.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::SetupFailed`] when a step fails, or
    /// [`LifecycleError::InvalidTransition`] when called more than once.
    fn before_all(&mut self, context: &mut ExecutionContext) -> Result<()>;

    /// Run cleanup for the group.
    ///
    /// Cleanup failures are contained and reported in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] when `before_all` has not
    /// run or cleanup already ran.
    ///
    /// Accepted while setup is still marked running: a panicking `set_up`
    /// unwinds out of `before_all` and leaves that state behind.
    fn after_all(&mut self, context: &mut ExecutionContext) -> Result<TeardownSummary>;

    /// Offer process details to a freshly constructed test instance.
    fn post_process_test_instance(
        &mut self,
        instance: &mut dyn TestInstance,
        context: &ExecutionContext,
    ) -> InjectionOutcome;

    /// Observe a failure raised by a test and hand it back unchanged.
    ///
    /// # Errors
    ///
    /// Always returns `failure` in `Err`; the orchestrator never suppresses a
    /// test failure.
    fn handle_test_execution_error(
        &mut self,
        context: &ExecutionContext,
        test: &str,
        failure: TestFailure,
    ) -> std::result::Result<(), TestFailure>;
}

/// Builds an [`Orchestrator`] for the test group `G`.
pub struct OrchestratorBuilder<G: TestGroup> {
    baseline: Baseline<G::Config>,
    host_metadata: Box<dyn HostMetadataSource>,
    dump_host_metadata: bool,
    _group: PhantomData<fn() -> G>,
}

impl<G: TestGroup> OrchestratorBuilder<G> {
    /// Start a builder with an empty baseline and default diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            baseline: Baseline::empty(),
            host_metadata: Box::new(SystemHostMetadata),
            dump_host_metadata: true,
            _group: PhantomData,
        }
    }

    /// Copy the registry from `baseline` when building.
    #[must_use]
    pub fn baseline(mut self, baseline: Baseline<G::Config>) -> Self {
        self.baseline = baseline;
        self
    }

    /// Apply harness settings.
    #[must_use]
    pub fn settings(mut self, settings: &HarnessSettings) -> Self {
        self.dump_host_metadata = settings.diagnostics.dump_host_metadata;
        self
    }

    /// Replace the host metadata source used for the bootstrap dump.
    #[must_use]
    pub fn host_metadata(mut self, source: impl HostMetadataSource + 'static) -> Self {
        self.host_metadata = Box::new(source);
        self
    }

    /// Resolve the group's configuration and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDeclaration`](crate::error::ConfigError::MissingDeclaration)
    /// when `G` declares no configuration. No step runs in that case.
    pub fn build(self) -> Result<Orchestrator<G::Config>> {
        let config = ConfigResolver::resolve::<G>()?;

        Ok(Orchestrator {
            config,
            registry: StepRegistry::from_baseline(&self.baseline),
            state: LifecycleState::Uninitialized,
            attempted: 0,
            diagnostics: RunDiagnostics::default(),
            host_metadata: self.dump_host_metadata.then_some(self.host_metadata),
        })
    }
}

impl<G: TestGroup> Default for OrchestratorBuilder<G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a test group's steps around its tests. Single-use.
pub struct Orchestrator<C> {
    config: C,
    registry: StepRegistry<C>,
    state: LifecycleState,
    attempted: usize,
    diagnostics: RunDiagnostics,
    host_metadata: Option<Box<dyn HostMetadataSource>>,
}

impl<C> Orchestrator<C> {
    /// Start building an orchestrator for the test group `G`.
    #[must_use]
    pub fn builder<G: TestGroup<Config = C>>() -> OrchestratorBuilder<G> {
        OrchestratorBuilder::new()
    }

    /// Return the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Return the resolved group configuration.
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Return the step registry in its current order.
    #[must_use]
    pub const fn steps(&self) -> &StepRegistry<C> {
        &self.registry
    }

    /// Mutable access to the registry, for insertions before setup.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] once `before_all` has
    /// been invoked.
    pub fn steps_mut(&mut self) -> std::result::Result<&mut StepRegistry<C>, LifecycleError> {
        self.ensure_permits(Hook::ModifySteps)?;
        Ok(&mut self.registry)
    }

    /// Return everything recorded during this run.
    #[must_use]
    pub const fn diagnostics(&self) -> &RunDiagnostics {
        &self.diagnostics
    }

    const fn ensure_permits(&self, hook: Hook) -> std::result::Result<(), LifecycleError> {
        if self.state.permits(hook) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                hook,
                state: self.state,
            })
        }
    }

    fn dump_host_metadata(&self) {
        if let Some(source) = &self.host_metadata {
            debug!("Host O/S metadata:\n{}", source.describe());
        }
    }
}

impl<C> GroupCallbacks for Orchestrator<C> {
    fn before_all(&mut self, context: &mut ExecutionContext) -> Result<()> {
        self.ensure_permits(Hook::BeforeAll)?;
        info!(group = context.display_name(), "bootstrapping test group");
        self.dump_host_metadata();

        self.state = LifecycleState::SetupRunning;
        for step in self.registry.iter() {
            let name = step.name();
            debug!(step = name, "running step setup");

            self.attempted += 1;
            let result = step.set_up(context.store_mut(), &self.config);
            self.diagnostics.record_step(name, Phase::SetUp, &result);

            if let Err(report) = result {
                let message = format!("{report:#}");
                error!(step = name, error = %message, "step setup failed");
                self.state = LifecycleState::SetupFailed;
                return Err(LifecycleError::SetupFailed {
                    step: String::from(name),
                    message,
                }
                .into());
            }
        }

        self.state = LifecycleState::Ready;
        Ok(())
    }

    fn after_all(&mut self, context: &mut ExecutionContext) -> Result<TeardownSummary> {
        self.ensure_permits(Hook::AfterAll)?;
        info!(group = context.display_name(), "tearing down test group");

        self.state = LifecycleState::TeardownRunning;
        self.registry.reverse_for_cleanup()?;

        // Steps after a failed setup never ran, and now sit at the front.
        let never_ran = self.registry.len().saturating_sub(self.attempted);
        let mut summary = TeardownSummary {
            cleaned: 0,
            failures: Vec::new(),
        };

        for step in self.registry.iter().skip(never_ran) {
            let name = step.name();
            debug!(step = name, "running step cleanup");

            let result = step.clean_up(context.store_mut(), &self.config);
            let outcome = self.diagnostics.record_step(name, Phase::CleanUp, &result);
            summary.cleaned += 1;

            if let StepStatus::Failed { message } = &outcome.status {
                warn!(step = name, error = %message, "step cleanup failed");
                summary.failures.push(outcome);
            }
        }

        self.state = LifecycleState::Done;
        Ok(summary)
    }

    fn post_process_test_instance(
        &mut self,
        instance: &mut dyn TestInstance,
        context: &ExecutionContext,
    ) -> InjectionOutcome {
        let name = String::from(instance.instance_name());
        let outcome = CapabilityInjector::inject(context.store(), instance);
        self.diagnostics.record_injection(name, outcome.clone());
        outcome
    }

    fn handle_test_execution_error(
        &mut self,
        context: &ExecutionContext,
        test: &str,
        failure: TestFailure,
    ) -> std::result::Result<(), TestFailure> {
        let observed = ExceptionObserver::observe(context.display_name(), test, failure.as_ref());
        self.diagnostics.record_failure(observed);
        Err(failure)
    }
}
