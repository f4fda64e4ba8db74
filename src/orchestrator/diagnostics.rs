//! Per-run record of every step, injection and observed failure.
//!
//! Failures that the orchestrator contains (cleanup errors, rejected
//! injections, test failures it hands back) would otherwise only be visible
//! in the log. Recording them here keeps them inspectable by the host and by
//! tests.

use crate::inject::InjectionOutcome;
use crate::observer::ObservedFailure;

/// Which half of a step ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `Step::set_up`.
    SetUp,
    /// `Step::clean_up`.
    CleanUp,
}

/// Result of a single step invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step returned `Ok`.
    Succeeded,
    /// The step returned an error.
    Failed {
        /// The error, including its cause chain.
        message: String,
    },
}

/// One step invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step's name.
    pub step: String,
    /// Which half ran.
    pub phase: Phase,
    /// How it ended.
    pub status: StepStatus,
}

impl StepOutcome {
    /// Return whether the invocation failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, StepStatus::Failed { .. })
    }
}

/// One injection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionRecord {
    /// Name of the test instance.
    pub instance: String,
    /// What happened.
    pub outcome: InjectionOutcome,
}

/// Everything the orchestrator did during one run, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunDiagnostics {
    steps: Vec<StepOutcome>,
    injections: Vec<InjectionRecord>,
    failures: Vec<ObservedFailure>,
}

impl RunDiagnostics {
    pub(super) fn record_step(
        &mut self,
        step: &str,
        phase: Phase,
        result: &eyre::Result<()>,
    ) -> StepOutcome {
        let status = match result {
            Ok(()) => StepStatus::Succeeded,
            Err(report) => StepStatus::Failed {
                message: format!("{report:#}"),
            },
        };
        let outcome = StepOutcome {
            step: String::from(step),
            phase,
            status,
        };
        self.steps.push(outcome.clone());
        outcome
    }

    pub(super) fn record_injection(&mut self, instance: String, outcome: InjectionOutcome) {
        self.injections.push(InjectionRecord { instance, outcome });
    }

    pub(super) fn record_failure(&mut self, failure: ObservedFailure) {
        self.failures.push(failure);
    }

    /// Every step invocation in execution order.
    #[must_use]
    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    /// Names of the steps whose `set_up` ran, in order.
    #[must_use]
    pub fn setup_order(&self) -> Vec<&str> {
        self.names_in(Phase::SetUp)
    }

    /// Names of the steps whose `clean_up` ran, in order.
    #[must_use]
    pub fn cleanup_order(&self) -> Vec<&str> {
        self.names_in(Phase::CleanUp)
    }

    /// Cleanup invocations that failed.
    pub fn cleanup_failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps
            .iter()
            .filter(|outcome| outcome.phase == Phase::CleanUp && outcome.is_failure())
    }

    /// Every injection attempt in order.
    #[must_use]
    pub fn injections(&self) -> &[InjectionRecord] {
        &self.injections
    }

    /// Every observed test failure in order.
    #[must_use]
    pub fn observed_failures(&self) -> &[ObservedFailure] {
        &self.failures
    }

    fn names_in(&self, phase: Phase) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|outcome| outcome.phase == phase)
            .map(|outcome| outcome.step.as_str())
            .collect()
    }
}

/// Summary returned by `after_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownSummary {
    /// Number of steps whose `clean_up` ran.
    pub cleaned: usize,
    /// Cleanup invocations that failed and were contained.
    pub failures: Vec<StepOutcome>,
}

impl TeardownSummary {
    /// Return whether every cleanup step succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
