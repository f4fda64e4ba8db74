//! Lifecycle states and hooks.

use std::fmt;

/// Lifecycle hooks the host invokes on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Runs setup steps before the group's tests.
    BeforeAll,
    /// Runs cleanup steps after the group's tests.
    AfterAll,
    /// Registry mutation, only allowed before setup.
    ModifySteps,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeAll => "before_all",
            Self::AfterAll => "after_all",
            Self::ModifySteps => "step registration",
        })
    }
}

/// Where an orchestrator is in its single-use lifecycle.
///
/// ```text
/// Uninitialized -> SetupRunning -> Ready -------> TeardownRunning -> Done
///                       |      \-> SetupFailed -/        ^
///                       \----------------------------------/
/// ```
///
/// The direct edge from `SetupRunning` covers a `set_up` that panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built, no hook invoked yet.
    Uninitialized,
    /// Setup steps are running, or a step panicked part-way through.
    SetupRunning,
    /// Every setup step succeeded; tests may run.
    Ready,
    /// A setup step failed; only cleanup remains.
    SetupFailed,
    /// Cleanup steps are running.
    TeardownRunning,
    /// Cleanup finished. Terminal.
    Done,
}

impl LifecycleState {
    pub(super) const fn permits(self, hook: Hook) -> bool {
        matches!(
            (hook, self),
            (Hook::BeforeAll | Hook::ModifySteps, Self::Uninitialized)
                | (
                    Hook::AfterAll,
                    Self::SetupRunning | Self::Ready | Self::SetupFailed
                )
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::SetupRunning => "running setup",
            Self::Ready => "ready",
            Self::SetupFailed => "setup failed",
            Self::TeardownRunning => "running teardown",
            Self::Done => "done",
        })
    }
}
