//! Best-effort hand-off of process details to test instances.
//!
//! Receiving details is an opt-in capability. A test type implements
//! [`TestInstance`] and, if it wants the details, overrides
//! [`TestInstance::as_process_details_aware`] to expose its
//! [`ProcessDetailsAware`] implementation. Types that do not opt in are
//! skipped with an informational log line.

use tracing::info;

use crate::context::ContextStore;
use crate::details::ProcessDetails;

/// Optional capability: accept the running node's connection details.
pub trait ProcessDetailsAware {
    /// Receive the published details, or `None` when no step published them.
    ///
    /// # Errors
    ///
    /// Errors are logged by the injector and never abort the test.
    fn set_process_details(&mut self, details: Option<ProcessDetails>) -> eyre::Result<()>;
}

/// A constructed test instance handed to the injector.
pub trait TestInstance {
    /// Name used in log output.
    fn instance_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Expose the [`ProcessDetailsAware`] capability, if implemented.
    fn as_process_details_aware(&mut self) -> Option<&mut dyn ProcessDetailsAware> {
        None
    }
}

/// Result of one injection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// The instance accepted the details.
    Injected {
        /// Whether details had been published when injection ran.
        details_present: bool,
    },
    /// The instance does not implement the capability.
    Unsupported,
    /// The instance implements the capability but rejected the call.
    Failed {
        /// The error reported by the instance.
        message: String,
    },
}

/// Hands process details from the shared store to test instances.
pub struct CapabilityInjector;

impl CapabilityInjector {
    /// Attempt injection into `instance`.
    ///
    /// Never fails: missing details, a missing capability and a rejected call
    /// are all reported through the returned outcome.
    pub fn inject(store: &ContextStore, instance: &mut dyn TestInstance) -> InjectionOutcome {
        let details = ProcessDetails::lookup(store).ok().cloned();
        let details_present = details.is_some();
        let name = String::from(instance.instance_name());

        let Some(receiver) = instance.as_process_details_aware() else {
            info!(instance = %name, "process details injection skipped: capability not implemented");
            return InjectionOutcome::Unsupported;
        };

        match receiver.set_process_details(details) {
            Ok(()) => InjectionOutcome::Injected { details_present },
            Err(report) => {
                let message = format!("{report:#}");
                info!(instance = %name, error = %message, "process details injection failed");
                InjectionOutcome::Failed { message }
            }
        }
    }
}
