//! Setup/cleanup steps and the ordered registry that runs them.
//!
//! Provisioning is split into narrow steps (start the node, wait for
//! readiness, capture metadata, bootstrap a schema) so each can be replaced
//! or reordered on its own. Teardown is derived mechanically: the registry is
//! reversed once, in place, before cleanup starts.

use std::fmt;
use std::sync::Arc;

use crate::context::ContextStore;
use crate::error::LifecycleError;

/// A unit of provisioning work with a matching undo action.
///
/// `C` is the declarative configuration of the test group. Steps receive it
/// unchanged from the orchestrator, which never inspects it.
pub trait Step<C>: Send + Sync {
    /// Name used in log output and diagnostics.
    ///
    /// Defaults to the implementing type's name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Perform the provisioning action.
    ///
    /// # Errors
    ///
    /// Any error stops the remaining setup steps and fails the group.
    fn set_up(&self, store: &mut ContextStore, config: &C) -> eyre::Result<()>;

    /// Undo the provisioning action.
    ///
    /// Called even when `set_up` failed part-way, so implementations must
    /// tolerate partially created state.
    ///
    /// # Errors
    ///
    /// Errors are logged and recorded but never propagated.
    fn clean_up(&self, store: &mut ContextStore, config: &C) -> eyre::Result<()>;
}

/// Fixed, shareable ordering that new registries are copied from.
pub struct Baseline<C> {
    steps: Arc<[Arc<dyn Step<C>>]>,
}

impl<C> Baseline<C> {
    /// Create a baseline from an ordered list of steps.
    #[must_use]
    pub fn new(steps: Vec<Arc<dyn Step<C>>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// A baseline with no steps.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Return the number of baseline steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return whether the baseline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<C> Clone for Baseline<C> {
    fn clone(&self) -> Self {
        Self {
            steps: Arc::clone(&self.steps),
        }
    }
}

impl<C> Default for Baseline<C> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Direction the registry is currently ordered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrder {
    /// Setup order, as built from the baseline and insertions.
    Forward,
    /// Cleanup order, after [`StepRegistry::reverse_for_cleanup`].
    Reversed,
}

/// Ordered sequence of steps owned by a single orchestrator.
pub struct StepRegistry<C> {
    steps: Vec<Arc<dyn Step<C>>>,
    order: StepOrder,
}

impl<C> StepRegistry<C> {
    /// Copy-initialise a registry from `baseline`.
    ///
    /// Later insertions affect only this registry, never the baseline.
    #[must_use]
    pub fn from_baseline(baseline: &Baseline<C>) -> Self {
        Self {
            steps: baseline.steps.to_vec(),
            order: StepOrder::Forward,
        }
    }

    /// Append a step after every registered step.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyReversed`] once cleanup order has
    /// been established.
    pub fn push(&mut self, step: Arc<dyn Step<C>>) -> Result<(), LifecycleError> {
        self.ensure_forward()?;
        self.steps.push(step);
        Ok(())
    }

    /// Insert a step at `index`, shifting later steps back.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IndexOutOfBounds`] when `index` exceeds the
    /// number of registered steps, or [`LifecycleError::AlreadyReversed`]
    /// once cleanup order has been established.
    pub fn insert(&mut self, index: usize, step: Arc<dyn Step<C>>) -> Result<(), LifecycleError> {
        self.ensure_forward()?;
        if index > self.steps.len() {
            return Err(LifecycleError::IndexOutOfBounds {
                index,
                len: self.steps.len(),
            });
        }
        self.steps.insert(index, step);
        Ok(())
    }

    /// Insert a step directly before the first step named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownStep`] when no step carries `name`,
    /// or [`LifecycleError::AlreadyReversed`] once cleanup order has been
    /// established.
    pub fn insert_before(&mut self, name: &str, step: Arc<dyn Step<C>>) -> Result<(), LifecycleError> {
        self.ensure_forward()?;
        let index = self.position(name).ok_or_else(|| LifecycleError::UnknownStep {
            name: String::from(name),
        })?;
        self.steps.insert(index, step);
        Ok(())
    }

    /// Reverse the registry in place so iteration yields cleanup order.
    ///
    /// This is a one-way transition: a registry can be reversed once.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyReversed`] on a second call.
    pub fn reverse_for_cleanup(&mut self) -> Result<(), LifecycleError> {
        self.ensure_forward()?;
        self.steps.reverse();
        self.order = StepOrder::Reversed;
        Ok(())
    }

    /// Return the current order.
    #[must_use]
    pub const fn order(&self) -> StepOrder {
        self.order
    }

    /// Iterate over the steps in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Step<C>>> {
        self.steps.iter()
    }

    /// Return step names in their current order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.steps.iter().map(|step| String::from(step.name())).collect()
    }

    /// Return the number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return whether no steps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name() == name)
    }

    const fn ensure_forward(&self) -> Result<(), LifecycleError> {
        match self.order {
            StepOrder::Forward => Ok(()),
            StepOrder::Reversed => Err(LifecycleError::AlreadyReversed),
        }
    }
}

impl<C> fmt::Debug for StepRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.names())
            .field("order", &self.order)
            .finish()
    }
}
