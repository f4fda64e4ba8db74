//! Given/when steps for lifecycle scenarios.

use std::sync::{Arc, Mutex, PoisonError};

use crdb_harness::config::{DiagnosticsSettings, HarnessSettings, TestGroup};
use crdb_harness::context::{ContextStore, ExecutionContext};
use crdb_harness::error::{HarnessError, LifecycleError};
use crdb_harness::orchestrator::{GroupCallbacks, Orchestrator};
use crdb_harness::step::{Baseline, Step};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::{LifecycleRun, LifecycleScenario, TeardownSnapshot};

/// Declarative cluster shape handed to every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClusterSpec {
    pub(crate) nodes: u8,
}

struct DeclaredGroup;

impl TestGroup for DeclaredGroup {
    type Config = ClusterSpec;

    fn declared_config() -> Option<ClusterSpec> {
        Some(ClusterSpec { nodes: 1 })
    }
}

struct UndeclaredGroup;

impl TestGroup for UndeclaredGroup {
    type Config = ClusterSpec;

    fn declared_config() -> Option<ClusterSpec> {
        None
    }
}

type Journal = Arc<Mutex<Vec<String>>>;

struct JournalStep {
    name: String,
    journal: Journal,
    fail_setup: bool,
    fail_cleanup: bool,
}

impl JournalStep {
    fn record(&self, phase: &str) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{phase}:{}", self.name));
    }
}

impl Step<ClusterSpec> for JournalStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_up(&self, _store: &mut ContextStore, config: &ClusterSpec) -> eyre::Result<()> {
        self.record("set_up");
        eyre::ensure!(config.nodes == 1, "unexpected topology {config:?}");
        if self.fail_setup {
            eyre::bail!("{} failed to start", self.name);
        }
        Ok(())
    }

    fn clean_up(&self, _store: &mut ContextStore, _config: &ClusterSpec) -> eyre::Result<()> {
        self.record("clean_up");
        if self.fail_cleanup {
            eyre::bail!("{} failed to stop", self.name);
        }
        Ok(())
    }
}

fn split_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

#[given("a test group declaring a single-node cluster")]
fn declaring_group(lifecycle_scenario: &LifecycleScenario) {
    lifecycle_scenario.declared.set(true);
}

#[given("a test group without declared configuration")]
fn undeclared_group(lifecycle_scenario: &LifecycleScenario) {
    lifecycle_scenario.declared.set(false);
}

#[given("the registered steps are {names}")]
fn registered_steps(lifecycle_scenario: &LifecycleScenario, names: String) {
    lifecycle_scenario.step_names.set(split_names(&names));
}

#[given("step {step} fails during setup")]
fn step_fails_setup(lifecycle_scenario: &LifecycleScenario, step: String) {
    lifecycle_scenario.failing_setup.set(step);
}

#[given("step {step} fails during cleanup")]
fn step_fails_cleanup(lifecycle_scenario: &LifecycleScenario, step: String) {
    lifecycle_scenario.failing_cleanup.set(step);
}

#[given("step {step} is inserted before {anchor}")]
fn step_inserted(lifecycle_scenario: &LifecycleScenario, step: String, anchor: String) {
    lifecycle_scenario.insertion.set((step, anchor));
}

fn make_step(lifecycle_scenario: &LifecycleScenario, name: &str, journal: &Journal) -> JournalStep {
    JournalStep {
        name: String::from(name),
        journal: Arc::clone(journal),
        fail_setup: lifecycle_scenario.failing_setup.get().as_deref() == Some(name),
        fail_cleanup: lifecycle_scenario.failing_cleanup.get().as_deref() == Some(name),
    }
}

fn build<G: TestGroup<Config = ClusterSpec>>(
    baseline: Baseline<ClusterSpec>,
) -> crdb_harness::error::Result<Orchestrator<ClusterSpec>> {
    let settings = HarnessSettings {
        diagnostics: DiagnosticsSettings {
            dump_host_metadata: false,
        },
        ..HarnessSettings::default()
    };
    Orchestrator::builder::<G>()
        .baseline(baseline)
        .settings(&settings)
        .build()
}

#[when("the group lifecycle runs")]
fn lifecycle_runs(lifecycle_scenario: &LifecycleScenario) -> StepResult<()> {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let steps: Vec<Arc<dyn Step<ClusterSpec>>> = lifecycle_scenario
        .step_names
        .get()
        .unwrap_or_default()
        .iter()
        .map(|name| {
            Arc::new(make_step(lifecycle_scenario, name, &journal)) as Arc<dyn Step<ClusterSpec>>
        })
        .collect();
    let baseline = Baseline::new(steps);

    let built = if lifecycle_scenario.declared.get().unwrap_or(true) {
        build::<DeclaredGroup>(baseline)
    } else {
        build::<UndeclaredGroup>(baseline)
    };

    let run = match built {
        Ok(mut orchestrator) => {
            if let Some((step, anchor)) = lifecycle_scenario.insertion.get() {
                let inserted = make_step(lifecycle_scenario, &step, &journal);
                orchestrator
                    .steps_mut()
                    .and_then(|registry| registry.insert_before(&anchor, Arc::new(inserted)))
                    .map_err(|error| format!("insertion failed: {error}"))?;
            }
            run_hooks(&mut orchestrator)?
        }
        Err(error) => LifecycleRun::Rejected(error.to_string()),
    };

    let entries = journal
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    lifecycle_scenario.journal.set(entries);
    lifecycle_scenario.run.set(run);
    Ok(())
}

fn run_hooks(orchestrator: &mut Orchestrator<ClusterSpec>) -> StepResult<LifecycleRun> {
    let mut context = ExecutionContext::new("LifecycleScenario");

    let failed_step = match orchestrator.before_all(&mut context) {
        Ok(()) => None,
        Err(HarnessError::Lifecycle(LifecycleError::SetupFailed { step, .. })) => Some(step),
        Err(other) => return Err(format!("unexpected before_all error: {other}")),
    };

    let summary = orchestrator
        .after_all(&mut context)
        .map_err(|error| format!("after_all failed: {error}"))?;

    Ok(LifecycleRun::Completed {
        failed_step,
        teardown: TeardownSnapshot {
            cleaned: summary.cleaned,
            failed_steps: summary
                .failures
                .into_iter()
                .map(|outcome| outcome.step)
                .collect(),
        },
    })
}
