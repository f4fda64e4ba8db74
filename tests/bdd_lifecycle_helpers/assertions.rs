//! Assertion helpers for lifecycle behavioural tests.

use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{LifecycleRun, LifecycleScenario, TeardownSnapshot};

fn journal_phase(lifecycle_scenario: &LifecycleScenario, phase: &str) -> StepResult<Vec<String>> {
    let journal = lifecycle_scenario
        .journal
        .get()
        .ok_or_else(|| String::from("journal should be set"))?;
    let prefix = format!("{phase}:");
    Ok(journal
        .iter()
        .filter_map(|entry| entry.strip_prefix(&prefix).map(String::from))
        .collect())
}

fn expected_names(names: &str) -> Vec<String> {
    names.split(',').map(|name| String::from(name.trim())).collect()
}

fn completed(lifecycle_scenario: &LifecycleScenario) -> StepResult<(Option<String>, TeardownSnapshot)> {
    match lifecycle_scenario.run.get() {
        Some(LifecycleRun::Completed {
            failed_step,
            teardown,
        }) => Ok((failed_step, teardown)),
        Some(LifecycleRun::Rejected(message)) => {
            Err(format!("expected a completed run, got rejection: {message}"))
        }
        None => Err(String::from("run should be set")),
    }
}

#[then("setup ran {names}")]
fn setup_ran(lifecycle_scenario: &LifecycleScenario, names: String) -> StepResult<()> {
    let actual = journal_phase(lifecycle_scenario, "set_up")?;
    let expected = expected_names(&names);
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected setup order {expected:?}, got {actual:?}"))
    }
}

#[then("cleanup ran {names}")]
fn cleanup_ran(lifecycle_scenario: &LifecycleScenario, names: String) -> StepResult<()> {
    let actual = journal_phase(lifecycle_scenario, "clean_up")?;
    let expected = expected_names(&names);
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected cleanup order {expected:?}, got {actual:?}"))
    }
}

#[then("setup failed at step {step}")]
fn setup_failed_at(lifecycle_scenario: &LifecycleScenario, step: String) -> StepResult<()> {
    match completed(lifecycle_scenario)? {
        (Some(failed), _) if failed == step => Ok(()),
        (Some(failed), _) => Err(format!("expected setup to fail at {step}, failed at {failed}")),
        (None, _) => Err(format!("expected setup to fail at {step}, but it succeeded")),
    }
}

#[then("teardown reported no failures")]
fn teardown_clean(lifecycle_scenario: &LifecycleScenario) -> StepResult<()> {
    let (_, teardown) = completed(lifecycle_scenario)?;
    if teardown.failed_steps.is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected cleanup failures: {:?}", teardown.failed_steps))
    }
}

#[then("teardown reported a failure for step {step}")]
fn teardown_failure_for(lifecycle_scenario: &LifecycleScenario, step: String) -> StepResult<()> {
    let (_, teardown) = completed(lifecycle_scenario)?;
    if teardown.failed_steps == [step.clone()] && teardown.cleaned > 1 {
        Ok(())
    } else {
        Err(format!(
            "expected a single cleanup failure for {step}, got {:?} after {} cleanups",
            teardown.failed_steps, teardown.cleaned
        ))
    }
}

#[then("the group is rejected for missing configuration")]
fn rejected_for_missing_configuration(lifecycle_scenario: &LifecycleScenario) -> StepResult<()> {
    match lifecycle_scenario.run.get() {
        Some(LifecycleRun::Rejected(message))
            if message.starts_with("expected declarative cluster configuration") =>
        {
            Ok(())
        }
        Some(other) => Err(format!("expected a missing configuration rejection, got {other:?}")),
        None => Err(String::from("run should be set")),
    }
}

#[then("no step ran")]
fn no_step_ran(lifecycle_scenario: &LifecycleScenario) -> StepResult<()> {
    let journal = lifecycle_scenario
        .journal
        .get()
        .ok_or_else(|| String::from("journal should be set"))?;
    if journal.is_empty() {
        Ok(())
    } else {
        Err(format!("expected no step invocations, got {journal:?}"))
    }
}
