//! Assertion helpers for injection behavioural tests.

use crdb_harness::inject::InjectionOutcome;
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{HandedBack, InjectionScenario};

fn outcome(injection_scenario: &InjectionScenario) -> StepResult<InjectionOutcome> {
    injection_scenario
        .outcome
        .get()
        .ok_or_else(|| String::from("injection outcome should be set"))
}

fn handed_back(injection_scenario: &InjectionScenario) -> StepResult<HandedBack> {
    injection_scenario
        .handed_back
        .get()
        .ok_or_else(|| String::from("handed back failure should be set"))
}

#[then("the instance received details for {address}")]
fn received_details(injection_scenario: &InjectionScenario, address: String) -> StepResult<()> {
    match injection_scenario.received.get() {
        Some(Some(received)) if received == address => Ok(()),
        Some(Some(received)) => Err(format!("expected details for {address}, got {received}")),
        Some(None) => Err(format!("expected details for {address}, got none")),
        None => Err(String::from("the instance was never offered details")),
    }
}

#[then("the instance received no details")]
fn received_no_details(injection_scenario: &InjectionScenario) -> StepResult<()> {
    match injection_scenario.received.get() {
        Some(None) => Ok(()),
        Some(Some(received)) => Err(format!("expected no details, got {received}")),
        None => Err(String::from("the instance was never offered details")),
    }
}

#[then("the injection outcome is injected")]
fn outcome_is_injected(injection_scenario: &InjectionScenario) -> StepResult<()> {
    match outcome(injection_scenario)? {
        InjectionOutcome::Injected { .. } => Ok(()),
        other => Err(format!("expected Injected, got {other:?}")),
    }
}

#[then("the injection outcome is unsupported")]
fn outcome_is_unsupported(injection_scenario: &InjectionScenario) -> StepResult<()> {
    match outcome(injection_scenario)? {
        InjectionOutcome::Unsupported => Ok(()),
        other => Err(format!("expected Unsupported, got {other:?}")),
    }
}

#[then("the injection outcome is failed with {expected}")]
fn outcome_is_failed(injection_scenario: &InjectionScenario, expected: String) -> StepResult<()> {
    match outcome(injection_scenario)? {
        InjectionOutcome::Failed { message } if message == expected => Ok(()),
        other => Err(format!("expected Failed with {expected}, got {other:?}")),
    }
}

#[then("the same failure is handed back")]
fn same_failure_handed_back(injection_scenario: &InjectionScenario) -> StepResult<()> {
    let handed_back = handed_back(injection_scenario)?;
    if handed_back.same_allocation {
        Ok(())
    } else {
        Err(format!(
            "expected the original failure back, got a new one: {}",
            handed_back.message
        ))
    }
}

#[then("the failure was observed for the test")]
fn failure_was_observed(injection_scenario: &InjectionScenario) -> StepResult<()> {
    let handed_back = handed_back(injection_scenario)?;
    let expected = vec![(String::from("counts_rows"), handed_back.message.clone())];
    if handed_back.observed == expected {
        Ok(())
    } else {
        Err(format!(
            "expected observations {expected:?}, got {:?}",
            handed_back.observed
        ))
    }
}
