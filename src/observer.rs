//! Observation of uncaught test failures.

use std::error::Error;

use tracing::error;

/// Boxed failure raised by a test body.
pub type TestFailure = Box<dyn Error + Send + Sync + 'static>;

/// A test failure seen by the observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedFailure {
    /// Name of the failing test.
    pub test: String,
    /// Rendered failure message.
    pub message: String,
}

/// Logs test failures without ever swallowing them.
pub struct ExceptionObserver;

impl ExceptionObserver {
    /// Log `failure` and return a record of it.
    ///
    /// The failure itself is only borrowed; the caller keeps ownership and
    /// hands it back to the host unchanged. The recorded message carries the
    /// whole `source()` chain, joined with `: `.
    pub fn observe(group: &str, test: &str, failure: &(dyn Error + 'static)) -> ObservedFailure {
        let message = render_chain(failure);
        error!(group, test, error = failure, "test execution error");
        ObservedFailure {
            test: String::from(test),
            message,
        }
    }
}

fn render_chain(failure: &(dyn Error + 'static)) -> String {
    let mut message = failure.to_string();
    let mut cause = failure.source();
    while let Some(source) = cause {
        message.push_str(": ");
        message.push_str(&source.to_string());
        cause = source.source();
    }
    message
}
