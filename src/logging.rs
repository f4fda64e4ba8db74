//! Process-wide log subscriber setup.
//!
//! Initialisation belongs to process startup, not to any one test group. The
//! first subscriber installed wins: later calls to [`init`] leave it in place,
//! as does a subscriber the host installed itself.

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::HarnessSettings;

const DEFAULT_FILTER: &str = "info";

/// An explicit filter that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RejectedFilter {
    directives: String,
    reason: String,
}

/// Build the filter from settings, then `RUST_LOG`, then `info`.
///
/// An unparseable settings filter falls through to the next source and is
/// returned so the caller can report it once a subscriber exists.
fn build_filter(settings: &HarnessSettings) -> (EnvFilter, Option<RejectedFilter>) {
    let mut rejected = None;
    let explicit = settings.log_filter.as_deref().and_then(|directives| {
        EnvFilter::try_new(directives)
            .map_err(|error| {
                rejected = Some(RejectedFilter {
                    directives: String::from(directives),
                    reason: error.to_string(),
                });
            })
            .ok()
    });

    let filter = explicit
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));
    (filter, rejected)
}

/// Install a `fmt` subscriber configured from `settings`.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one keeps receiving events.
pub fn init(settings: &HarnessSettings) -> bool {
    let (filter, rejected) = build_filter(settings);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.logging.ansi)
        .with_target(settings.logging.with_target)
        .try_init()
        .is_ok();

    if let Some(RejectedFilter { directives, reason }) = rejected {
        warn!(
            log_filter = %directives,
            error = %reason,
            "ignoring invalid log filter; falling back to RUST_LOG or info"
        );
    }
    installed
}
