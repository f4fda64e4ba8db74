//! Declarative configuration attached to test-group types.

use std::any::type_name;

use crate::error::ConfigError;

/// A test group that may carry declarative cluster configuration.
///
/// Implemented on the type that groups related tests. The configuration
/// describes the desired database topology; the harness passes it through to
/// every step without looking inside.
///
/// ```ignore
/// struct AccountRepositoryTest;
///
/// impl TestGroup for AccountRepositoryTest {
///     type Config = ClusterSpec;
///
///     fn declared_config() -> Option<ClusterSpec> {
///         Some(ClusterSpec::single_node("v24.1"))
///     }
/// }
/// ```
pub trait TestGroup {
    /// The declarative configuration type understood by the group's steps.
    type Config;

    /// Return the configuration declared for this group, if any.
    fn declared_config() -> Option<Self::Config>;
}

/// Locates the declarative configuration of a test group.
pub struct ConfigResolver;

impl ConfigResolver {
    /// Resolve the configuration declared on `G`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDeclaration`] naming `G` when the group
    /// declares no configuration.
    pub fn resolve<G: TestGroup>() -> Result<G::Config, ConfigError> {
        G::declared_config().ok_or_else(|| ConfigError::MissingDeclaration {
            group: String::from(type_name::<G>()),
        })
    }
}
