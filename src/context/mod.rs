//! Per-run shared state for steps and test instances.
//!
//! A [`ContextStore`] maps `(namespace, key)` pairs to type-erased values. It
//! lives exactly as long as the [`ExecutionContext`] that owns it, which the
//! host creates when a test group starts and drops when the group ends. Two
//! independent executions never share a store.
//!
//! Steps agree on well-known keys under [`Namespace::GLOBAL`]; for example
//! the step that starts the database publishes its
//! [`ProcessDetails`](crate::details::ProcessDetails) there.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::ContextError;

type Entry = Box<dyn Any + Send + Sync>;

/// Partition of the context store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(Cow<'static, str>);

impl Namespace {
    /// The execution-wide namespace shared by every step and the injector.
    pub const GLOBAL: Self = Self(Cow::Borrowed("global"));

    /// Create a namespace with the given name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Return the namespace name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespaced, type-erased key-value store scoped to one test-group run.
///
/// The store does not enforce types beyond what the caller asks for: a lookup
/// names the expected type and fails with [`ContextError::InvalidEntry`] when
/// the stored value has a different one.
#[derive(Default)]
pub struct ContextStore {
    entries: HashMap<Namespace, HashMap<String, Entry>>,
}

impl ContextStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn put<V>(&mut self, namespace: &Namespace, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.entries
            .entry(namespace.clone())
            .or_default()
            .insert(key.into(), Box::new(value));
    }

    /// Borrow the value stored under `key` as a `V`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingEntry`] when nothing was stored under
    /// `key`, or [`ContextError::InvalidEntry`] when the value is not a `V`.
    pub fn get<V: Any>(&self, namespace: &Namespace, key: &str) -> Result<&V, ContextError> {
        let entry = self
            .entries
            .get(namespace)
            .and_then(|values| values.get(key))
            .ok_or_else(|| missing(namespace, key))?;

        entry
            .downcast_ref::<V>()
            .ok_or_else(|| invalid::<V>(namespace, key))
    }

    /// Mutably borrow the value stored under `key` as a `V`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::get`].
    pub fn get_mut<V: Any>(
        &mut self,
        namespace: &Namespace,
        key: &str,
    ) -> Result<&mut V, ContextError> {
        let entry = self
            .entries
            .get_mut(namespace)
            .and_then(|values| values.get_mut(key))
            .ok_or_else(|| missing(namespace, key))?;

        entry
            .downcast_mut::<V>()
            .ok_or_else(|| invalid::<V>(namespace, key))
    }

    /// Remove and return the value stored under `key`.
    ///
    /// A type mismatch leaves the entry in place.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::get`].
    pub fn take<V: Any>(&mut self, namespace: &Namespace, key: &str) -> Result<V, ContextError> {
        let values = self
            .entries
            .get_mut(namespace)
            .ok_or_else(|| missing(namespace, key))?;

        if !values.get(key).is_some_and(|entry| entry.is::<V>()) {
            return Err(if values.contains_key(key) {
                invalid::<V>(namespace, key)
            } else {
                missing(namespace, key)
            });
        }

        values
            .remove(key)
            .and_then(|entry| entry.downcast::<V>().ok())
            .map(|boxed| *boxed)
            .ok_or_else(|| missing(namespace, key))
    }

    /// Return whether any value is stored under `key`.
    #[must_use]
    pub fn contains(&self, namespace: &Namespace, key: &str) -> bool {
        self.entries
            .get(namespace)
            .is_some_and(|values| values.contains_key(key))
    }

    /// Return the number of stored entries across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Return whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (namespace, values) in &self.entries {
            for key in values.keys() {
                map.entry(&format_args!("{namespace}/{key}"), &"..");
            }
        }
        map.finish()
    }
}

fn missing(namespace: &Namespace, key: &str) -> ContextError {
    ContextError::MissingEntry {
        namespace: namespace.to_string(),
        key: String::from(key),
    }
}

fn invalid<V>(namespace: &Namespace, key: &str) -> ContextError {
    ContextError::InvalidEntry {
        namespace: namespace.to_string(),
        key: String::from(key),
        expected: type_name::<V>(),
    }
}

/// Per-run execution handle passed to every lifecycle hook.
///
/// Carries the group display name used in log output and the shared store.
#[derive(Debug)]
pub struct ExecutionContext {
    display_name: String,
    store: ContextStore,
}

impl ExecutionContext {
    /// Create a fresh execution with an empty store.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            store: ContextStore::new(),
        }
    }

    /// Return the human-readable name of the test group.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Borrow the shared store.
    #[must_use]
    pub const fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Mutably borrow the shared store.
    pub const fn store_mut(&mut self) -> &mut ContextStore {
        &mut self.store
    }
}
