//! Name → factory registries for designs and test cases
//!
//! A [`Registry`] maps names to factories and builds a fresh instance on every
//! [`construct`](Registry::construct) call. The process-wide registries are
//! built lazily on first access by running an ordered provider list, so there
//! is no dependence on static initialisation order and each provider sees an
//! explicit `&mut` registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::designs::register_designs;
use crate::device::Device;
use crate::testcase::{register_test_cases, TestCase};

/// Factory producing a fresh boxed instance
pub type Factory<T> = Box<dyn Fn() -> Box<T> + Send + Sync>;

/// Named factories for one kind of object
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    factories: BTreeMap<String, Factory<T>>,
}

/// Registry of devices under test
pub type DesignRegistry = Registry<dyn Device>;

/// Registry of test-case strategies
pub type TestCaseRegistry = Registry<dyn TestCase>;

/// Populates a design registry
pub type DesignProvider = fn(&mut DesignRegistry);

/// Populates a test-case registry
pub type TestCaseProvider = fn(&mut TestCaseRegistry);

/// Providers run, in order, to build [`design_registry`]
pub const DESIGN_PROVIDERS: &[DesignProvider] = &[register_designs];

/// Providers run, in order, to build [`test_case_registry`]
pub const TEST_CASE_PROVIDERS: &[TestCaseProvider] = &[register_test_cases];

impl<T: ?Sized> Registry<T> {
    /// Empty registry; `kind` names the entries in log output.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: BTreeMap::new(),
        }
    }

    /// Build a registry by running every provider in order.
    pub fn from_providers(kind: &'static str, providers: &[fn(&mut Self)]) -> Self {
        let mut registry = Self::new(kind);
        for provider in providers {
            provider(&mut registry);
        }
        tracing::debug!(kind, entries = registry.len(), "registry populated");
        registry
    }

    /// Register `factory` under `name`.
    ///
    /// Returns `false` and keeps the existing entry when `name` is taken.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            tracing::warn!(kind = self.kind, name = %name, "duplicate registration ignored");
            return false;
        }
        self.factories.insert(name, Box::new(factory));
        true
    }

    /// Fresh instance of `name`, or `None` when unregistered.
    pub fn construct(&self, name: &str) -> Option<Box<T>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

static DESIGNS: LazyLock<DesignRegistry> =
    LazyLock::new(|| Registry::from_providers("design", DESIGN_PROVIDERS));

static TEST_CASES: LazyLock<TestCaseRegistry> =
    LazyLock::new(|| Registry::from_providers("test case", TEST_CASE_PROVIDERS));

/// Process-wide design registry
pub fn design_registry() -> &'static DesignRegistry {
    &DESIGNS
}

/// Process-wide test-case registry
pub fn test_case_registry() -> &'static TestCaseRegistry {
    &TEST_CASES
}
