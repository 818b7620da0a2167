//! Environment variable lookup seam
//!
//! The inventory source reads `DNAC_*` variables from its process
//! environment. Lookups go through [`EnvLookup`] so a rendered injector
//! environment (or a plain map in tests) can stand in for the real one.

use std::collections::{BTreeMap, HashMap};

/// Source of environment variables
pub trait EnvLookup {
    /// Value of `name`, if set
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvLookup + ?Sized> EnvLookup for &T {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}
