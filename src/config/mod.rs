//! Scoped configuration store
//!
//! All components communicate through a layered key/value store instead of
//! passing parameters directly. A value is addressed by `(scope, section, key)`
//! where the scope determines its lifetime: `Global` values live for the whole
//! process, `Benchmark` values for one track, `TrackSetup` values for one
//! setup iteration. Reads resolve from the most specific scope outward, so a
//! per-setup value shadows a global default without mutating it.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RaceError, Result};

/// Configuration layer with a defined lifetime, ordered by decreasing lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Seeded once at process start, never cleared
    Global,
    /// Lives for the duration of one track's setups
    Benchmark,
    /// Lives for one track-setup iteration
    TrackSetup,
}

impl Scope {
    /// Resolution order for reads: most specific scope first
    const RESOLUTION: [Scope; 3] = [Scope::TrackSetup, Scope::Benchmark, Scope::Global];

    fn index(self) -> usize {
        match self {
            Scope::Global => 0,
            Scope::Benchmark => 1,
            Scope::TrackSetup => 2,
        }
    }
}

/// A configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean flag
    Bool(bool),
    /// Plain string
    Str(String),
    /// List of strings
    List(Vec<String>),
}

impl ConfigValue {
    /// The contained string, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The contained boolean, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The contained list, if this is a list value
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Str(s) => write!(f, "{s}"),
            ConfigValue::List(l) => write!(f, "{}", l.join(", ")),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::List(value)
    }
}

impl From<&Path> for ConfigValue {
    fn from(value: &Path) -> Self {
        ConfigValue::Str(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for ConfigValue {
    fn from(value: PathBuf) -> Self {
        ConfigValue::from(value.as_path())
    }
}

/// Layered configuration store with scope-shadowed reads
#[derive(Debug, Default)]
pub struct ConfigStore {
    layers: [HashMap<(String, String), ConfigValue>; 3],
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value at an explicit scope, overwriting any previous value
    /// at that scope. Other scopes are never affected.
    pub fn set(
        &mut self,
        scope: Scope,
        section: &str,
        key: &str,
        value: impl Into<ConfigValue>,
    ) {
        self.layers[scope.index()].insert((section.to_owned(), key.to_owned()), value.into());
    }

    /// Clear every value in one scope layer.
    ///
    /// Called at the start of each track (Benchmark) and each track-setup
    /// iteration (TrackSetup) so stale values never leak into the next run.
    pub fn reset(&mut self, scope: Scope) {
        self.layers[scope.index()].clear();
    }

    /// Resolve a value, searching from the most specific active scope
    /// outward to `Global`; the first match wins.
    pub fn get_opt(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        let lookup = (section.to_owned(), key.to_owned());
        Scope::RESOLUTION
            .iter()
            .find_map(|scope| self.layers[scope.index()].get(&lookup))
    }

    /// Mandatory resolve; fails with `ConfigMissing` when no scope has the key
    pub fn get(&self, section: &str, key: &str) -> Result<&ConfigValue> {
        self.get_opt(section, key)
            .ok_or_else(|| RaceError::ConfigMissing {
                section: section.to_owned(),
                key: key.to_owned(),
            })
    }

    /// Mandatory string value
    pub fn get_str(&self, section: &str, key: &str) -> Result<String> {
        self.get(section, key)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| type_error(section, key, "string"))
    }

    /// Optional string value
    pub fn get_str_opt(&self, section: &str, key: &str) -> Result<Option<String>> {
        match self.get_opt(section, key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_owned()))
                .ok_or_else(|| type_error(section, key, "string")),
        }
    }

    /// Mandatory boolean value
    pub fn get_bool(&self, section: &str, key: &str) -> Result<bool> {
        self.get(section, key)?
            .as_bool()
            .ok_or_else(|| type_error(section, key, "boolean"))
    }

    /// Mandatory list value
    pub fn get_list(&self, section: &str, key: &str) -> Result<Vec<String>> {
        self.get(section, key)?
            .as_list()
            .map(<[String]>::to_vec)
            .ok_or_else(|| type_error(section, key, "list"))
    }

    /// Optional list value
    pub fn get_list_opt(&self, section: &str, key: &str) -> Result<Option<Vec<String>>> {
        match self.get_opt(section, key) {
            None => Ok(None),
            Some(value) => value
                .as_list()
                .map(|l| Some(l.to_vec()))
                .ok_or_else(|| type_error(section, key, "list")),
        }
    }
}

fn type_error(section: &str, key: &str, expected: &'static str) -> RaceError {
    RaceError::ConfigType {
        section: section.to_owned(),
        key: key.to_owned(),
        expected,
    }
}
