//! A set of loaded packages keyed by package name

use crate::config::{Config, Section, parse};
use crate::error::UciError;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use tracing::debug;

/// Loaded configurations; each package name may be loaded once.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigStore {
    configs: IndexMap<String, Config>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `input` and adds it under its package name, or `name` when the
    /// text has no `package` statement.
    pub fn load(&mut self, name: &str, input: &str) -> Result<&Config, UciError> {
        let config = parse(name, input)?;
        self.add(name, config)
    }

    /// Adds an already parsed configuration.
    pub fn add(&mut self, name: &str, mut config: Config) -> Result<&Config, UciError> {
        let key = config.name.clone().unwrap_or_else(|| name.to_string());
        match self.configs.entry(key) {
            Entry::Occupied(entry) => Err(UciError::ConfigAlreadyLoaded {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(name = %entry.key(), sections = config.len(), "loaded config");
                config.name = Some(entry.key().clone());
                Ok(&*entry.insert(config))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Config> {
        self.configs.get(name)
    }

    /// Type-checked section lookup across the store
    pub fn section_typed(
        &self,
        config: &str,
        section: &str,
        want: &str,
    ) -> Result<Option<&Section>, UciError> {
        match self.configs.get(config) {
            Some(found) => found.get_typed(section, want),
            None => Ok(None),
        }
    }

    /// Removes a configuration so its name can be loaded again
    pub fn unload(&mut self, name: &str) -> Option<Config> {
        self.configs.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
