use std::any::type_name;

use crate::{
    errors::ResolveError,
    identifier::{Identifier, Injectable},
    types::{downcast_instance, Instance, Service},
};

/// Dependencies declared by name, see [declare_service](crate::declare_service)
///
/// Resolution order is insertion order. Adding a name twice replaces the
/// earlier dependency in place.
#[derive(Default, Clone)]
pub struct NamedDependencies {
    entries: Vec<(String, Identifier)>,
}

impl NamedDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, dependency: impl Injectable) -> Self {
        let name = name.into();
        let identifier = dependency.identifier();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = identifier,
            None => self.entries.push((name, identifier)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Splits into names and identifiers, both in declared order
    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Identifier>) {
        self.entries.into_iter().unzip()
    }
}

/// Values handed to a named factory, keyed like the [NamedDependencies] it was declared with
pub struct ResolvedDependencies {
    values: Vec<(String, Instance)>,
}

impl ResolvedDependencies {
    pub(crate) fn new(names: &[String], instances: Vec<Instance>) -> Self {
        Self {
            values: names.iter().cloned().zip(instances).collect(),
        }
    }

    /// Try to access a resolved dependency by name
    pub fn try_get<T: Service>(&self, name: &str) -> Result<T, ResolveError> {
        let instance = self
            .values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, instance)| instance)
            .ok_or_else(|| ResolveError::UnknownDependency(name.to_string()))?;

        downcast_instance(Some(instance))
    }

    /// Access a resolved dependency by name
    ///
    /// # Panics
    /// - If `name` was not declared
    /// - If the dependency does not resolve to a `T`
    pub fn get<T: Service>(&self, name: &str) -> T {
        match self.try_get(name) {
            Ok(value) => value,
            Err(err) => panic!(
                "Named dependency '{name}' could not be read as '{}': {err}",
                type_name::<T>()
            ),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}
