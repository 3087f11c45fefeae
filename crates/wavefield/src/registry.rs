//! Explicit material table.
//!
//! Nothing registers itself on load. The host builds a [`MaterialRegistry`],
//! calls [`register_builtin_materials`] once during start-up, and from then on
//! instantiates programs by name. Every instantiation runs the factory again,
//! so each material owns freshly copied defaults.

use std::collections::BTreeMap;

use crate::program::{ShadingProgram, WaveProgram};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("material '{0}' is already registered")]
    Duplicate(String),
    #[error("unknown material '{0}'")]
    Unknown(String),
}

type Factory = Box<dyn Fn() -> Box<dyn ShadingProgram> + Send + Sync>;

#[derive(Default)]
pub struct MaterialRegistry {
    factories: BTreeMap<String, Factory>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named factory. Names are unique.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn ShadingProgram> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        tracing::debug!(material = name, "registered shading program");
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn instantiate(&self, name: &str) -> Result<Box<dyn ShadingProgram>, RegistryError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for MaterialRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialRegistry")
            .field("materials", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registers the materials shipped with this crate.
pub fn register_builtin_materials(registry: &mut MaterialRegistry) -> Result<(), RegistryError> {
    registry.register(WaveProgram::NAME, || Box::new(WaveProgram::default()))
}
