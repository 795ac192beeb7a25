//! Capability registry
//!
//! Descriptors are partitioned by [`CapabilityKind`]. Each partition keeps
//! declaration order for listings and a name index for lookups. The registry
//! is populated once at startup and only read afterwards.

use std::collections::HashMap;

use tracing::debug;

use crate::capability::{CapabilityDescriptor, CapabilityKind};
use crate::error::RegistryError;

#[derive(Debug, Default)]
struct Partition {
    entries: Vec<CapabilityDescriptor>,
    by_name: HashMap<String, usize>,
}

/// Read-mostly map from `(kind, name)` to descriptor
#[derive(Debug, Default)]
pub struct Registry {
    tools: Partition,
    prompts: Partition,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a startup catalog, in iteration order
    ///
    /// Fails on the first duplicate.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = CapabilityDescriptor>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Store a descriptor
    ///
    /// An existing descriptor with the same kind and name is left untouched.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Result<(), RegistryError> {
        let kind = descriptor.kind();
        let partition = self.partition_mut(kind);

        if partition.by_name.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateName {
                kind,
                name: descriptor.name().to_string(),
            });
        }

        debug!(%kind, name = descriptor.name(), "registered capability");

        partition
            .by_name
            .insert(descriptor.name().to_string(), partition.entries.len());
        partition.entries.push(descriptor);
        Ok(())
    }

    /// Find a descriptor by kind and name
    pub fn lookup(&self, kind: CapabilityKind, name: &str) -> Result<&CapabilityDescriptor, RegistryError> {
        let partition = self.partition(kind);
        partition
            .by_name
            .get(name)
            .map(|&index| &partition.entries[index])
            .ok_or_else(|| RegistryError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        self.partition(kind).by_name.contains_key(name)
    }

    /// All descriptors of a kind, in registration order
    pub fn list(&self, kind: CapabilityKind) -> &[CapabilityDescriptor] {
        &self.partition(kind).entries
    }

    /// Total number of registered capabilities
    pub fn len(&self) -> usize {
        self.tools.entries.len() + self.prompts.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn partition(&self, kind: CapabilityKind) -> &Partition {
        match kind {
            CapabilityKind::Tool => &self.tools,
            CapabilityKind::Prompt => &self.prompts,
        }
    }

    fn partition_mut(&mut self, kind: CapabilityKind) -> &mut Partition {
        match kind {
            CapabilityKind::Tool => &mut self.tools,
            CapabilityKind::Prompt => &mut self.prompts,
        }
    }
}
