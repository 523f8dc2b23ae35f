//! Process-wide card catalog.
//!
//! The registry is an explicit value constructed per process or test run and
//! injected into the engine, never ambient global state, so independent
//! rule-sets and parallel test runs cannot cross-contaminate.

use std::collections::HashMap;

use crate::card::CardDefinition;
use crate::error::InternalError;
use crate::ids::DefinitionId;

/// Catalog mapping a definition id to immutable card metadata.
#[derive(Debug, Clone, Default)]
pub struct CardRegistry {
    definitions: HashMap<DefinitionId, CardDefinition>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Registers a definition. Registering an id twice is an error; silent
    /// redefinition of live content is never allowed.
    pub fn register(&mut self, definition: CardDefinition) -> Result<(), InternalError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(InternalError::DuplicateDefinition(definition.id));
        }
        self.definitions.insert(definition.id, definition);
        Ok(())
    }

    /// Looks up a definition. All ids reaching the engine originate from
    /// validated decks, so an unknown id is an internal error, not user input.
    pub fn get(&self, id: DefinitionId) -> Result<&CardDefinition, InternalError> {
        self.definitions
            .get(&id)
            .ok_or(InternalError::UnknownDefinition(id))
    }

    pub fn contains(&self, id: DefinitionId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Removes every definition. Exists for test isolation between
    /// independent rule-sets.
    pub fn clear(&mut self) {
        self.definitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardDefinitionBuilder;
    use crate::types::{CardType, Guild};

    fn sample(id: u32) -> CardDefinition {
        CardDefinitionBuilder::new(
            DefinitionId(id),
            "Sample",
            CardType::Follower,
            Guild::Thorn,
        )
        .cost(1)
        .stats(1, 1)
        .build()
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = CardRegistry::new();
        registry.register(sample(1)).unwrap();
        assert_eq!(registry.get(DefinitionId(1)).unwrap().name, "Sample");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = CardRegistry::new();
        registry.register(sample(1)).unwrap();
        assert_eq!(
            registry.register(sample(1)),
            Err(InternalError::DuplicateDefinition(DefinitionId(1)))
        );
    }

    #[test]
    fn unknown_lookup_fails() {
        let registry = CardRegistry::new();
        assert_eq!(
            registry.get(DefinitionId(9)).unwrap_err(),
            InternalError::UnknownDefinition(DefinitionId(9))
        );
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = CardRegistry::new();
        registry.register(sample(1)).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        // The id is free again after a clear.
        registry.register(sample(1)).unwrap();
    }
}
