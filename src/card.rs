//! Static card definitions and their abilities.
//!
//! A [`CardDefinition`] is the immutable, registry-owned description shared
//! by every instance of a card: printed stats, keywords, abilities and (for
//! modal events) modes. Definitions are built programmatically through
//! [`CardDefinitionBuilder`] for type safety.

use std::collections::HashSet;

use crate::effect::Effect;
use crate::ids::DefinitionId;
use crate::types::{CardType, Guild, Keyword};

/// When an ability resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityTiming {
    /// Activated by the controller as an action, paying a mythium cost.
    Activated { cost: u32 },
    /// Resolves when the card is played.
    OnPlay,
    /// Resolves during the controller's rally sequence.
    Rally,
}

/// How an ability resolves: a primitive effect list applied in declaration
/// order, or a named procedural resolver for effects the vocabulary cannot
/// express compositionally.
#[derive(Debug, Clone, PartialEq)]
pub enum AbilityResolve {
    Effects(Vec<Effect>),
    Custom(String),
}

/// One ability on a card definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    pub timing: AbilityTiming,
    pub resolve: AbilityResolve,
    /// Display text for the presentation layer.
    pub text: Option<String>,
}

impl Ability {
    pub fn activated(cost: u32, effects: Vec<Effect>) -> Self {
        Self {
            timing: AbilityTiming::Activated { cost },
            resolve: AbilityResolve::Effects(effects),
            text: None,
        }
    }

    pub fn activated_custom(cost: u32, key: impl Into<String>) -> Self {
        Self {
            timing: AbilityTiming::Activated { cost },
            resolve: AbilityResolve::Custom(key.into()),
            text: None,
        }
    }

    pub fn on_play(effects: Vec<Effect>) -> Self {
        Self {
            timing: AbilityTiming::OnPlay,
            resolve: AbilityResolve::Effects(effects),
            text: None,
        }
    }

    pub fn on_play_custom(key: impl Into<String>) -> Self {
        Self {
            timing: AbilityTiming::OnPlay,
            resolve: AbilityResolve::Custom(key.into()),
            text: None,
        }
    }

    pub fn rally(effects: Vec<Effect>) -> Self {
        Self {
            timing: AbilityTiming::Rally,
            resolve: AbilityResolve::Effects(effects),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// The mythium cost to activate, if this is an activated ability.
    pub fn activation_cost(&self) -> Option<u32> {
        match self.timing {
            AbilityTiming::Activated { cost } => Some(cost),
            _ => None,
        }
    }
}

/// One mode of a modal event card.
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub name: String,
    pub effects: Vec<Effect>,
}

impl Mode {
    pub fn new(name: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            name: name.into(),
            effects,
        }
    }
}

/// Static, immutable card definition shared by all instances of a card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDefinition {
    pub id: DefinitionId,
    pub name: String,
    pub card_type: CardType,
    pub guild: Guild,
    /// Mythium cost to play from hand. Worldbreakers are never played and
    /// carry a cost of zero.
    pub cost: u32,
    /// Base strength, present on followers.
    pub strength: Option<i32>,
    /// Base health, present on followers.
    pub health: Option<i32>,
    /// Stage counters a location enters the board with.
    pub stage_count: Option<u32>,
    /// Guild standing the player must hold to play this card.
    pub standing_requirement: Option<(Guild, u32)>,
    pub keywords: HashSet<Keyword>,
    /// Ordered ability list; ability indices index into this.
    pub abilities: Vec<Ability>,
    /// Modes of a modal event card; empty for everything else.
    pub modes: Vec<Mode>,
}

impl CardDefinition {
    pub fn is_follower(&self) -> bool {
        self.card_type == CardType::Follower
    }

    pub fn is_location(&self) -> bool {
        self.card_type == CardType::Location
    }

    pub fn is_event(&self) -> bool {
        self.card_type == CardType::Event
    }

    pub fn is_worldbreaker(&self) -> bool {
        self.card_type == CardType::Worldbreaker
    }

    pub fn is_modal(&self) -> bool {
        !self.modes.is_empty()
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Abilities with the given timing, paired with their indices.
    pub fn abilities_with_timing(
        &self,
        timing: fn(&AbilityTiming) -> bool,
    ) -> impl Iterator<Item = (usize, &Ability)> {
        self.abilities
            .iter()
            .enumerate()
            .filter(move |(_, ability)| timing(&ability.timing))
    }
}

/// Builder for card definitions.
#[derive(Debug, Clone)]
pub struct CardDefinitionBuilder {
    definition: CardDefinition,
}

impl CardDefinitionBuilder {
    pub fn new(
        id: DefinitionId,
        name: impl Into<String>,
        card_type: CardType,
        guild: Guild,
    ) -> Self {
        Self {
            definition: CardDefinition {
                id,
                name: name.into(),
                card_type,
                guild,
                cost: 0,
                strength: None,
                health: None,
                stage_count: None,
                standing_requirement: None,
                keywords: HashSet::new(),
                abilities: Vec::new(),
                modes: Vec::new(),
            },
        }
    }

    pub fn cost(mut self, cost: u32) -> Self {
        self.definition.cost = cost;
        self
    }

    pub fn stats(mut self, strength: i32, health: i32) -> Self {
        self.definition.strength = Some(strength);
        self.definition.health = Some(health);
        self
    }

    pub fn stages(mut self, count: u32) -> Self {
        self.definition.stage_count = Some(count);
        self
    }

    pub fn standing(mut self, guild: Guild, required: u32) -> Self {
        self.definition.standing_requirement = Some((guild, required));
        self
    }

    pub fn keyword(mut self, keyword: Keyword) -> Self {
        self.definition.keywords.insert(keyword);
        self
    }

    pub fn ability(mut self, ability: Ability) -> Self {
        self.definition.abilities.push(ability);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.definition.modes.push(mode);
        self
    }

    pub fn build(self) -> CardDefinition {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_complete_definition() {
        let definition = CardDefinitionBuilder::new(
            DefinitionId(1),
            "Test Follower",
            CardType::Follower,
            Guild::Ember,
        )
        .cost(2)
        .stats(3, 2)
        .keyword(Keyword::Bloodshed)
        .standing(Guild::Ember, 1)
        .build();

        assert_eq!(definition.name, "Test Follower");
        assert_eq!(definition.cost, 2);
        assert_eq!(definition.strength, Some(3));
        assert_eq!(definition.health, Some(2));
        assert!(definition.has_keyword(Keyword::Bloodshed));
        assert_eq!(definition.standing_requirement, Some((Guild::Ember, 1)));
        assert!(definition.is_follower());
        assert!(!definition.is_modal());
    }

    #[test]
    fn activation_cost_only_on_activated_abilities() {
        let activated = Ability::activated(2, vec![]);
        let rally = Ability::rally(vec![]);
        assert_eq!(activated.activation_cost(), Some(2));
        assert_eq!(rally.activation_cost(), None);
    }
}
