//! The immutable game state snapshot and its construction.
//!
//! A [`GameState`] is replaced wholesale on each accepted action: the engine
//! clones the snapshot at the dispatch boundary, mutates the working copy and
//! returns it, so a rejected action provably leaves the prior snapshot
//! untouched. No state is retained inside the engine between calls; the
//! caller owns and threads the snapshot.

use std::collections::HashMap;

use crate::effect::{Effect, ExpiryTrigger, LastingKind};
use crate::error::{EngineError, InternalError, ValidationError};
use crate::game_event::ChoiceKind;
use crate::ids::{DefinitionId, InstanceId, PlayerId};
use crate::registry::CardRegistry;
use crate::rng;
use crate::types::{CounterKind, Keyword};
use crate::zone::Zone;

/// Cards drawn into each opening hand.
pub const OPENING_HAND_SIZE: usize = 5;
/// Actions per round before the rally phase begins.
pub const ACTIONS_PER_ROUND: u8 = 8;
/// Mythium granted by the `gain_mythium` action.
pub const GAIN_MYTHIUM_AMOUNT: u32 = 1;
/// Mythium cost of buying one guild standing.
pub const STANDING_COST: u32 = 2;
/// Mythium granted to each player during rally.
pub const RALLY_MYTHIUM: u32 = 2;
/// Cards drawn by each player during rally.
pub const RALLY_DRAW: u32 = 1;
/// Power needed to win at the rally victory check.
pub const VICTORY_POWER: u32 = 10;
/// Power granted by an overwhelm trigger.
pub const OVERWHELM_POWER: u32 = 1;
/// Power granted per unblocked attacker.
pub const UNBLOCKED_POWER: u32 = 1;
/// Wounds dealt by a worldbreaker breach.
pub const BREACH_WOUNDS: u32 = 2;

/// The engine's top-level phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Phase {
    /// Players alternate actions.
    Action,
    /// End-of-round sequence: abilities, readying, income, draw.
    Rally,
    /// Terminal; no further transitions are accepted.
    GameOver,
}

/// The outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Winner {
    Player(PlayerId),
    Draw,
}

/// Per-player resources and guild standings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: PlayerId,
    /// Spendable resource for playing cards and abilities.
    pub mythium: u32,
    /// Victory-point resource; first to the threshold wins.
    pub power: u32,
    /// Per-guild standing, gating eligibility to play certain cards.
    pub standings: HashMap<crate::types::Guild, u32>,
}

impl PlayerState {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            mythium: 0,
            power: 0,
            standings: HashMap::new(),
        }
    }

    pub fn standing(&self, guild: crate::types::Guild) -> u32 {
        self.standings.get(&guild).copied().unwrap_or(0)
    }
}

/// A live card: one instance of a registered definition.
///
/// The `definition_id` never changes over an instance's lifetime; only zone,
/// exhaustion, counters and the used-ability list do.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CardInstance {
    pub instance_id: InstanceId,
    pub definition_id: DefinitionId,
    pub owner: PlayerId,
    pub zone: Zone,
    pub exhausted: bool,
    pub counters: HashMap<CounterKind, u32>,
    /// Ability indices already used this rally cycle.
    pub used_abilities: Vec<usize>,
}

impl CardInstance {
    pub fn counter(&self, kind: CounterKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_counter(&mut self, kind: CounterKind, amount: u32) -> u32 {
        let entry = self.counters.entry(kind).or_insert(0);
        *entry += amount;
        *entry
    }

    /// Removes up to `amount` counters; the map entry disappears at zero.
    pub fn remove_counter(&mut self, kind: CounterKind, amount: u32) -> u32 {
        let current = self.counter(kind);
        let remaining = current.saturating_sub(amount);
        if remaining == 0 {
            self.counters.remove(&kind);
        } else {
            self.counters.insert(kind, remaining);
        }
        remaining
    }
}

/// One blocker covering one attacker. Many blockers may cover the same
/// attacker; a blocker covers at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockerAssignment {
    pub blocker: InstanceId,
    pub attacker: InstanceId,
}

/// Combat in progress, from attacker declaration to damage resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Combat {
    /// The attacking player; the opponent declares blockers.
    pub attacker: PlayerId,
    /// Attackers in declaration order.
    pub attackers: Vec<InstanceId>,
    pub blockers: Vec<BlockerAssignment>,
    /// Past this point re-resolution is forbidden.
    pub damage_dealt: bool,
}

impl Combat {
    /// Blockers assigned to one attacker, in assignment order.
    pub fn blockers_of(&self, attacker: InstanceId) -> Vec<InstanceId> {
        self.blockers
            .iter()
            .filter(|a| a.attacker == attacker)
            .map(|a| a.blocker)
            .collect()
    }
}

/// A timed modifier created by an ability and destroyed only by the
/// scheduler's expiry sweep at the matching trigger point.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct LastingEffect {
    pub id: u64,
    pub kind: LastingKind,
    pub targets: Vec<InstanceId>,
    pub expires: ExpiryTrigger,
}

/// A suspended ability resolution: the effects still to apply once the
/// outstanding choice is answered, plus the context to apply them in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAbility {
    pub controller: PlayerId,
    pub source: InstanceId,
    pub triggering: Option<InstanceId>,
    /// Effects not yet applied, in declaration order.
    pub queue: Vec<Effect>,
    /// Whether completing this resolution consumes the controller's turn.
    pub consumes_turn: bool,
}

/// The engine's only cross-call suspension mechanism.
///
/// While non-null, only the designated player's matching choice action is
/// legal; everything else is rejected. Multi-card selections list valid ids
/// in ascending order and responses must do the same.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum PendingChoice {
    /// Pick one mode of a modal event card.
    ChooseMode {
        player: PlayerId,
        source: InstanceId,
        mode_count: usize,
        pending: PendingAbility,
    },
    /// Pick which of the valid cards an effect applies to (1 up to `max`).
    ChooseTarget {
        player: PlayerId,
        valid: Vec<InstanceId>,
        max: u32,
        /// The suspended effect, applied to the chosen ids on resolution.
        effect: Effect,
        pending: PendingAbility,
    },
    /// Pick exactly `count` cards from hand to discard. `remaining` lists
    /// the players still owing a discard afterwards, in fixed player order.
    ChooseDiscard {
        player: PlayerId,
        count: u32,
        valid: Vec<InstanceId>,
        remaining: Vec<(PlayerId, u32)>,
        pending: PendingAbility,
    },
    /// Pick the card a worldbreaker breach wounds.
    ChooseBreachTarget {
        player: PlayerId,
        valid: Vec<InstanceId>,
        amount: u32,
        pending: PendingAbility,
    },
}

impl PendingChoice {
    /// The player whose decision the game is waiting on.
    pub fn player(&self) -> PlayerId {
        match self {
            PendingChoice::ChooseMode { player, .. }
            | PendingChoice::ChooseTarget { player, .. }
            | PendingChoice::ChooseDiscard { player, .. }
            | PendingChoice::ChooseBreachTarget { player, .. } => *player,
        }
    }

    pub fn kind(&self) -> ChoiceKind {
        match self {
            PendingChoice::ChooseMode { .. } => ChoiceKind::ChooseMode,
            PendingChoice::ChooseTarget { .. } => ChoiceKind::ChooseTarget,
            PendingChoice::ChooseDiscard { .. } => ChoiceKind::ChooseDiscard,
            PendingChoice::ChooseBreachTarget { .. } => ChoiceKind::ChooseBreachTarget,
        }
    }

    pub fn pending(&self) -> &PendingAbility {
        match self {
            PendingChoice::ChooseMode { pending, .. }
            | PendingChoice::ChooseTarget { pending, .. }
            | PendingChoice::ChooseDiscard { pending, .. }
            | PendingChoice::ChooseBreachTarget { pending, .. } => pending,
        }
    }
}

/// One player's side of the game configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct DeckConfig {
    /// The player's permanent champion, placed in the worldbreaker zone.
    pub worldbreaker: DefinitionId,
    /// Deck list in authored order; shuffled deterministically at creation.
    pub deck: Vec<DefinitionId>,
}

/// Everything needed to start a game.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub player1: DeckConfig,
    pub player2: DeckConfig,
    pub seed: u64,
}

/// The full game snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Incremented once per accepted action.
    pub version: u64,
    pub phase: Phase,
    pub round: u32,
    /// Actions taken this round, 0..=8.
    pub actions_taken: u8,
    /// Alternation anchor; swapped each round.
    pub first_player: PlayerId,
    pub active_player: PlayerId,
    pub players: [PlayerState; 2],
    /// Every card instance in the game. Relative order of a player's
    /// deck-zone cards is their deck order; the first is the top.
    pub cards: Vec<CardInstance>,
    pub combat: Option<Combat>,
    pub pending_choice: Option<PendingChoice>,
    pub lasting_effects: Vec<LastingEffect>,
    pub winner: Option<Winner>,
    /// Monotonic id source for lasting effects.
    pub next_effect_id: u64,
}

impl GameState {
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    pub fn instance(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.iter().find(|card| card.instance_id == id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.cards.iter_mut().find(|card| card.instance_id == id)
    }

    /// Instance lookup where absence is an engine defect, not user input.
    pub fn instance_or_err(&self, id: InstanceId) -> Result<&CardInstance, EngineError> {
        self.instance(id)
            .ok_or_else(|| InternalError::MissingInstance(id).into())
    }

    /// Instance lookup where absence means the player referenced a bad id.
    pub fn instance_or_reject(&self, id: InstanceId) -> Result<&CardInstance, ValidationError> {
        self.instance(id).ok_or(ValidationError::UnknownCard(id))
    }

    /// Ids of one player's cards in a zone, in card-list order.
    pub fn cards_in_zone(&self, owner: PlayerId, zone: Zone) -> Vec<InstanceId> {
        self.cards
            .iter()
            .filter(|card| card.owner == owner && card.zone == zone)
            .map(|card| card.instance_id)
            .collect()
    }

    /// Ids of all cards in a zone regardless of owner, in card-list order.
    pub fn all_in_zone(&self, zone: Zone) -> Vec<InstanceId> {
        self.cards
            .iter()
            .filter(|card| card.zone == zone)
            .map(|card| card.instance_id)
            .collect()
    }

    /// True when the card carries the keyword, printed or granted by a
    /// lasting effect.
    pub fn has_keyword(
        &self,
        registry: &CardRegistry,
        id: InstanceId,
        keyword: Keyword,
    ) -> Result<bool, EngineError> {
        let instance = self.instance_or_err(id)?;
        let definition = registry.get(instance.definition_id)?;
        if definition.has_keyword(keyword) {
            return Ok(true);
        }
        Ok(self.lasting_effects.iter().any(|effect| {
            effect.kind == LastingKind::GrantKeyword(keyword) && effect.targets.contains(&id)
        }))
    }

    /// Effective strength: base stat plus strength-buff counters plus lasting
    /// modifiers. May be negative; callers floor at zero when dealing damage
    /// or displaying.
    pub fn effective_strength(
        &self,
        registry: &CardRegistry,
        id: InstanceId,
    ) -> Result<i32, EngineError> {
        let instance = self.instance_or_err(id)?;
        let definition = registry.get(instance.definition_id)?;
        let mut strength = definition.strength.unwrap_or(0);
        strength += instance.counter(CounterKind::StrengthBuff) as i32;
        for effect in &self.lasting_effects {
            if let LastingKind::StrengthModifier(amount) = effect.kind
                && effect.targets.contains(&id)
            {
                strength += amount;
            }
        }
        Ok(strength)
    }

    /// Effective health: the base stat. Wounds are tracked as counters and
    /// compared against this in the defeat check, never subtracted here.
    pub fn effective_health(
        &self,
        registry: &CardRegistry,
        id: InstanceId,
    ) -> Result<i32, EngineError> {
        let instance = self.instance_or_err(id)?;
        let definition = registry.get(instance.definition_id)?;
        Ok(definition.health.unwrap_or(0))
    }

    /// A card is defeated exactly when accumulated wounds reach its effective
    /// health. Computed unclamped: a zero-or-negative health card is defeated
    /// at zero wounds.
    pub fn is_defeated(&self, registry: &CardRegistry, id: InstanceId) -> Result<bool, EngineError> {
        let instance = self.instance_or_err(id)?;
        let wounds = instance.counter(CounterKind::Wound) as i64;
        let health = self.effective_health(registry, id)? as i64;
        Ok(wounds >= health)
    }

    /// Drops every lasting effect bound to the given expiry trigger.
    pub fn expire_lasting(&mut self, trigger: ExpiryTrigger) {
        self.lasting_effects
            .retain(|effect| effect.expires != trigger);
    }

    /// Allocates the next lasting-effect id.
    pub fn allocate_effect_id(&mut self) -> u64 {
        let id = self.next_effect_id;
        self.next_effect_id += 1;
        id
    }

    /// The seat whose turn it is after `actions_taken` actions: the first
    /// player on even counts, the opponent on odd.
    pub fn alternation_target(&self) -> PlayerId {
        if self.actions_taken % 2 == 0 {
            self.first_player
        } else {
            self.first_player.opponent()
        }
    }
}

/// Creates the opening snapshot: deterministic shuffle of each deck (player
/// 1's deck consumes the seed stream first), five-card opening hands,
/// worldbreakers placed in their zone, zero resources, round 1, action phase.
pub fn create_game_state(
    registry: &CardRegistry,
    config: &GameConfig,
) -> Result<GameState, EngineError> {
    let mut cards = Vec::new();
    let mut next_instance = 1u32;
    let mut seed = config.seed;

    for player in PlayerId::BOTH {
        let deck_config = match player {
            PlayerId::Player1 => &config.player1,
            PlayerId::Player2 => &config.player2,
        };

        let worldbreaker_def = registry.get(deck_config.worldbreaker)?;
        if !worldbreaker_def.is_worldbreaker() {
            return Err(InternalError::InvalidConfig(format!(
                "{} is not a worldbreaker definition",
                worldbreaker_def.name
            ))
            .into());
        }
        cards.push(new_instance(
            &mut next_instance,
            deck_config.worldbreaker,
            player,
            Zone::Worldbreaker,
        ));

        let mut deck = Vec::new();
        for &definition_id in &deck_config.deck {
            let definition = registry.get(definition_id)?;
            if definition.is_worldbreaker() {
                return Err(InternalError::InvalidConfig(format!(
                    "worldbreaker {} cannot appear in a deck list",
                    definition.name
                ))
                .into());
            }
            deck.push(new_instance(&mut next_instance, definition_id, player, Zone::Deck));
        }
        seed = rng::shuffle(&mut deck, seed);

        for (position, mut card) in deck.into_iter().enumerate() {
            if position < OPENING_HAND_SIZE {
                card.zone = Zone::Hand;
            }
            cards.push(card);
        }
    }

    Ok(GameState {
        version: 0,
        phase: Phase::Action,
        round: 1,
        actions_taken: 0,
        first_player: PlayerId::Player1,
        active_player: PlayerId::Player1,
        players: [
            PlayerState::new(PlayerId::Player1),
            PlayerState::new(PlayerId::Player2),
        ],
        cards,
        combat: None,
        pending_choice: None,
        lasting_effects: Vec::new(),
        winner: None,
        next_effect_id: 1,
    })
}

fn new_instance(
    next_instance: &mut u32,
    definition_id: DefinitionId,
    owner: PlayerId,
    zone: Zone,
) -> CardInstance {
    let instance_id = InstanceId(*next_instance);
    *next_instance += 1;
    CardInstance {
        instance_id,
        definition_id,
        owner,
        zone,
        exhausted: false,
        counters: HashMap::new(),
        used_abilities: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;

    fn setup() -> (CardRegistry, GameConfig) {
        let registry = cards::starter_registry().unwrap();
        (registry, cards::starter_config(11))
    }

    #[test]
    fn creation_is_deterministic() {
        let (registry, config) = setup();
        let a = create_game_state(&registry, &config).unwrap();
        let b = create_game_state(&registry, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_shuffle_differently() {
        let registry = cards::starter_registry().unwrap();
        let a = create_game_state(&registry, &cards::starter_config(1)).unwrap();
        let b = create_game_state(&registry, &cards::starter_config(2)).unwrap();
        let order = |state: &GameState, player| {
            state
                .cards
                .iter()
                .filter(|c| c.owner == player && c.zone != Zone::Worldbreaker)
                .map(|c| c.definition_id)
                .collect::<Vec<_>>()
        };
        assert_ne!(order(&a, PlayerId::Player1), order(&b, PlayerId::Player1));
    }

    #[test]
    fn opening_setup_is_complete() {
        let (registry, config) = setup();
        let state = create_game_state(&registry, &config).unwrap();

        for player in PlayerId::BOTH {
            assert_eq!(state.cards_in_zone(player, Zone::Hand).len(), OPENING_HAND_SIZE);
            assert_eq!(state.cards_in_zone(player, Zone::Worldbreaker).len(), 1);
            assert_eq!(
                state.cards_in_zone(player, Zone::Deck).len(),
                config.player1.deck.len() - OPENING_HAND_SIZE
            );
            assert_eq!(state.player(player).mythium, 0);
            assert_eq!(state.player(player).power, 0);
        }
        assert_eq!(state.phase, Phase::Action);
        assert_eq!(state.round, 1);
        assert_eq!(state.active_player, PlayerId::Player1);
        assert!(state.pending_choice.is_none());
        assert!(state.combat.is_none());
    }

    #[test]
    fn worldbreaker_in_deck_list_is_rejected() {
        let (registry, mut config) = setup();
        config.player2.deck.push(config.player2.worldbreaker);
        let err = create_game_state(&registry, &config).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Internal(InternalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn counters_round_trip() {
        let mut card = new_instance(&mut 1, DefinitionId(1), PlayerId::Player1, Zone::Board);
        assert_eq!(card.counter(CounterKind::Wound), 0);
        assert_eq!(card.add_counter(CounterKind::Wound, 3), 3);
        assert_eq!(card.remove_counter(CounterKind::Wound, 1), 2);
        assert_eq!(card.remove_counter(CounterKind::Wound, 5), 0);
        assert!(!card.counters.contains_key(&CounterKind::Wound));
    }
}
