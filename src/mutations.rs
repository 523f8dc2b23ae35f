//! State mutation primitives.
//!
//! Small transforms the resolvers and scheduler are composed from. Each
//! operates on the working copy of the snapshot and appends the events it
//! causes; none of them run cleanup or advance the turn, that is the
//! dispatcher's job.

use crate::error::{EngineError, ValidationError};
use crate::game_event::{GameEvent, Resource};
use crate::game_state::GameState;
use crate::ids::{InstanceId, PlayerId};
use crate::types::{CounterKind, Guild};
use crate::zone::Zone;

/// Adds mythium to a player's pool.
pub fn gain_mythium(
    state: &mut GameState,
    player: PlayerId,
    amount: u32,
    events: &mut Vec<GameEvent>,
) {
    let pool = state.player_mut(player);
    pool.mythium += amount;
    let total = pool.mythium;
    events.push(GameEvent::ResourceGained {
        player,
        resource: Resource::Mythium,
        amount,
        total,
    });
}

/// Spends mythium; rejects without mutating when the pool is short.
pub fn spend_mythium(
    state: &mut GameState,
    player: PlayerId,
    amount: u32,
) -> Result<(), ValidationError> {
    let pool = state.player_mut(player);
    if pool.mythium < amount {
        return Err(ValidationError::InsufficientMythium {
            required: amount,
            available: pool.mythium,
        });
    }
    pool.mythium -= amount;
    Ok(())
}

/// Adds power, the victory-point resource.
pub fn gain_power(
    state: &mut GameState,
    player: PlayerId,
    amount: u32,
    events: &mut Vec<GameEvent>,
) {
    let pool = state.player_mut(player);
    pool.power += amount;
    let total = pool.power;
    events.push(GameEvent::ResourceGained {
        player,
        resource: Resource::Power,
        amount,
        total,
    });
}

/// Raises a player's standing with one guild.
pub fn gain_standing(
    state: &mut GameState,
    player: PlayerId,
    guild: Guild,
    amount: u32,
    events: &mut Vec<GameEvent>,
) {
    let pool = state.player_mut(player);
    let entry = pool.standings.entry(guild).or_insert(0);
    *entry += amount;
    let total = *entry;
    events.push(GameEvent::StandingGained {
        player,
        guild,
        amount,
        total,
    });
}

/// Moves a card to another zone. The transition is atomic: the zone field is
/// the only thing that changes.
pub fn move_card(
    state: &mut GameState,
    id: InstanceId,
    to: Zone,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let card = state
        .instance_mut(id)
        .ok_or(crate::error::InternalError::MissingInstance(id))?;
    let from = card.zone;
    card.zone = to;
    events.push(GameEvent::CardMoved { card: id, from, to });
    Ok(())
}

/// Draws the top deck card into its owner's hand. A draw from an empty deck
/// is a silent no-op, returning `None`.
pub fn draw_card(
    state: &mut GameState,
    player: PlayerId,
    events: &mut Vec<GameEvent>,
) -> Option<InstanceId> {
    let top = state
        .cards
        .iter()
        .find(|card| card.owner == player && card.zone == Zone::Deck)
        .map(|card| card.instance_id)?;
    // Top-of-deck is always present here; the move cannot fail.
    let card = state.instance_mut(top)?;
    card.zone = Zone::Hand;
    events.push(GameEvent::CardDrawn { player, card: top });
    Some(top)
}

/// Moves a card from its owner's hand to the discard pile.
pub fn discard_card(
    state: &mut GameState,
    id: InstanceId,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let owner = state.instance_or_err(id)?.owner;
    let card = state
        .instance_mut(id)
        .ok_or(crate::error::InternalError::MissingInstance(id))?;
    card.zone = Zone::Discard;
    events.push(GameEvent::CardDiscarded {
        player: owner,
        card: id,
    });
    Ok(())
}

/// Adds counters to a card and reports the new total.
pub fn add_counter(
    state: &mut GameState,
    id: InstanceId,
    kind: CounterKind,
    amount: u32,
    events: &mut Vec<GameEvent>,
) -> Result<u32, EngineError> {
    let card = state
        .instance_mut(id)
        .ok_or(crate::error::InternalError::MissingInstance(id))?;
    let total = card.add_counter(kind, amount);
    events.push(match kind {
        CounterKind::Wound => GameEvent::WoundsDealt {
            card: id,
            amount,
            total,
        },
        _ => GameEvent::CounterChanged {
            card: id,
            counter: kind,
            total,
        },
    });
    Ok(total)
}

/// Removes counters from a card and reports the new total.
pub fn remove_counter(
    state: &mut GameState,
    id: InstanceId,
    kind: CounterKind,
    amount: u32,
    events: &mut Vec<GameEvent>,
) -> Result<u32, EngineError> {
    let card = state
        .instance_mut(id)
        .ok_or(crate::error::InternalError::MissingInstance(id))?;
    let total = card.remove_counter(kind, amount);
    events.push(GameEvent::CounterChanged {
        card: id,
        counter: kind,
        total,
    });
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;
    use crate::game_state::create_game_state;

    fn state() -> (crate::registry::CardRegistry, GameState) {
        let registry = cards::starter_registry().unwrap();
        let state = create_game_state(&registry, &cards::starter_config(3)).unwrap();
        (registry, state)
    }

    #[test]
    fn gain_and_spend_mythium() {
        let (_registry, mut state) = state();
        let mut events = Vec::new();
        gain_mythium(&mut state, PlayerId::Player1, 3, &mut events);
        assert_eq!(state.player(PlayerId::Player1).mythium, 3);
        spend_mythium(&mut state, PlayerId::Player1, 2).unwrap();
        assert_eq!(state.player(PlayerId::Player1).mythium, 1);

        let err = spend_mythium(&mut state, PlayerId::Player1, 2).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientMythium {
                required: 2,
                available: 1
            }
        );
        // The failed spend changed nothing.
        assert_eq!(state.player(PlayerId::Player1).mythium, 1);
    }

    #[test]
    fn draw_takes_the_top_deck_card() {
        let (_registry, mut state) = state();
        let mut events = Vec::new();
        let top = state.cards_in_zone(PlayerId::Player1, Zone::Deck)[0];
        let drawn = draw_card(&mut state, PlayerId::Player1, &mut events).unwrap();
        assert_eq!(drawn, top);
        assert_eq!(state.instance(top).unwrap().zone, Zone::Hand);
    }

    #[test]
    fn draw_from_empty_deck_is_a_noop() {
        let (_registry, mut state) = state();
        for card in &mut state.cards {
            if card.zone == Zone::Deck {
                card.zone = Zone::Discard;
            }
        }
        let mut events = Vec::new();
        assert_eq!(draw_card(&mut state, PlayerId::Player1, &mut events), None);
        assert!(events.is_empty());
    }

    #[test]
    fn wound_counters_emit_wound_events() {
        let (_registry, mut state) = state();
        let mut events = Vec::new();
        let card = state.cards[0].instance_id;
        add_counter(&mut state, card, CounterKind::Wound, 2, &mut events).unwrap();
        assert!(matches!(
            events.last(),
            Some(GameEvent::WoundsDealt { amount: 2, total: 2, .. })
        ));
        add_counter(&mut state, card, CounterKind::Stun, 1, &mut events).unwrap();
        assert!(matches!(
            events.last(),
            Some(GameEvent::CounterChanged {
                counter: CounterKind::Stun,
                total: 1,
                ..
            })
        ));
    }
}
