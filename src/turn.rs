//! Turn alternation, rally sequencing and the victory check.
//!
//! `advance_turn` runs after every turn-consuming action. Eight actions per
//! round, strictly alternating from the round's first player; the eighth
//! action rolls straight through the rally phase and back into the action
//! phase (or into game over) within the same call.

use tracing::debug;

use crate::card::AbilityTiming;
use crate::cleanup::run_cleanup;
use crate::effect::ExpiryTrigger;
use crate::error::EngineError;
use crate::game_event::{GameEvent, RallyStep};
use crate::game_state::{
    ACTIONS_PER_ROUND, GameState, Phase, RALLY_DRAW, RALLY_MYTHIUM, VICTORY_POWER, Winner,
};
use crate::ids::PlayerId;
use crate::mutations;
use crate::registry::CardRegistry;
use crate::resolver::{ChoiceMode, EffectContext, resolve_ability};
use crate::types::CounterKind;
use crate::zone::Zone;

/// Consumes one action slot. Below eight actions the active player
/// alternates and end-of-turn effects expire; the eighth action enters the
/// rally phase.
pub fn advance_turn(
    state: &mut GameState,
    registry: &CardRegistry,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    state.actions_taken += 1;
    if state.actions_taken < ACTIONS_PER_ROUND {
        state.active_player = state.alternation_target();
        state.expire_lasting(ExpiryTrigger::EndOfTurn);
        events.push(GameEvent::TurnChanged {
            active_player: state.active_player,
            actions_taken: state.actions_taken,
        });
        return Ok(());
    }
    run_rally_phase(state, registry, events)
}

/// The end-of-round sequence, per player in fixed order (player 1 first):
/// rally abilities, ready/stun, income, draw; then the victory check; then
/// either game over or the next round with the first player swapped.
pub fn run_rally_phase(
    state: &mut GameState,
    registry: &CardRegistry,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    state.phase = Phase::Rally;
    events.push(GameEvent::PhaseChanged { phase: Phase::Rally });
    debug!(round = state.round, "rally phase");

    for player in PlayerId::BOTH {
        rally_abilities(state, registry, player, events)?;
        rally_ready(state, player, events)?;

        events.push(GameEvent::RallyStep {
            player,
            step: RallyStep::Income,
        });
        mutations::gain_mythium(state, player, RALLY_MYTHIUM, events);

        events.push(GameEvent::RallyStep {
            player,
            step: RallyStep::Draw,
        });
        for _ in 0..RALLY_DRAW {
            mutations::draw_card(state, player, events);
        }
    }

    let p1 = state.player(PlayerId::Player1).power;
    let p2 = state.player(PlayerId::Player2).power;
    if p1 >= VICTORY_POWER || p2 >= VICTORY_POWER {
        let winner = if p1 > p2 {
            Winner::Player(PlayerId::Player1)
        } else if p2 > p1 {
            Winner::Player(PlayerId::Player2)
        } else {
            Winner::Draw
        };
        state.winner = Some(winner);
        state.phase = Phase::GameOver;
        events.push(GameEvent::PhaseChanged {
            phase: Phase::GameOver,
        });
        events.push(GameEvent::GameOver { winner });
        debug!(?winner, "game over");
        return Ok(());
    }

    state.first_player = state.first_player.opponent();
    state.round += 1;
    state.actions_taken = 0;
    // Round end sweeps end-of-turn effects too, so nothing created on the
    // eighth action leaks into the next round.
    state.expire_lasting(ExpiryTrigger::EndOfRound);
    state.expire_lasting(ExpiryTrigger::EndOfTurn);
    state.phase = Phase::Action;
    state.active_player = state.first_player;
    events.push(GameEvent::PhaseChanged {
        phase: Phase::Action,
    });
    events.push(GameEvent::TurnChanged {
        active_player: state.active_player,
        actions_taken: 0,
    });
    Ok(())
}

/// Step 1: rally-timing abilities, card-list order within the player.
/// Resolution runs in auto-choice mode so the sequence never suspends.
fn rally_abilities(
    state: &mut GameState,
    registry: &CardRegistry,
    player: PlayerId,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    events.push(GameEvent::RallyStep {
        player,
        step: RallyStep::Abilities,
    });
    let mut sources = state.cards_in_zone(player, Zone::Board);
    sources.extend(state.cards_in_zone(player, Zone::Worldbreaker));
    for id in sources {
        // An earlier rally ability may have removed this card already.
        let Some(instance) = state.instance(id) else {
            continue;
        };
        if !matches!(instance.zone, Zone::Board | Zone::Worldbreaker) {
            continue;
        }
        let definition = registry.get(instance.definition_id)?.clone();
        for (index, ability) in definition.abilities.iter().enumerate() {
            if ability.timing != AbilityTiming::Rally {
                continue;
            }
            events.push(GameEvent::AbilityTriggered {
                card: id,
                controller: player,
                ability_index: index,
            });
            let ctx = EffectContext::new(player, id);
            resolve_ability(
                state,
                registry,
                &ctx,
                ability,
                false,
                ChoiceMode::Auto,
                events,
            )?;
        }
    }
    run_cleanup(state, registry, events)
}

/// Step 2: stun takes precedence over readying, then the used-ability list
/// clears for the new cycle. Worldbreaker-zone cards ready the same way.
fn rally_ready(
    state: &mut GameState,
    player: PlayerId,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    events.push(GameEvent::RallyStep {
        player,
        step: RallyStep::Ready,
    });
    let mut ids = state.cards_in_zone(player, Zone::Board);
    ids.extend(state.cards_in_zone(player, Zone::Worldbreaker));
    for id in ids {
        let stunned = state
            .instance(id)
            .map(|card| card.counter(CounterKind::Stun) > 0)
            .unwrap_or(false);
        if stunned {
            mutations::remove_counter(state, id, CounterKind::Stun, 1, events)?;
        } else if let Some(card) = state.instance_mut(id)
            && card.exhausted
        {
            card.exhausted = false;
        }
        if let Some(card) = state.instance_mut(id) {
            card.used_abilities.clear();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;
    use crate::game_state::create_game_state;

    fn setup() -> (CardRegistry, GameState) {
        let registry = cards::starter_registry().unwrap();
        let state = create_game_state(&registry, &cards::starter_config(13)).unwrap();
        (registry, state)
    }

    #[test]
    fn turns_alternate_from_first_player() {
        let (registry, mut state) = setup();
        let mut events = Vec::new();
        advance_turn(&mut state, &registry, &mut events).unwrap();
        assert_eq!(state.active_player, PlayerId::Player2);
        advance_turn(&mut state, &registry, &mut events).unwrap();
        assert_eq!(state.active_player, PlayerId::Player1);
        assert_eq!(state.actions_taken, 2);
    }

    #[test]
    fn eighth_action_runs_rally_and_swaps_first_player() {
        let (registry, mut state) = setup();
        let hand_before = state.cards_in_zone(PlayerId::Player1, Zone::Hand).len();
        let mut events = Vec::new();
        for _ in 0..ACTIONS_PER_ROUND {
            advance_turn(&mut state, &registry, &mut events).unwrap();
        }
        assert_eq!(state.round, 2);
        assert_eq!(state.actions_taken, 0);
        assert_eq!(state.first_player, PlayerId::Player2);
        assert_eq!(state.active_player, PlayerId::Player2);
        assert_eq!(state.phase, Phase::Action);
        // Both players got their rally income and draw. The worldbreakers'
        // rally abilities grant 1 extra mythium each.
        assert_eq!(state.player(PlayerId::Player1).mythium, RALLY_MYTHIUM + 1);
        assert_eq!(state.player(PlayerId::Player2).mythium, RALLY_MYTHIUM + 1);
        assert_eq!(
            state.cards_in_zone(PlayerId::Player1, Zone::Hand).len(),
            hand_before + 1
        );
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PhaseChanged {
                phase: Phase::Rally
            }
        )));
    }

    #[test]
    fn stun_takes_precedence_over_readying() {
        let (registry, mut state) = setup();
        let id = state
            .cards
            .iter()
            .find(|c| c.owner == PlayerId::Player1 && c.definition_id == cards::EMBER_VANGUARD)
            .map(|c| c.instance_id)
            .unwrap();
        {
            let card = state.instance_mut(id).unwrap();
            card.zone = Zone::Board;
            card.exhausted = true;
            card.add_counter(CounterKind::Stun, 2);
            card.used_abilities.push(0);
        }

        let mut events = Vec::new();
        run_rally_phase(&mut state, &registry, &mut events).unwrap();
        let card = state.instance(id).unwrap();
        // Still exhausted: the stun counter was consumed instead.
        assert!(card.exhausted);
        assert_eq!(card.counter(CounterKind::Stun), 1);
        assert!(card.used_abilities.is_empty());

        let mut events = Vec::new();
        run_rally_phase(&mut state, &registry, &mut events).unwrap();
        let card = state.instance(id).unwrap();
        assert!(card.exhausted);
        assert_eq!(card.counter(CounterKind::Stun), 0);

        let mut events = Vec::new();
        run_rally_phase(&mut state, &registry, &mut events).unwrap();
        assert!(!state.instance(id).unwrap().exhausted);
    }

    #[test]
    fn victory_goes_to_higher_power() {
        let (registry, mut state) = setup();
        state.player_mut(PlayerId::Player1).power = 10;
        state.player_mut(PlayerId::Player2).power = 11;
        let mut events = Vec::new();
        run_rally_phase(&mut state, &registry, &mut events).unwrap();
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.winner, Some(Winner::Player(PlayerId::Player2)));
    }

    #[test]
    fn simultaneous_equal_power_is_a_draw() {
        let (registry, mut state) = setup();
        state.player_mut(PlayerId::Player1).power = 10;
        state.player_mut(PlayerId::Player2).power = 10;
        let mut events = Vec::new();
        run_rally_phase(&mut state, &registry, &mut events).unwrap();
        assert_eq!(state.winner, Some(Winner::Draw));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { winner: Winner::Draw })));
    }

    #[test]
    fn below_threshold_nobody_wins() {
        let (registry, mut state) = setup();
        state.player_mut(PlayerId::Player1).power = 9;
        state.player_mut(PlayerId::Player2).power = 4;
        let mut events = Vec::new();
        run_rally_phase(&mut state, &registry, &mut events).unwrap();
        assert_eq!(state.winner, None);
        assert_eq!(state.phase, Phase::Action);
        assert_eq!(state.round, 2);
    }
}
