//! Legal-action enumeration.
//!
//! `legal_actions` is the exact mirror of `process_action`: every request it
//! returns is accepted, and every accepted request for the same snapshot is
//! in the list. The gate structure matches the dispatcher's: game over, then
//! pending choice, then unresolved combat, then the active player's main
//! actions.
//!
//! Multi-card selections are enumerated in canonical form only (instance ids
//! strictly ascending), matching what validation accepts.

use crate::actions::{ActionRequest, PlayerAction};
use crate::card::AbilityTiming;
use crate::combat;
use crate::error::EngineError;
use crate::game_state::{
    BlockerAssignment, GameState, PendingChoice, Phase, STANDING_COST,
};
use crate::ids::{InstanceId, PlayerId};
use crate::registry::CardRegistry;
use crate::types::Guild;
use crate::zone::Zone;

/// Enumerates every action the engine would accept for this snapshot.
pub fn legal_actions(
    registry: &CardRegistry,
    state: &GameState,
) -> Result<Vec<ActionRequest>, EngineError> {
    if state.phase == Phase::GameOver {
        return Ok(Vec::new());
    }
    if let Some(choice) = &state.pending_choice {
        return Ok(choice_actions(choice));
    }
    if let Some(active) = &state.combat {
        let defender = active.attacker.opponent();
        let blockers = combat::eligible_blockers(state, registry, defender)?;
        return Ok(blocker_actions(defender, &blockers, &active.attackers));
    }
    main_actions(registry, state)
}

fn choice_actions(choice: &PendingChoice) -> Vec<ActionRequest> {
    match choice {
        PendingChoice::ChooseMode {
            player, mode_count, ..
        } => (0..*mode_count)
            .map(|mode_index| ActionRequest {
                player: *player,
                action: PlayerAction::ChooseMode { mode_index },
            })
            .collect(),
        PendingChoice::ChooseTarget {
            player, valid, max, ..
        } => {
            let mut actions = Vec::new();
            let cap = (*max as usize).min(valid.len());
            for size in 1..=cap {
                for targets in combinations(valid, size) {
                    actions.push(ActionRequest {
                        player: *player,
                        action: PlayerAction::ChooseTarget { targets },
                    });
                }
            }
            actions
        }
        PendingChoice::ChooseDiscard {
            player,
            count,
            valid,
            ..
        } => combinations(valid, *count as usize)
            .into_iter()
            .map(|cards| ActionRequest {
                player: *player,
                action: PlayerAction::ChooseDiscard { cards },
            })
            .collect(),
        PendingChoice::ChooseBreachTarget { player, valid, .. } => valid
            .iter()
            .map(|&target| ActionRequest {
                player: *player,
                action: PlayerAction::ChooseBreachTarget { target },
            })
            .collect(),
    }
}

/// Every complete assignment: each eligible blocker independently blocks
/// nothing or one declared attacker. Includes the empty declaration.
fn blocker_actions(
    defender: PlayerId,
    blockers: &[InstanceId],
    attackers: &[InstanceId],
) -> Vec<ActionRequest> {
    let mut assignments: Vec<Vec<BlockerAssignment>> = vec![Vec::new()];
    for &blocker in blockers {
        let mut next = Vec::new();
        for partial in &assignments {
            next.push(partial.clone());
            for &attacker in attackers {
                let mut extended = partial.clone();
                extended.push(BlockerAssignment { blocker, attacker });
                next.push(extended);
            }
        }
        assignments = next;
    }
    assignments
        .into_iter()
        .map(|assignments| ActionRequest {
            player: defender,
            action: PlayerAction::DeclareBlockers { assignments },
        })
        .collect()
}

fn main_actions(
    registry: &CardRegistry,
    state: &GameState,
) -> Result<Vec<ActionRequest>, EngineError> {
    let player = state.active_player;
    let mythium = state.player(player).mythium;
    let mut actions = vec![ActionRequest {
        player,
        action: PlayerAction::GainMythium,
    }];

    if !state.cards_in_zone(player, Zone::Deck).is_empty() {
        actions.push(ActionRequest {
            player,
            action: PlayerAction::DrawCard,
        });
    }

    if mythium >= STANDING_COST {
        for guild in Guild::ALL {
            actions.push(ActionRequest {
                player,
                action: PlayerAction::BuyStanding { guild },
            });
        }
    }

    for id in state.cards_in_zone(player, Zone::Hand) {
        let instance = state.instance_or_err(id)?;
        let definition = registry.get(instance.definition_id)?;
        if definition.is_worldbreaker() || definition.cost > mythium {
            continue;
        }
        if let Some((guild, required)) = definition.standing_requirement
            && state.player(player).standing(guild) < required
        {
            continue;
        }
        actions.push(ActionRequest {
            player,
            action: PlayerAction::PlayCard { card: id },
        });
    }

    let mut ability_sources = state.cards_in_zone(player, Zone::Board);
    ability_sources.extend(state.cards_in_zone(player, Zone::Worldbreaker));
    for id in ability_sources {
        let instance = state.instance_or_err(id)?;
        if instance.exhausted {
            continue;
        }
        let definition = registry.get(instance.definition_id)?;
        for (index, ability) in definition.abilities.iter().enumerate() {
            let AbilityTiming::Activated { cost } = ability.timing else {
                continue;
            };
            if cost > mythium || instance.used_abilities.contains(&index) {
                continue;
            }
            actions.push(ActionRequest {
                player,
                action: PlayerAction::UseAbility {
                    card: id,
                    ability_index: index,
                },
            });
        }
    }

    let attackers = combat::eligible_attackers(state, registry, player)?;
    for size in 1..=attackers.len() {
        for selection in combinations(&attackers, size) {
            actions.push(ActionRequest {
                player,
                action: PlayerAction::Attack {
                    attackers: selection,
                },
            });
        }
    }

    Ok(actions)
}

/// All size-`size` ascending selections from an already-sorted slice.
fn combinations(items: &[InstanceId], size: usize) -> Vec<Vec<InstanceId>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(size);
    combine(items, size, 0, &mut current, &mut out);
    out
}

fn combine(
    items: &[InstanceId],
    size: usize,
    start: usize,
    current: &mut Vec<InstanceId>,
    out: &mut Vec<Vec<InstanceId>>,
) {
    if current.len() == size {
        out.push(current.clone());
        return;
    }
    for i in start..items.len() {
        current.push(items[i]);
        combine(items, size, i + 1, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::process_action;
    use crate::cards;
    use crate::game_state::create_game_state;
    use crate::types::CounterKind;

    fn setup() -> (CardRegistry, GameState) {
        let registry = cards::starter_registry().unwrap();
        let state = create_game_state(&registry, &cards::starter_config(21)).unwrap();
        (registry, state)
    }

    fn to_board(state: &mut GameState, player: PlayerId, definition: crate::ids::DefinitionId) -> InstanceId {
        let id = state
            .cards
            .iter()
            .find(|c| c.owner == player && c.definition_id == definition && c.zone != Zone::Board)
            .map(|c| c.instance_id)
            .unwrap();
        state.instance_mut(id).unwrap().zone = Zone::Board;
        id
    }

    #[test]
    fn opening_turn_offers_the_basic_actions() {
        let (registry, state) = setup();
        let actions = legal_actions(&registry, &state).unwrap();
        assert!(actions.iter().all(|a| a.player == PlayerId::Player1));
        assert!(actions.contains(&ActionRequest {
            player: PlayerId::Player1,
            action: PlayerAction::GainMythium,
        }));
        assert!(actions.contains(&ActionRequest {
            player: PlayerId::Player1,
            action: PlayerAction::DrawCard,
        }));
        // No mythium yet: no standing purchases, no plays of costed cards.
        assert!(!actions
            .iter()
            .any(|a| matches!(a.action, PlayerAction::BuyStanding { .. })));
    }

    #[test]
    fn standing_purchases_appear_with_enough_mythium() {
        let (registry, mut state) = setup();
        state.player_mut(PlayerId::Player1).mythium = STANDING_COST;
        let actions = legal_actions(&registry, &state).unwrap();
        let standing_count = actions
            .iter()
            .filter(|a| matches!(a.action, PlayerAction::BuyStanding { .. }))
            .count();
        assert_eq!(standing_count, Guild::ALL.len());
    }

    #[test]
    fn attack_subsets_are_ascending_and_nonempty() {
        let (registry, mut state) = setup();
        let a = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        let b = to_board(&mut state, PlayerId::Player1, cards::GALE_SKIRMISHER);
        let actions = legal_actions(&registry, &state).unwrap();
        let attacks: Vec<_> = actions
            .iter()
            .filter_map(|a| match &a.action {
                PlayerAction::Attack { attackers } => Some(attackers.clone()),
                _ => None,
            })
            .collect();
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        assert_eq!(attacks, vec![vec![lo], vec![hi], vec![lo, hi]]);
    }

    #[test]
    fn stationary_and_exhausted_followers_cannot_attack() {
        let (registry, mut state) = setup();
        to_board(&mut state, PlayerId::Player1, cards::VEILED_WATCHER);
        let vanguard = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        state.instance_mut(vanguard).unwrap().exhausted = true;
        let actions = legal_actions(&registry, &state).unwrap();
        assert!(!actions
            .iter()
            .any(|a| matches!(a.action, PlayerAction::Attack { .. })));
    }

    #[test]
    fn blocker_declarations_cover_the_full_product() {
        let (registry, mut state) = setup();
        let attacker = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        to_board(&mut state, PlayerId::Player2, cards::THORNWALL_SENTINEL);
        to_board(&mut state, PlayerId::Player2, cards::GALE_SKIRMISHER);
        let mut events = Vec::new();
        combat::initiate_attack(&mut state, &registry, PlayerId::Player1, &[attacker], &mut events)
            .unwrap();

        let actions = legal_actions(&registry, &state).unwrap();
        // Two eligible blockers, one attacker: each blocker blocks or not.
        assert_eq!(actions.len(), 4);
        assert!(actions.iter().all(|a| a.player == PlayerId::Player2));
        assert!(actions.contains(&ActionRequest {
            player: PlayerId::Player2,
            action: PlayerAction::DeclareBlockers {
                assignments: Vec::new(),
            },
        }));
    }

    #[test]
    fn every_enumerated_action_is_accepted() {
        let (registry, mut state) = setup();
        state.player_mut(PlayerId::Player1).mythium = 4;
        to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        let forge = to_board(&mut state, PlayerId::Player1, cards::FORGEWORKS);
        state
            .instance_mut(forge)
            .unwrap()
            .add_counter(CounterKind::Stage, 3);

        let actions = legal_actions(&registry, &state).unwrap();
        assert!(!actions.is_empty());
        for request in &actions {
            assert!(
                process_action(&registry, &state, request).is_ok(),
                "enumerated action rejected: {:?}",
                request
            );
        }
    }

    #[test]
    fn game_over_offers_nothing() {
        let (registry, mut state) = setup();
        state.phase = Phase::GameOver;
        assert!(legal_actions(&registry, &state).unwrap().is_empty());
    }
}
