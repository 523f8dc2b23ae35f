//! Combat: attacker declaration, blocker assignment, fight resolution.
//!
//! The combat sub-machine runs `none → attackers_declared → blockers_declared
//! → damage_resolved` inside the action phase; no standing combat phase
//! persists across turns. Damage is computed simultaneously per
//! blocker-attacker pair: each blocker deals its own effective strength to
//! the attacker it covers (wounds accumulate across blockers), and the
//! attacker deals its full effective strength to each blocker individually.
//! The full-strength-to-each-blocker rule is a deliberate simplification of
//! the source rules, reproduced exactly; do not "correct" it to a divided
//! assignment.

use tracing::debug;

use crate::cleanup::run_cleanup;
use crate::effect::ExpiryTrigger;
use crate::error::{EngineError, ValidationError};
use crate::game_event::GameEvent;
use crate::game_state::{
    BlockerAssignment, Combat, GameState, OVERWHELM_POWER, UNBLOCKED_POWER,
};
use crate::ids::{InstanceId, PlayerId};
use crate::mutations;
use crate::registry::CardRegistry;
use crate::types::{CardType, CounterKind, Keyword};
use crate::zone::Zone;

/// Board followers of `player` that may be declared as attackers: not
/// exhausted and without the stationary keyword.
pub fn eligible_attackers(
    state: &GameState,
    registry: &CardRegistry,
    player: PlayerId,
) -> Result<Vec<InstanceId>, EngineError> {
    let mut eligible = Vec::new();
    for id in state.cards_in_zone(player, Zone::Board) {
        let instance = state.instance_or_err(id)?;
        let definition = registry.get(instance.definition_id)?;
        if definition.card_type == CardType::Follower
            && !instance.exhausted
            && !state.has_keyword(registry, id, Keyword::Stationary)?
        {
            eligible.push(id);
        }
    }
    eligible.sort();
    Ok(eligible)
}

/// Board followers of `player` that may block: not exhausted.
pub fn eligible_blockers(
    state: &GameState,
    registry: &CardRegistry,
    player: PlayerId,
) -> Result<Vec<InstanceId>, EngineError> {
    let mut eligible = Vec::new();
    for id in state.cards_in_zone(player, Zone::Board) {
        let instance = state.instance_or_err(id)?;
        let definition = registry.get(instance.definition_id)?;
        if definition.card_type == CardType::Follower && !instance.exhausted {
            eligible.push(id);
        }
    }
    eligible.sort();
    Ok(eligible)
}

/// Declares an attack: validates every attacker, exhausts them and opens the
/// blocker-declaration window. Attacker lists are canonical: ascending
/// instance-id order.
pub fn initiate_attack(
    state: &mut GameState,
    registry: &CardRegistry,
    player: PlayerId,
    attackers: &[InstanceId],
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    if attackers.is_empty() {
        return Err(ValidationError::EmptyAttack.into());
    }
    check_ascending(attackers)?;
    let eligible = eligible_attackers(state, registry, player)?;
    for &id in attackers {
        let instance = state.instance_or_reject(id)?;
        if instance.owner != player {
            return Err(ValidationError::NotController { card: id, player }.into());
        }
        if instance.zone != Zone::Board {
            return Err(ValidationError::WrongZone {
                card: id,
                expected: Zone::Board,
                actual: instance.zone,
            }
            .into());
        }
        if instance.exhausted {
            return Err(ValidationError::CardExhausted(id).into());
        }
        if !eligible.contains(&id) {
            return Err(ValidationError::CannotAttack(id).into());
        }
    }

    for &id in attackers {
        if let Some(card) = state.instance_mut(id) {
            card.exhausted = true;
        }
    }
    state.combat = Some(Combat {
        attacker: player,
        attackers: attackers.to_vec(),
        blockers: Vec::new(),
        damage_dealt: false,
    });
    events.push(GameEvent::AttackDeclared {
        player,
        attackers: attackers.to_vec(),
    });
    debug!(%player, count = attackers.len(), "attack declared");
    Ok(())
}

/// Declares the defender's complete blocker assignment (possibly empty) and
/// immediately resolves the fight. Assignments are canonical: ascending
/// blocker instance-id order; a blocker covers at most one attacker.
pub fn declare_blockers(
    state: &mut GameState,
    registry: &CardRegistry,
    player: PlayerId,
    assignments: &[BlockerAssignment],
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let combat = state.combat.as_ref().ok_or(ValidationError::NoCombat)?;
    if combat.damage_dealt {
        return Err(ValidationError::CombatAlreadyResolved.into());
    }
    let defender = combat.attacker.opponent();
    if player != defender {
        return Err(ValidationError::NotYourTurn(player).into());
    }
    let attackers = combat.attackers.clone();

    let blocker_ids: Vec<InstanceId> = assignments.iter().map(|a| a.blocker).collect();
    check_ascending(&blocker_ids)?;
    let eligible = eligible_blockers(state, registry, player)?;
    for assignment in assignments {
        let instance = state.instance_or_reject(assignment.blocker)?;
        if instance.owner != player {
            return Err(ValidationError::NotController {
                card: assignment.blocker,
                player,
            }
            .into());
        }
        if !eligible.contains(&assignment.blocker) {
            return Err(ValidationError::CannotBlock(assignment.blocker).into());
        }
        if !attackers.contains(&assignment.attacker) {
            return Err(ValidationError::InvalidSelection(assignment.attacker).into());
        }
    }

    if let Some(combat) = state.combat.as_mut() {
        combat.blockers = assignments.to_vec();
    }
    events.push(GameEvent::BlockersDeclared {
        player,
        assignments: assignments
            .iter()
            .map(|a| (a.blocker, a.attacker))
            .collect(),
    });
    resolve_fight(state, registry, events)
}

/// Computes combat damage, fires bloodshed/overwhelm, expires end-of-combat
/// lasting effects, sweeps the board and folds combat away.
fn resolve_fight(
    state: &mut GameState,
    registry: &CardRegistry,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let Some(combat) = state.combat.clone() else {
        return Err(ValidationError::NoCombat.into());
    };
    if combat.damage_dealt {
        return Err(ValidationError::CombatAlreadyResolved.into());
    }

    for &attacker in &combat.attackers {
        let blockers = combat.blockers_of(attacker);
        if blockers.is_empty() {
            mutations::gain_power(state, combat.attacker, UNBLOCKED_POWER, events);
            events.push(GameEvent::AttackerUnblocked {
                card: attacker,
                player: combat.attacker,
            });
            continue;
        }

        let attacker_bloodshed = state.has_keyword(registry, attacker, Keyword::Bloodshed)?;
        let attacker_overwhelm = state.has_keyword(registry, attacker, Keyword::Overwhelm)?;
        for blocker in blockers {
            // Simultaneous pair damage: both strengths are read before
            // either side's wounds land.
            let attacker_strength = state.effective_strength(registry, attacker)?.max(0) as u32;
            let blocker_strength = state.effective_strength(registry, blocker)?.max(0) as u32;
            mutations::add_counter(state, attacker, CounterKind::Wound, blocker_strength, events)?;
            mutations::add_counter(state, blocker, CounterKind::Wound, attacker_strength, events)?;

            // Keyword order is fixed: bloodshed first, then overwhelm on the
            // blocker it may have pushed over the line.
            if attacker_bloodshed {
                mutations::add_counter(state, blocker, CounterKind::Wound, 1, events)?;
                events.push(GameEvent::KeywordTriggered {
                    card: attacker,
                    keyword: Keyword::Bloodshed,
                });
            }
            if attacker_overwhelm && state.is_defeated(registry, blocker)? {
                mutations::gain_power(state, combat.attacker, OVERWHELM_POWER, events);
                events.push(GameEvent::KeywordTriggered {
                    card: attacker,
                    keyword: Keyword::Overwhelm,
                });
            }
        }
    }

    if let Some(combat) = state.combat.as_mut() {
        combat.damage_dealt = true;
    }
    events.push(GameEvent::FightResolved {
        attacker: combat.attacker,
    });
    state.expire_lasting(ExpiryTrigger::EndOfCombat);
    run_cleanup(state, registry, events)?;
    state.combat = None;
    debug!(attacker = %combat.attacker, "fight resolved");
    Ok(())
}

/// Rejects unsorted or duplicated canonical selections.
fn check_ascending(ids: &[InstanceId]) -> Result<(), ValidationError> {
    for pair in ids.windows(2) {
        if pair[0] == pair[1] {
            return Err(ValidationError::DuplicateSelection(pair[0]));
        }
        if pair[0] > pair[1] {
            return Err(ValidationError::UnsortedSelection);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;
    use crate::game_state::create_game_state;
    use crate::ids::DefinitionId;

    fn setup() -> (CardRegistry, GameState) {
        let registry = cards::starter_registry().unwrap();
        let state = create_game_state(&registry, &cards::starter_config(21)).unwrap();
        (registry, state)
    }

    fn to_board(state: &mut GameState, player: PlayerId, definition: DefinitionId) -> InstanceId {
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
    fn attack_exhausts_attackers_and_opens_combat() {
        let (registry, mut state) = setup();
        let attacker = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        let mut events = Vec::new();
        initiate_attack(&mut state, &registry, PlayerId::Player1, &[attacker], &mut events)
            .unwrap();
        assert!(state.instance(attacker).unwrap().exhausted);
        let combat = state.combat.as_ref().unwrap();
        assert_eq!(combat.attackers, vec![attacker]);
        assert!(!combat.damage_dealt);
    }

    #[test]
    fn stationary_and_exhausted_cannot_attack() {
        let (registry, mut state) = setup();
        let watcher = to_board(&mut state, PlayerId::Player1, cards::VEILED_WATCHER);
        let vanguard = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        state.instance_mut(vanguard).unwrap().exhausted = true;

        let mut events = Vec::new();
        let err =
            initiate_attack(&mut state, &registry, PlayerId::Player1, &[watcher], &mut events)
                .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::CannotAttack(watcher))
        );
        let err =
            initiate_attack(&mut state, &registry, PlayerId::Player1, &[vanguard], &mut events)
                .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::CardExhausted(vanguard))
        );
    }

    #[test]
    fn two_blockers_stack_wounds_on_attacker_but_each_takes_full_strength() {
        let (registry, mut state) = setup();
        // Colossus: 6/6. Two sentinels: 1/4 each.
        let attacker = to_board(&mut state, PlayerId::Player1, cards::STONEBOUND_COLOSSUS);
        let b1 = to_board(&mut state, PlayerId::Player2, cards::THORNWALL_SENTINEL);
        let b2 = to_board(&mut state, PlayerId::Player2, cards::THORNWALL_SENTINEL);
        let mut blockers = [b1, b2];
        blockers.sort();

        let mut events = Vec::new();
        initiate_attack(&mut state, &registry, PlayerId::Player1, &[attacker], &mut events)
            .unwrap();
        declare_blockers(
            &mut state,
            &registry,
            PlayerId::Player2,
            &[
                BlockerAssignment {
                    blocker: blockers[0],
                    attacker,
                },
                BlockerAssignment {
                    blocker: blockers[1],
                    attacker,
                },
            ],
            &mut events,
        )
        .unwrap();

        // Attacker took 1 + 1 wounds; each blocker independently took the
        // full 6 (not 3 each) and was defeated.
        assert_eq!(
            state.instance(attacker).unwrap().counter(CounterKind::Wound),
            2
        );
        for blocker in blockers {
            assert_eq!(state.instance(blocker).unwrap().zone, Zone::Discard);
            assert_eq!(
                state.instance(blocker).unwrap().counter(CounterKind::Wound),
                6
            );
        }
        // Overwhelm fired once per defeated blocker.
        assert_eq!(state.player(PlayerId::Player1).power, 2);
        assert!(state.combat.is_none());
    }

    #[test]
    fn bloodshed_adds_a_wound_after_pair_damage() {
        let (registry, mut state) = setup();
        // Vanguard: 3/2 with bloodshed. Sentinel: 1/4.
        let attacker = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        let blocker = to_board(&mut state, PlayerId::Player2, cards::THORNWALL_SENTINEL);

        let mut events = Vec::new();
        initiate_attack(&mut state, &registry, PlayerId::Player1, &[attacker], &mut events)
            .unwrap();
        declare_blockers(
            &mut state,
            &registry,
            PlayerId::Player2,
            &[BlockerAssignment { blocker, attacker }],
            &mut events,
        )
        .unwrap();

        // 3 pair wounds + 1 bloodshed = 4: exactly lethal for the sentinel.
        assert_eq!(state.instance(blocker).unwrap().zone, Zone::Discard);
        assert_eq!(
            state.instance(blocker).unwrap().counter(CounterKind::Wound),
            4
        );
        // Sentinel's 1 strength wounded the vanguard without defeating it.
        assert_eq!(
            state.instance(attacker).unwrap().counter(CounterKind::Wound),
            1
        );
        assert_eq!(state.instance(attacker).unwrap().zone, Zone::Board);
    }

    #[test]
    fn unblocked_attackers_grant_power() {
        let (registry, mut state) = setup();
        let a1 = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        let a2 = to_board(&mut state, PlayerId::Player1, cards::GALE_SKIRMISHER);
        let mut attackers = [a1, a2];
        attackers.sort();

        let mut events = Vec::new();
        initiate_attack(&mut state, &registry, PlayerId::Player1, &attackers, &mut events)
            .unwrap();
        declare_blockers(&mut state, &registry, PlayerId::Player2, &[], &mut events).unwrap();

        assert_eq!(state.player(PlayerId::Player1).power, 2);
        assert!(state.combat.is_none());
    }

    #[test]
    fn wrong_player_cannot_declare_blockers() {
        let (registry, mut state) = setup();
        let attacker = to_board(&mut state, PlayerId::Player1, cards::EMBER_VANGUARD);
        let mut events = Vec::new();
        initiate_attack(&mut state, &registry, PlayerId::Player1, &[attacker], &mut events)
            .unwrap();
        let err = declare_blockers(&mut state, &registry, PlayerId::Player1, &[], &mut events)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::NotYourTurn(PlayerId::Player1))
        );
    }
}
