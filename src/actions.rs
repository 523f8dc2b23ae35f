//! Action validation and dispatch: the engine's main entry point.
//!
//! `process_action` is a pure function from one snapshot to the next. The
//! gate checks turn/phase/pending-choice legality against the input snapshot
//! without touching it; handlers then work on a clone, so any rejection,
//! however deep, leaves the caller's snapshot provably unchanged and no
//! partial application is ever observable.

use tracing::debug;

use crate::card::{AbilityResolve, AbilityTiming, CardDefinition};
use crate::cleanup::run_cleanup;
use crate::combat;
use crate::effect::Effect;
use crate::error::{EngineError, ValidationError};
use crate::game_event::{ChoiceKind, GameEvent};
use crate::game_state::{
    BlockerAssignment, GAIN_MYTHIUM_AMOUNT, GameState, PendingAbility, PendingChoice, Phase,
    STANDING_COST,
};
use crate::ids::{InstanceId, PlayerId};
use crate::mutations;
use crate::registry::CardRegistry;
use crate::resolver::{self, ChoiceMode, EffectContext};
use crate::turn::advance_turn;
use crate::types::{CardType, CounterKind, Guild};
use crate::zone::Zone;

/// Everything a player can submit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum PlayerAction {
    GainMythium,
    DrawCard,
    BuyStanding {
        guild: Guild,
    },
    PlayCard {
        card: InstanceId,
    },
    UseAbility {
        card: InstanceId,
        ability_index: usize,
    },
    /// Attacker ids in ascending order.
    Attack {
        attackers: Vec<InstanceId>,
    },
    /// The complete assignment, blockers in ascending order; empty means no
    /// blocks.
    DeclareBlockers {
        assignments: Vec<BlockerAssignment>,
    },
    ChooseMode {
        mode_index: usize,
    },
    /// Chosen hand cards in ascending order.
    ChooseDiscard {
        cards: Vec<InstanceId>,
    },
    /// Chosen targets in ascending order.
    ChooseTarget {
        targets: Vec<InstanceId>,
    },
    ChooseBreachTarget {
        target: InstanceId,
    },
}

impl PlayerAction {
    fn is_choice(&self) -> bool {
        matches!(
            self,
            PlayerAction::ChooseMode { .. }
                | PlayerAction::ChooseDiscard { .. }
                | PlayerAction::ChooseTarget { .. }
                | PlayerAction::ChooseBreachTarget { .. }
        )
    }
}

/// One submitted action with its acting player.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub player: PlayerId,
    pub action: PlayerAction,
}

/// The new snapshot and the ordered events the action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Validates and applies one action.
pub fn process_action(
    registry: &CardRegistry,
    state: &GameState,
    request: &ActionRequest,
) -> Result<ActionOutcome, EngineError> {
    gate(state, request)?;

    let mut next = state.clone();
    next.version += 1;
    let mut events = Vec::new();
    let consumed = dispatch(&mut next, registry, request, &mut events)?;
    run_cleanup(&mut next, registry, &mut events)?;

    if consumed
        && next.pending_choice.is_none()
        && next.combat.is_none()
        && next.phase == Phase::Action
    {
        advance_turn(&mut next, registry, &mut events)?;
    }

    debug!(player = %request.player, action = ?request.action, version = next.version, "action accepted");
    Ok(ActionOutcome {
        state: next,
        events,
    })
}

/// Turn/phase/pending-choice legality, checked read-only before any clone.
fn gate(state: &GameState, request: &ActionRequest) -> Result<(), ValidationError> {
    if state.phase == Phase::GameOver {
        return Err(ValidationError::GameOver);
    }

    if let Some(choice) = &state.pending_choice {
        if request.player != choice.player() {
            return Err(ValidationError::ChoicePending(choice.player()));
        }
        let matches = matches!(
            (&request.action, choice),
            (PlayerAction::ChooseMode { .. }, PendingChoice::ChooseMode { .. })
                | (
                    PlayerAction::ChooseDiscard { .. },
                    PendingChoice::ChooseDiscard { .. }
                )
                | (
                    PlayerAction::ChooseTarget { .. },
                    PendingChoice::ChooseTarget { .. }
                )
                | (
                    PlayerAction::ChooseBreachTarget { .. },
                    PendingChoice::ChooseBreachTarget { .. }
                )
        );
        if !matches {
            return Err(ValidationError::ChoiceMismatch);
        }
        return Ok(());
    }

    if let Some(combat) = &state.combat {
        let defender = combat.attacker.opponent();
        if !matches!(request.action, PlayerAction::DeclareBlockers { .. }) {
            return Err(ValidationError::BlockersPending(defender));
        }
        if request.player != defender {
            return Err(ValidationError::NotYourTurn(request.player));
        }
        return Ok(());
    }

    if matches!(request.action, PlayerAction::DeclareBlockers { .. }) {
        return Err(ValidationError::NoCombat);
    }
    if request.action.is_choice() {
        return Err(ValidationError::NoChoicePending);
    }
    if request.player != state.active_player {
        return Err(ValidationError::NotYourTurn(request.player));
    }
    Ok(())
}

/// Routes to the handler. Returns whether the action consumed the acting
/// player's turn (possibly deferred behind a pending choice or combat).
fn dispatch(
    next: &mut GameState,
    registry: &CardRegistry,
    request: &ActionRequest,
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let player = request.player;
    match &request.action {
        PlayerAction::GainMythium => {
            mutations::gain_mythium(next, player, GAIN_MYTHIUM_AMOUNT, events);
            Ok(true)
        }
        PlayerAction::DrawCard => {
            if next.cards_in_zone(player, Zone::Deck).is_empty() {
                return Err(ValidationError::EmptyDeck(player).into());
            }
            mutations::draw_card(next, player, events);
            Ok(true)
        }
        PlayerAction::BuyStanding { guild } => {
            mutations::spend_mythium(next, player, STANDING_COST)?;
            mutations::gain_standing(next, player, *guild, 1, events);
            Ok(true)
        }
        PlayerAction::PlayCard { card } => play_card(next, registry, player, *card, events),
        PlayerAction::UseAbility {
            card,
            ability_index,
        } => use_ability(next, registry, player, *card, *ability_index, events),
        PlayerAction::Attack { attackers } => {
            combat::initiate_attack(next, registry, player, attackers, events)?;
            Ok(true)
        }
        PlayerAction::DeclareBlockers { assignments } => {
            combat::declare_blockers(next, registry, player, assignments, events)?;
            Ok(true)
        }
        PlayerAction::ChooseMode { mode_index } => {
            resolve_choose_mode(next, registry, *mode_index, events)
        }
        PlayerAction::ChooseDiscard { cards } => {
            resolve_choose_discard(next, registry, cards, events)
        }
        PlayerAction::ChooseTarget { targets } => {
            resolve_choose_target(next, registry, targets, events)
        }
        PlayerAction::ChooseBreachTarget { target } => {
            resolve_choose_breach(next, registry, *target, events)
        }
    }
}

fn play_card(
    next: &mut GameState,
    registry: &CardRegistry,
    player: PlayerId,
    card: InstanceId,
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let instance = next.instance_or_reject(card)?;
    if instance.owner != player {
        return Err(ValidationError::NotController { card, player }.into());
    }
    if instance.zone != Zone::Hand {
        return Err(ValidationError::WrongZone {
            card,
            expected: Zone::Hand,
            actual: instance.zone,
        }
        .into());
    }
    let definition = registry.get(instance.definition_id)?.clone();
    if definition.is_worldbreaker() {
        return Err(ValidationError::NotPlayable(card).into());
    }
    if let Some((guild, required)) = definition.standing_requirement {
        let available = next.player(player).standing(guild);
        if available < required {
            return Err(ValidationError::StandingRequirement {
                guild,
                required,
                available,
            }
            .into());
        }
    }
    mutations::spend_mythium(next, player, definition.cost)?;
    events.push(GameEvent::CardPlayed { player, card });

    match definition.card_type {
        CardType::Follower | CardType::Location => {
            mutations::move_card(next, card, Zone::Board, events)?;
            if let Some(stages) = definition.stage_count {
                mutations::add_counter(next, card, CounterKind::Stage, stages, events)?;
            }
            next.pending_choice = resolve_on_play(next, registry, player, card, &definition, events)?;
        }
        CardType::Event => {
            mutations::move_card(next, card, Zone::Discard, events)?;
            if definition.is_modal() {
                events.push(GameEvent::ChoiceRequired {
                    player,
                    kind: ChoiceKind::ChooseMode,
                });
                next.pending_choice = Some(PendingChoice::ChooseMode {
                    player,
                    source: card,
                    mode_count: definition.modes.len(),
                    pending: PendingAbility {
                        controller: player,
                        source: card,
                        triggering: None,
                        queue: Vec::new(),
                        consumes_turn: true,
                    },
                });
            } else {
                next.pending_choice =
                    resolve_on_play(next, registry, player, card, &definition, events)?;
            }
        }
        CardType::Worldbreaker => unreachable!("rejected above"),
    }
    Ok(true)
}

/// Resolves a played card's on-play abilities as one queue, so a suspension
/// in one ability carries the remaining effects with it.
fn resolve_on_play(
    next: &mut GameState,
    registry: &CardRegistry,
    player: PlayerId,
    card: InstanceId,
    definition: &CardDefinition,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    let mut queue = Vec::new();
    for (index, ability) in definition.abilities.iter().enumerate() {
        if ability.timing != AbilityTiming::OnPlay {
            continue;
        }
        events.push(GameEvent::AbilityTriggered {
            card,
            controller: player,
            ability_index: index,
        });
        match &ability.resolve {
            AbilityResolve::Effects(effects) => queue.extend(effects.iter().cloned()),
            AbilityResolve::Custom(key) => queue.push(Effect::Custom(key.clone())),
        }
    }
    let ctx = EffectContext::new(player, card);
    resolver::resolve_queue(next, registry, &ctx, queue, true, ChoiceMode::Suspend, events)
}

fn use_ability(
    next: &mut GameState,
    registry: &CardRegistry,
    player: PlayerId,
    card: InstanceId,
    ability_index: usize,
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let instance = next.instance_or_reject(card)?;
    if instance.owner != player {
        return Err(ValidationError::NotController { card, player }.into());
    }
    if !matches!(instance.zone, Zone::Board | Zone::Worldbreaker) {
        return Err(ValidationError::WrongZone {
            card,
            expected: Zone::Board,
            actual: instance.zone,
        }
        .into());
    }
    if instance.exhausted {
        return Err(ValidationError::CardExhausted(card).into());
    }
    if instance.used_abilities.contains(&ability_index) {
        return Err(ValidationError::AbilityAlreadyUsed {
            card,
            index: ability_index,
        }
        .into());
    }
    let definition = registry.get(instance.definition_id)?.clone();
    let Some(ability) = definition.abilities.get(ability_index) else {
        return Err(ValidationError::IndexOutOfRange {
            index: ability_index,
            len: definition.abilities.len(),
        }
        .into());
    };
    let Some(cost) = ability.activation_cost() else {
        return Err(ValidationError::NotActivatable {
            card,
            index: ability_index,
        }
        .into());
    };
    mutations::spend_mythium(next, player, cost)?;
    if let Some(instance) = next.instance_mut(card) {
        instance.used_abilities.push(ability_index);
    }
    events.push(GameEvent::AbilityTriggered {
        card,
        controller: player,
        ability_index,
    });

    let ctx = EffectContext::new(player, card);
    next.pending_choice = resolver::resolve_ability(
        next,
        registry,
        &ctx,
        ability,
        true,
        ChoiceMode::Suspend,
        events,
    )?;
    Ok(true)
}

fn resolve_choose_mode(
    next: &mut GameState,
    registry: &CardRegistry,
    mode_index: usize,
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let Some(PendingChoice::ChooseMode {
        player,
        source,
        mode_count,
        pending,
    }) = next.pending_choice.take()
    else {
        return Err(ValidationError::ChoiceMismatch.into());
    };
    if mode_index >= mode_count {
        return Err(ValidationError::IndexOutOfRange {
            index: mode_index,
            len: mode_count,
        }
        .into());
    }
    events.push(GameEvent::ChoiceResolved {
        player,
        kind: ChoiceKind::ChooseMode,
    });
    let definition = registry.get(next.instance_or_err(source)?.definition_id)?;
    let effects = definition.modes[mode_index].effects.clone();
    let consumes = pending.consumes_turn;
    next.pending_choice =
        resolver::continue_after_mode(next, registry, pending, effects, events)?;
    Ok(consumes && next.pending_choice.is_none())
}

fn resolve_choose_target(
    next: &mut GameState,
    registry: &CardRegistry,
    targets: &[InstanceId],
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let Some(PendingChoice::ChooseTarget {
        player,
        valid,
        max,
        effect,
        pending,
    }) = next.pending_choice.take()
    else {
        return Err(ValidationError::ChoiceMismatch.into());
    };
    check_selection(targets, &valid, 1, max as usize)?;
    events.push(GameEvent::ChoiceResolved {
        player,
        kind: ChoiceKind::ChooseTarget,
    });
    let consumes = pending.consumes_turn;
    next.pending_choice =
        resolver::continue_after_target(next, registry, &effect, pending, targets, events)?;
    Ok(consumes && next.pending_choice.is_none())
}

fn resolve_choose_discard(
    next: &mut GameState,
    registry: &CardRegistry,
    cards: &[InstanceId],
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let Some(PendingChoice::ChooseDiscard {
        player,
        count,
        valid,
        remaining,
        pending,
    }) = next.pending_choice.take()
    else {
        return Err(ValidationError::ChoiceMismatch.into());
    };
    check_selection(cards, &valid, count as usize, count as usize)?;
    events.push(GameEvent::ChoiceResolved {
        player,
        kind: ChoiceKind::ChooseDiscard,
    });
    let consumes = pending.consumes_turn;
    next.pending_choice =
        resolver::continue_after_discard(next, registry, pending, cards, remaining, events)?;
    Ok(consumes && next.pending_choice.is_none())
}

fn resolve_choose_breach(
    next: &mut GameState,
    registry: &CardRegistry,
    target: InstanceId,
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let Some(PendingChoice::ChooseBreachTarget {
        player,
        valid,
        amount,
        pending,
    }) = next.pending_choice.take()
    else {
        return Err(ValidationError::ChoiceMismatch.into());
    };
    if !valid.contains(&target) {
        return Err(ValidationError::InvalidSelection(target).into());
    }
    events.push(GameEvent::ChoiceResolved {
        player,
        kind: ChoiceKind::ChooseBreachTarget,
    });
    let consumes = pending.consumes_turn;
    next.pending_choice =
        resolver::continue_after_breach(next, registry, pending, amount, target, events)?;
    Ok(consumes && next.pending_choice.is_none())
}

/// Validates a canonical multi-card selection: ascending, distinct, within
/// the valid set, sized within bounds.
fn check_selection(
    chosen: &[InstanceId],
    valid: &[InstanceId],
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if chosen.len() < min || chosen.len() > max {
        return Err(ValidationError::SelectionCount {
            min,
            max,
            provided: chosen.len(),
        });
    }
    for pair in chosen.windows(2) {
        if pair[0] == pair[1] {
            return Err(ValidationError::DuplicateSelection(pair[0]));
        }
        if pair[0] > pair[1] {
            return Err(ValidationError::UnsortedSelection);
        }
    }
    for id in chosen {
        if !valid.contains(id) {
            return Err(ValidationError::InvalidSelection(*id));
        }
    }
    Ok(())
}
