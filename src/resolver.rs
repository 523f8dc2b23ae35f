//! Ability resolution.
//!
//! The resolver interprets an ability's effect list strictly in declaration
//! order. Effects that need a player decision suspend the walk into a
//! [`PendingChoice`] carrying the remaining queue; the matching choice action
//! later resumes it through one of the `continue_after_*` entry points.
//!
//! Rally-timing abilities resolve in [`ChoiceMode::Auto`], where choices
//! degrade to deterministic first-candidate picks instead of suspending, so
//! the rally sequence never blocks on player input.

use tracing::trace;

use crate::card::{Ability, AbilityResolve};
use crate::effect::{CardFilter, Effect, PlayerSelector, TargetSelector};
use crate::error::{EngineError, InternalError};
use crate::game_event::{ChoiceKind, GameEvent};
use crate::game_state::{
    BREACH_WOUNDS, GameState, LastingEffect, PendingAbility, PendingChoice,
};
use crate::ids::{InstanceId, PlayerId};
use crate::mutations;
use crate::registry::CardRegistry;
use crate::types::CounterKind;
use crate::zone::Zone;

/// How the resolver behaves when an effect needs a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMode {
    /// Suspend into a pending choice and wait for the player.
    Suspend,
    /// Pick the first candidates deterministically (rally resolution).
    Auto,
}

/// Who an ability resolves for and where it comes from.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext {
    pub controller: PlayerId,
    /// The card the resolving ability originates from.
    pub source: InstanceId,
    /// The card that triggered the ability, if any.
    pub triggering: Option<InstanceId>,
}

impl EffectContext {
    pub fn new(controller: PlayerId, source: InstanceId) -> Self {
        Self {
            controller,
            source,
            triggering: None,
        }
    }

    fn from_pending(pending: &PendingAbility) -> Self {
        Self {
            controller: pending.controller,
            source: pending.source,
            triggering: pending.triggering,
        }
    }

    fn suspend(&self, queue: Vec<Effect>, consumes_turn: bool) -> PendingAbility {
        PendingAbility {
            controller: self.controller,
            source: self.source,
            triggering: self.triggering,
            queue,
            consumes_turn,
        }
    }
}

/// Resolves one ability from scratch.
pub fn resolve_ability(
    state: &mut GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    ability: &Ability,
    consumes_turn: bool,
    mode: ChoiceMode,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    let queue = match &ability.resolve {
        AbilityResolve::Effects(effects) => effects.clone(),
        AbilityResolve::Custom(key) => vec![Effect::Custom(key.clone())],
    };
    resolve_queue(state, registry, ctx, queue, consumes_turn, mode, events)
}

/// Resolves an effect queue until it finishes or suspends.
pub fn resolve_queue(
    state: &mut GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    mut queue: Vec<Effect>,
    consumes_turn: bool,
    mode: ChoiceMode,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    while !queue.is_empty() {
        let effect = queue.remove(0);
        trace!(?effect, controller = %ctx.controller, "resolving effect");
        match effect {
            Effect::GainMythium { player, amount } => {
                for target in resolve_players(state, ctx, player) {
                    mutations::gain_mythium(state, target, amount, events);
                }
            }
            Effect::GainPower { player, amount } => {
                for target in resolve_players(state, ctx, player) {
                    mutations::gain_power(state, target, amount, events);
                }
            }
            Effect::GainStanding {
                player,
                guild,
                amount,
            } => {
                for target in resolve_players(state, ctx, player) {
                    mutations::gain_standing(state, target, guild, amount, events);
                }
            }
            Effect::Draw { player, count } => {
                for target in resolve_players(state, ctx, player) {
                    for _ in 0..count {
                        mutations::draw_card(state, target, events);
                    }
                }
            }
            Effect::Discard { player, count } => {
                let remaining: Vec<(PlayerId, u32)> = resolve_players(state, ctx, player)
                    .into_iter()
                    .map(|target| (target, count))
                    .collect();
                return run_discard_chain(
                    state, registry, ctx, remaining, queue, consumes_turn, mode, events,
                );
            }
            Effect::AdvanceStage => {
                mutations::remove_counter(state, ctx.source, CounterKind::Stage, 1, events)?;
            }
            Effect::Custom(key) => {
                if let Some(choice) = resolve_custom(
                    state, registry, ctx, &key, &mut queue, consumes_turn, mode, events,
                )? {
                    return Ok(Some(choice));
                }
            }
            targeted @ (Effect::DealWounds { .. }
            | Effect::HealWounds { .. }
            | Effect::AddCounter { .. }
            | Effect::RemoveCounter { .. }
            | Effect::Exhaust { .. }
            | Effect::Ready { .. }
            | Effect::Defeat { .. }
            | Effect::Lasting { .. }) => {
                // Targeted effects share the selector machinery. `Choose`
                // either suspends or degrades per the choice mode; matching
                // nothing is a no-op, never a failure.
                let Some(selector) = targeted.target().cloned() else {
                    continue;
                };
                match selector {
                    TargetSelector::Choose { filter, count } => {
                        let mut candidates = matching_cards(state, registry, ctx, &filter)?;
                        if candidates.is_empty() {
                            continue;
                        }
                        match mode {
                            ChoiceMode::Auto => {
                                candidates.truncate(count as usize);
                                apply_to_cards(state, registry, ctx, &targeted, &candidates, events)?;
                            }
                            ChoiceMode::Suspend => {
                                candidates.sort();
                                events.push(GameEvent::ChoiceRequired {
                                    player: ctx.controller,
                                    kind: ChoiceKind::ChooseTarget,
                                });
                                return Ok(Some(PendingChoice::ChooseTarget {
                                    player: ctx.controller,
                                    valid: candidates,
                                    max: count,
                                    effect: targeted,
                                    pending: ctx.suspend(queue, consumes_turn),
                                }));
                            }
                        }
                    }
                    other => {
                        let targets = fixed_targets(state, registry, ctx, &other)?;
                        apply_to_cards(state, registry, ctx, &targeted, &targets, events)?;
                    }
                }
            }
        }
    }
    Ok(None)
}

/// Resumes after a `choose_target` answer: applies the suspended effect to
/// the chosen cards, then the rest of the queue.
pub fn continue_after_target(
    state: &mut GameState,
    registry: &CardRegistry,
    effect: &Effect,
    pending: PendingAbility,
    chosen: &[InstanceId],
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    let ctx = EffectContext::from_pending(&pending);
    apply_to_cards(state, registry, &ctx, effect, chosen, events)?;
    resolve_queue(
        state,
        registry,
        &ctx,
        pending.queue,
        pending.consumes_turn,
        ChoiceMode::Suspend,
        events,
    )
}

/// Resumes after a `choose_discard` answer: discards the chosen cards, works
/// through the players still owing a discard, then the rest of the queue.
pub fn continue_after_discard(
    state: &mut GameState,
    registry: &CardRegistry,
    pending: PendingAbility,
    chosen: &[InstanceId],
    remaining: Vec<(PlayerId, u32)>,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    let ctx = EffectContext::from_pending(&pending);
    for &id in chosen {
        mutations::discard_card(state, id, events)?;
    }
    run_discard_chain(
        state,
        registry,
        &ctx,
        remaining,
        pending.queue,
        pending.consumes_turn,
        ChoiceMode::Suspend,
        events,
    )
}

/// Resumes after a `choose_breach_target` answer.
pub fn continue_after_breach(
    state: &mut GameState,
    registry: &CardRegistry,
    pending: PendingAbility,
    amount: u32,
    target: InstanceId,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    let ctx = EffectContext::from_pending(&pending);
    mutations::add_counter(state, target, CounterKind::Wound, amount, events)?;
    resolve_queue(
        state,
        registry,
        &ctx,
        pending.queue,
        pending.consumes_turn,
        ChoiceMode::Suspend,
        events,
    )
}

/// Resumes after a `choose_mode` answer: queues the chosen mode's effects in
/// front of whatever the pending ability still carried.
pub fn continue_after_mode(
    state: &mut GameState,
    registry: &CardRegistry,
    pending: PendingAbility,
    mode_effects: Vec<Effect>,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    let ctx = EffectContext::from_pending(&pending);
    let mut queue = mode_effects;
    queue.extend(pending.queue);
    resolve_queue(
        state,
        registry,
        &ctx,
        queue,
        pending.consumes_turn,
        ChoiceMode::Suspend,
        events,
    )
}

/// Works through a list of (player, count) discards in fixed order,
/// suspending on the first player who actually has a choice to make.
#[allow(clippy::too_many_arguments)]
fn run_discard_chain(
    state: &mut GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    mut remaining: Vec<(PlayerId, u32)>,
    queue: Vec<Effect>,
    consumes_turn: bool,
    mode: ChoiceMode,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    while let Some(&(player, count)) = remaining.first() {
        let hand = state.cards_in_zone(player, Zone::Hand);
        if mode == ChoiceMode::Auto || hand.len() <= count as usize {
            for id in hand.into_iter().take(count as usize) {
                mutations::discard_card(state, id, events)?;
            }
            remaining.remove(0);
        } else {
            let mut valid = hand;
            valid.sort();
            events.push(GameEvent::ChoiceRequired {
                player,
                kind: ChoiceKind::ChooseDiscard,
            });
            return Ok(Some(PendingChoice::ChooseDiscard {
                player,
                count,
                valid,
                remaining: remaining[1..].to_vec(),
                pending: ctx.suspend(queue, consumes_turn),
            }));
        }
    }
    resolve_queue(state, registry, ctx, queue, consumes_turn, mode, events)
}

/// Named procedural resolvers for effects outside the primitive vocabulary.
/// The key set is closed; an unknown key is a content defect.
#[allow(clippy::too_many_arguments)]
fn resolve_custom(
    state: &mut GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    key: &str,
    queue: &mut Vec<Effect>,
    consumes_turn: bool,
    mode: ChoiceMode,
    events: &mut Vec<GameEvent>,
) -> Result<Option<PendingChoice>, EngineError> {
    match key {
        // The worldbreaker tears at the enemy board: 2 wounds to one
        // opposing board card of the controller's choice.
        "worldbreaker_breach" => {
            let filter = CardFilter::any()
                .with_zone(Zone::Board)
                .with_owner(PlayerSelector::Opponent);
            let mut valid = matching_cards(state, registry, ctx, &filter)?;
            if valid.is_empty() {
                return Ok(None);
            }
            if mode == ChoiceMode::Auto {
                mutations::add_counter(state, valid[0], CounterKind::Wound, BREACH_WOUNDS, events)?;
                return Ok(None);
            }
            valid.sort();
            events.push(GameEvent::ChoiceRequired {
                player: ctx.controller,
                kind: ChoiceKind::ChooseBreachTarget,
            });
            Ok(Some(PendingChoice::ChooseBreachTarget {
                player: ctx.controller,
                valid,
                amount: BREACH_WOUNDS,
                pending: ctx.suspend(std::mem::take(queue), consumes_turn),
            }))
        }
        // Each player chooses and discards a card, then the controller
        // gains 1 power. Expands into primitives so the discard chain and
        // the trailing gain reuse the ordinary queue machinery.
        "rite_of_tribute" => {
            queue.insert(
                0,
                Effect::GainPower {
                    player: PlayerSelector::Controller,
                    amount: 1,
                },
            );
            queue.insert(
                0,
                Effect::Discard {
                    player: PlayerSelector::Both,
                    count: 1,
                },
            );
            Ok(None)
        }
        _ => Err(InternalError::UnknownCustomResolver(key.to_string()).into()),
    }
}

/// Applies one targeted effect to a concrete target list. An empty list is a
/// no-op.
fn apply_to_cards(
    state: &mut GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    effect: &Effect,
    targets: &[InstanceId],
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let _ = registry;
    match effect {
        Effect::DealWounds { amount, .. } => {
            for &id in targets {
                mutations::add_counter(state, id, CounterKind::Wound, *amount, events)?;
            }
        }
        Effect::HealWounds { amount, .. } => {
            for &id in targets {
                mutations::remove_counter(state, id, CounterKind::Wound, *amount, events)?;
            }
        }
        Effect::AddCounter {
            counter, amount, ..
        } => {
            for &id in targets {
                mutations::add_counter(state, id, *counter, *amount, events)?;
            }
        }
        Effect::RemoveCounter {
            counter, amount, ..
        } => {
            for &id in targets {
                mutations::remove_counter(state, id, *counter, *amount, events)?;
            }
        }
        Effect::Exhaust { .. } => {
            for &id in targets {
                if let Some(card) = state.instance_mut(id) {
                    card.exhausted = true;
                }
            }
        }
        Effect::Ready { .. } => {
            for &id in targets {
                if let Some(card) = state.instance_mut(id) {
                    card.exhausted = false;
                }
            }
        }
        Effect::Defeat { .. } => {
            for &id in targets {
                mutations::move_card(state, id, Zone::Discard, events)?;
                events.push(GameEvent::CardDefeated { card: id });
            }
        }
        Effect::Lasting { kind, expires, .. } => {
            if !targets.is_empty() {
                let id = state.allocate_effect_id();
                state.lasting_effects.push(LastingEffect {
                    id,
                    kind: kind.clone(),
                    targets: targets.to_vec(),
                    expires: *expires,
                });
            }
        }
        // Player-scoped effects never reach this path.
        _ => {}
    }
    Ok(())
}

fn resolve_players(
    state: &GameState,
    ctx: &EffectContext,
    selector: PlayerSelector,
) -> Vec<PlayerId> {
    let triggering_controller = ctx
        .triggering
        .and_then(|id| state.instance(id))
        .map(|card| card.owner);
    selector.resolve(ctx.controller, state.active_player, triggering_controller)
}

/// All cards matching a filter, in card-list order.
pub fn matching_cards(
    state: &GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    filter: &CardFilter,
) -> Result<Vec<InstanceId>, EngineError> {
    let ids: Vec<InstanceId> = state.cards.iter().map(|card| card.instance_id).collect();
    let mut matched = Vec::new();
    for id in ids {
        if filter.matches(state, registry, ctx.controller, ctx.source, id)? {
            matched.push(id);
        }
    }
    Ok(matched)
}

/// Resolves a non-choosing target selector to concrete ids.
fn fixed_targets(
    state: &GameState,
    registry: &CardRegistry,
    ctx: &EffectContext,
    selector: &TargetSelector,
) -> Result<Vec<InstanceId>, EngineError> {
    match selector {
        TargetSelector::This | TargetSelector::Source => Ok(vec![ctx.source]),
        TargetSelector::Triggering => Ok(ctx.triggering.into_iter().collect()),
        TargetSelector::All(filter) => matching_cards(state, registry, ctx, filter),
        TargetSelector::Choose { .. } => Ok(Vec::new()),
    }
}
