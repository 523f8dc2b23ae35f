//! Ordered event log produced by every accepted action.
//!
//! Events are append-only and consumed by the presentation layer; the engine
//! never reads them back. Every state transition that matters to a viewer has
//! a corresponding variant.

use crate::game_state::{Phase, Winner};
use crate::ids::{InstanceId, PlayerId};
use crate::types::{CounterKind, Guild, Keyword};
use crate::zone::Zone;

/// A spendable or scoring resource, for resource-gain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Resource {
    Mythium,
    Power,
}

/// One step of a player's rally sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RallyStep {
    Abilities,
    Ready,
    Income,
    Draw,
}

/// One entry of the ordered event log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum GameEvent {
    TurnChanged {
        active_player: PlayerId,
        actions_taken: u8,
    },
    PhaseChanged {
        phase: Phase,
    },
    RallyStep {
        player: PlayerId,
        step: RallyStep,
    },
    AbilityTriggered {
        card: InstanceId,
        controller: PlayerId,
        ability_index: usize,
    },
    CardDefeated {
        card: InstanceId,
    },
    LocationDepleted {
        card: InstanceId,
    },
    GameOver {
        winner: Winner,
    },
    CardPlayed {
        player: PlayerId,
        card: InstanceId,
    },
    CardDrawn {
        player: PlayerId,
        card: InstanceId,
    },
    CardDiscarded {
        player: PlayerId,
        card: InstanceId,
    },
    CardMoved {
        card: InstanceId,
        from: Zone,
        to: Zone,
    },
    ResourceGained {
        player: PlayerId,
        resource: Resource,
        amount: u32,
        total: u32,
    },
    StandingGained {
        player: PlayerId,
        guild: Guild,
        amount: u32,
        total: u32,
    },
    WoundsDealt {
        card: InstanceId,
        amount: u32,
        total: u32,
    },
    CounterChanged {
        card: InstanceId,
        counter: CounterKind,
        total: u32,
    },
    AttackDeclared {
        player: PlayerId,
        attackers: Vec<InstanceId>,
    },
    BlockersDeclared {
        player: PlayerId,
        assignments: Vec<(InstanceId, InstanceId)>,
    },
    /// An unblocked attacker converted its attack into power.
    AttackerUnblocked {
        card: InstanceId,
        player: PlayerId,
    },
    FightResolved {
        attacker: PlayerId,
    },
    /// A keyword ability (bloodshed, overwhelm) fired during combat.
    KeywordTriggered {
        card: InstanceId,
        keyword: Keyword,
    },
    ChoiceRequired {
        player: PlayerId,
        kind: ChoiceKind,
    },
    ChoiceResolved {
        player: PlayerId,
        kind: ChoiceKind,
    },
}

/// The kind of a pending choice, for the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ChoiceKind {
    ChooseMode,
    ChooseDiscard,
    ChooseTarget,
    ChooseBreachTarget,
}
