//! Effect vocabulary for card abilities.
//!
//! Effects are one-shot game actions applied when an ability resolves. An
//! ability carries an ordered effect list; the resolver in
//! [`crate::resolver`] applies them strictly in declaration order. Each
//! effect names the players it touches through a [`PlayerSelector`] and the
//! cards it touches through a [`TargetSelector`], both resolved relative to
//! the ability's controller.
//!
//! Effects whose target selector matches nothing apply as a no-op; they never
//! fail the ability as a whole.

use crate::error::EngineError;
use crate::game_state::GameState;
use crate::ids::{InstanceId, PlayerId};
use crate::registry::CardRegistry;
use crate::types::{CardType, CounterKind, Guild, Keyword};
use crate::zone::Zone;

/// Which players an effect applies to, relative to the ability's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PlayerSelector {
    /// The ability's controller.
    Controller,
    /// The controller's opponent.
    Opponent,
    /// Both players, player 1 first.
    Both,
    /// The player whose turn it is.
    Active,
    /// The controller of the triggering card; falls back to the ability's
    /// controller when there is no triggering card.
    TriggeringController,
}

impl PlayerSelector {
    /// Resolves to concrete player ids. `Both` always lists player 1 first,
    /// matching the engine's fixed simultaneous-resolution order.
    pub fn resolve(
        self,
        controller: PlayerId,
        active: PlayerId,
        triggering_controller: Option<PlayerId>,
    ) -> Vec<PlayerId> {
        match self {
            PlayerSelector::Controller => vec![controller],
            PlayerSelector::Opponent => vec![controller.opponent()],
            PlayerSelector::Both => PlayerId::BOTH.to_vec(),
            PlayerSelector::Active => vec![active],
            PlayerSelector::TriggeringController => {
                vec![triggering_controller.unwrap_or(controller)]
            }
        }
    }
}

/// Which cards an effect applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TargetSelector {
    /// The ability's own card.
    This,
    /// Every card matching the filter, in card-list order.
    All(CardFilter),
    /// Up to `count` cards matching the filter, chosen by the controller
    /// through a pending-choice cycle.
    Choose { filter: CardFilter, count: u32 },
    /// The card that triggered the ability, if any.
    Triggering,
    /// The card the resolving ability originates from.
    Source,
}

/// Matches card instances on any combination of characteristics.
///
/// An empty filter matches everything. `owner` is resolved relative to the
/// ability's controller like any other player selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub struct CardFilter {
    pub card_type: Option<CardType>,
    pub guild: Option<Guild>,
    pub zone: Option<Zone>,
    pub owner: Option<PlayerSelector>,
    pub keyword: Option<Keyword>,
    /// Excludes the ability's own card from the match.
    pub exclude_source: bool,
}

impl CardFilter {
    /// A filter matching every card.
    pub fn any() -> Self {
        Self::default()
    }

    /// Followers on the board.
    pub fn board_followers() -> Self {
        Self {
            card_type: Some(CardType::Follower),
            zone: Some(Zone::Board),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: PlayerSelector) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    pub fn without_source(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    /// Evaluates the filter against one card instance.
    ///
    /// Keyword matching sees lasting keyword grants, not only printed
    /// keywords. Fails only when the instance's definition id is unknown,
    /// which is an internal error.
    pub fn matches(
        &self,
        state: &GameState,
        registry: &CardRegistry,
        controller: PlayerId,
        source: InstanceId,
        card: InstanceId,
    ) -> Result<bool, EngineError> {
        let instance = state.instance_or_err(card)?;
        let definition = registry.get(instance.definition_id)?;

        if self.exclude_source && card == source {
            return Ok(false);
        }
        if let Some(card_type) = self.card_type
            && definition.card_type != card_type
        {
            return Ok(false);
        }
        if let Some(guild) = self.guild
            && definition.guild != guild
        {
            return Ok(false);
        }
        if let Some(zone) = self.zone
            && instance.zone != zone
        {
            return Ok(false);
        }
        if let Some(owner) = self.owner {
            let owners = owner.resolve(controller, state.active_player, None);
            if !owners.contains(&instance.owner) {
                return Ok(false);
            }
        }
        if let Some(keyword) = self.keyword
            && !state.has_keyword(registry, card, keyword)?
        {
            return Ok(false);
        }
        Ok(true)
    }
}

/// When a lasting effect expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ExpiryTrigger {
    EndOfCombat,
    EndOfTurn,
    EndOfRound,
}

/// The payload of a lasting effect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LastingKind {
    /// Adds to the effective strength of the affected cards.
    StrengthModifier(i32),
    /// Grants a keyword to the affected cards.
    GrantKeyword(Keyword),
}

/// A single primitive effect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Effect {
    GainMythium {
        player: PlayerSelector,
        amount: u32,
    },
    GainPower {
        player: PlayerSelector,
        amount: u32,
    },
    GainStanding {
        player: PlayerSelector,
        guild: Guild,
        amount: u32,
    },
    Draw {
        player: PlayerSelector,
        count: u32,
    },
    /// Each resolved player chooses and discards `count` cards. Players with
    /// `count` or fewer cards in hand discard their whole hand without a
    /// choice.
    Discard {
        player: PlayerSelector,
        count: u32,
    },
    DealWounds {
        target: TargetSelector,
        amount: u32,
    },
    HealWounds {
        target: TargetSelector,
        amount: u32,
    },
    AddCounter {
        target: TargetSelector,
        counter: CounterKind,
        amount: u32,
    },
    RemoveCounter {
        target: TargetSelector,
        counter: CounterKind,
        amount: u32,
    },
    Exhaust {
        target: TargetSelector,
    },
    Ready {
        target: TargetSelector,
    },
    /// Moves the targets to their owners' discard piles outright.
    Defeat {
        target: TargetSelector,
    },
    /// Removes one stage counter from the resolving ability's own card.
    AdvanceStage,
    /// Attaches a timed modifier to the targets.
    Lasting {
        kind: LastingKind,
        target: TargetSelector,
        expires: ExpiryTrigger,
    },
    /// Dispatches to a named procedural resolver for effects outside the
    /// primitive vocabulary. An unknown key is an internal error.
    Custom(String),
}

impl Effect {
    /// The target selector this effect applies cards through, if any.
    pub fn target(&self) -> Option<&TargetSelector> {
        match self {
            Effect::DealWounds { target, .. }
            | Effect::HealWounds { target, .. }
            | Effect::AddCounter { target, .. }
            | Effect::RemoveCounter { target, .. }
            | Effect::Exhaust { target }
            | Effect::Ready { target }
            | Effect::Defeat { target }
            | Effect::Lasting { target, .. } => Some(target),
            _ => None,
        }
    }
}
