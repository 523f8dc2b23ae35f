//! Core characteristic enums: card types, guilds, keywords and counters.

/// The printed type of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CardType {
    /// A player's permanent guild champion, present from game start.
    Worldbreaker,
    /// A board card that can attack and block.
    Follower,
    /// A one-shot card that resolves and goes to the discard pile.
    Event,
    /// A board card with stage counters that depletes over time.
    Location,
}

/// The five guilds. Guild alignment gates standing requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Guild {
    Ember,
    Gale,
    Stone,
    Thorn,
    Veil,
}

impl Guild {
    /// All guilds in fixed enumeration order.
    pub const ALL: [Guild; 5] = [
        Guild::Ember,
        Guild::Gale,
        Guild::Stone,
        Guild::Thorn,
        Guild::Veil,
    ];
}

/// Keyword abilities that modify combat behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Keyword {
    /// Deals one extra wound to each blocker after pair damage.
    Bloodshed,
    /// The controller gains a bonus when this card's attack defeats a blocker.
    Overwhelm,
    /// Cannot be declared as an attacker.
    Stationary,
}

/// Counter kinds that can sit on a card instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CounterKind {
    /// Damage; a card is defeated when wounds reach its effective health.
    Wound,
    /// Skips readying during rally, one counter removed per rally instead.
    Stun,
    /// Remaining stages on a location; at zero the location depletes.
    Stage,
    /// Permanent +1 strength per counter.
    StrengthBuff,
}
