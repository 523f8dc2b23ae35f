//! Guildfall rules engine.
//!
//! A deterministic, pure-functional rules engine for a two-player card game.
//! The host drives it through three entry points:
//!
//! - [`create_game_state`] builds the opening snapshot from a configuration
//!   and seed.
//! - [`process_action`] validates one [`ActionRequest`] against a snapshot
//!   and returns the next snapshot plus the events the action produced. The
//!   input snapshot is never mutated; rejected actions return a
//!   [`ValidationError`] and change nothing.
//! - [`legal_actions`] enumerates exactly the requests `process_action`
//!   would accept.
//!
//! Identical inputs always produce identical outputs: shuffling uses a
//! counter-based generator threaded through the seed, and no entry point
//! reads clocks or ambient randomness. [`filter_state_for`] projects a
//! snapshot down to what one player may see for transport to clients.

pub mod actions;
pub mod card;
pub mod cards;
pub mod cleanup;
pub mod combat;
pub mod effect;
pub mod error;
pub mod game_event;
pub mod game_state;
pub mod ids;
pub mod legal;
pub mod mutations;
pub mod registry;
pub mod resolver;
pub mod rng;
pub mod turn;
pub mod types;
pub mod view;
pub mod zone;

pub use actions::{ActionOutcome, ActionRequest, PlayerAction, process_action};
pub use card::{Ability, AbilityResolve, AbilityTiming, CardDefinition, CardDefinitionBuilder, Mode};
pub use effect::{
    CardFilter, Effect, ExpiryTrigger, LastingKind, PlayerSelector, TargetSelector,
};
pub use error::{EngineError, InternalError, ValidationError};
pub use game_event::{ChoiceKind, GameEvent, RallyStep, Resource};
pub use game_state::{
    BlockerAssignment, CardInstance, Combat, DeckConfig, GameConfig, GameState, LastingEffect,
    PendingAbility, PendingChoice, Phase, PlayerState, Winner, create_game_state,
};
pub use ids::{DefinitionId, InstanceId, PlayerId};
pub use legal::legal_actions;
pub use registry::CardRegistry;
pub use types::{CardType, CounterKind, Guild, Keyword};
pub use view::{HiddenCard, PlayerView, ViewCard, filter_state_for};
pub use zone::Zone;
