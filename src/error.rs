//! Engine error surfaces.
//!
//! Two kinds of failure leave the engine:
//! - [`ValidationError`]: the submitted action is illegal for the current
//!   state. The input snapshot is untouched and the caller may submit a
//!   different action.
//! - [`EngineError::Internal`]: a defect in content or state construction
//!   (unknown definition id, unknown custom-resolve key). The host should
//!   treat the affected game as fatal rather than retry.

use crate::ids::{DefinitionId, InstanceId, PlayerId};
use crate::types::Guild;
use crate::zone::Zone;

/// An illegal player action. The state it was checked against is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The game has already ended.
    GameOver,
    /// It is not the acting player's turn.
    NotYourTurn(PlayerId),
    /// A choice is pending and the action does not resolve it.
    ChoicePending(PlayerId),
    /// A choice-resolution action was submitted with no choice pending.
    NoChoicePending,
    /// The pending choice is of a different kind or belongs to another player.
    ChoiceMismatch,
    /// Combat is awaiting blocker declarations from the defender.
    BlockersPending(PlayerId),
    /// A blocker declaration was submitted with no combat under way.
    NoCombat,
    /// Combat damage has already been dealt; re-resolution is forbidden.
    CombatAlreadyResolved,
    /// The referenced card instance does not exist.
    UnknownCard(InstanceId),
    /// The card is not in the zone the action requires.
    WrongZone {
        card: InstanceId,
        expected: Zone,
        actual: Zone,
    },
    /// The card is not controlled by the acting player.
    NotController { card: InstanceId, player: PlayerId },
    /// This card type cannot be played from hand.
    NotPlayable(InstanceId),
    /// Not enough mythium to pay the cost.
    InsufficientMythium { required: u32, available: u32 },
    /// The player's guild standing is below the card's requirement.
    StandingRequirement {
        guild: Guild,
        required: u32,
        available: u32,
    },
    /// An index (mode, ability) is out of range.
    IndexOutOfRange { index: usize, len: usize },
    /// The card is exhausted and cannot act.
    CardExhausted(InstanceId),
    /// The ability was already used this rally cycle.
    AbilityAlreadyUsed { card: InstanceId, index: usize },
    /// The ability at this index cannot be activated.
    NotActivatable { card: InstanceId, index: usize },
    /// The card cannot be declared as an attacker.
    CannotAttack(InstanceId),
    /// The card cannot block.
    CannotBlock(InstanceId),
    /// The id is not among the valid options for the pending selection.
    InvalidSelection(InstanceId),
    /// The same id appears twice in a selection.
    DuplicateSelection(InstanceId),
    /// A multi-card selection must list ids in ascending order.
    UnsortedSelection,
    /// The selection has the wrong number of entries.
    SelectionCount {
        min: usize,
        max: usize,
        provided: usize,
    },
    /// The deck is empty; an explicit draw is not legal.
    EmptyDeck(PlayerId),
    /// An attack declaration must name at least one attacker.
    EmptyAttack,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::GameOver => write!(f, "The game has already ended"),
            ValidationError::NotYourTurn(player) => {
                write!(f, "It is not {player}'s turn")
            }
            ValidationError::ChoicePending(player) => {
                write!(f, "A choice is pending for {player}")
            }
            ValidationError::NoChoicePending => {
                write!(f, "No choice is pending")
            }
            ValidationError::ChoiceMismatch => {
                write!(f, "The action does not match the pending choice")
            }
            ValidationError::BlockersPending(player) => {
                write!(f, "Combat is awaiting blocker declarations from {player}")
            }
            ValidationError::NoCombat => write!(f, "No combat is under way"),
            ValidationError::CombatAlreadyResolved => {
                write!(f, "Combat damage has already been dealt")
            }
            ValidationError::UnknownCard(id) => {
                write!(f, "Card instance {:?} does not exist", id)
            }
            ValidationError::WrongZone {
                card,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Card {:?} is in {:?} but must be in {:?}",
                    card, actual, expected
                )
            }
            ValidationError::NotController { card, player } => {
                write!(f, "Card {:?} is not controlled by {player}", card)
            }
            ValidationError::NotPlayable(id) => {
                write!(f, "Card {:?} cannot be played from hand", id)
            }
            ValidationError::InsufficientMythium {
                required,
                available,
            } => {
                write!(
                    f,
                    "Cost requires {required} mythium but only {available} available"
                )
            }
            ValidationError::StandingRequirement {
                guild,
                required,
                available,
            } => {
                write!(
                    f,
                    "Requires {:?} standing {required} but only {available} available",
                    guild
                )
            }
            ValidationError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} is out of range (len {len})")
            }
            ValidationError::CardExhausted(id) => {
                write!(f, "Card {:?} is exhausted", id)
            }
            ValidationError::AbilityAlreadyUsed { card, index } => {
                write!(
                    f,
                    "Ability {index} on card {:?} was already used this rally cycle",
                    card
                )
            }
            ValidationError::NotActivatable { card, index } => {
                write!(f, "Ability {index} on card {:?} cannot be activated", card)
            }
            ValidationError::CannotAttack(id) => {
                write!(f, "Card {:?} cannot attack", id)
            }
            ValidationError::CannotBlock(id) => {
                write!(f, "Card {:?} cannot block", id)
            }
            ValidationError::InvalidSelection(id) => {
                write!(f, "Card {:?} is not a valid option for this choice", id)
            }
            ValidationError::DuplicateSelection(id) => {
                write!(f, "Card {:?} appears more than once in the selection", id)
            }
            ValidationError::UnsortedSelection => {
                write!(f, "Selections must list instance ids in ascending order")
            }
            ValidationError::SelectionCount { min, max, provided } => {
                write!(
                    f,
                    "Selection requires between {min} and {max} entries but {provided} provided"
                )
            }
            ValidationError::EmptyDeck(player) => {
                write!(f, "{player}'s deck is empty")
            }
            ValidationError::EmptyAttack => {
                write!(f, "An attack must declare at least one attacker")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// An internal invariant violation, fatal to the affected game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// A definition id was not found in the registry.
    UnknownDefinition(DefinitionId),
    /// A definition id was registered twice.
    DuplicateDefinition(DefinitionId),
    /// A custom-resolve key has no registered resolver.
    UnknownCustomResolver(String),
    /// A card instance referenced by engine state does not exist.
    MissingInstance(InstanceId),
    /// The cleanup sweep failed to reach a fixpoint within its iteration cap.
    CleanupDivergence,
    /// The game configuration references content in a way decks never
    /// should (a non-worldbreaker champion, a worldbreaker in a deck list).
    InvalidConfig(String),
}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternalError::UnknownDefinition(id) => {
                write!(f, "Unknown card definition {:?}", id)
            }
            InternalError::DuplicateDefinition(id) => {
                write!(f, "Card definition {:?} is already registered", id)
            }
            InternalError::UnknownCustomResolver(key) => {
                write!(f, "Unknown custom-resolve key {key:?}")
            }
            InternalError::MissingInstance(id) => {
                write!(f, "Card instance {:?} referenced by engine state is missing", id)
            }
            InternalError::CleanupDivergence => {
                write!(f, "Cleanup sweep exceeded its iteration cap")
            }
            InternalError::InvalidConfig(reason) => {
                write!(f, "Invalid game configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for InternalError {}

/// Any failure leaving the public engine entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Illegal player input; the prior state is untouched and retryable.
    Validation(ValidationError),
    /// Content or engine defect; the host should abandon the game.
    Internal(InternalError),
}

impl EngineError {
    /// Returns true for errors caused by illegal player input.
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(err) => write!(f, "{err}"),
            EngineError::Internal(err) => write!(f, "internal error: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Validation(err) => Some(err),
            EngineError::Internal(err) => Some(err),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Validation(err)
    }
}

impl From<InternalError> for EngineError {
    fn from(err: InternalError) -> Self {
        EngineError::Internal(err)
    }
}
