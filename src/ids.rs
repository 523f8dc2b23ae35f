//! Identifier newtypes for players, card instances and card definitions.

/// One of the two seats in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PlayerId {
    Player1,
    Player2,
}

impl PlayerId {
    /// Both players in fixed resolution order (player 1 first).
    pub const BOTH: [PlayerId; 2] = [PlayerId::Player1, PlayerId::Player2];

    /// The other seat.
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::Player1 => PlayerId::Player2,
            PlayerId::Player2 => PlayerId::Player1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::Player1 => 0,
            PlayerId::Player2 => 1,
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerId::Player1 => write!(f, "player1"),
            PlayerId::Player2 => write!(f, "player2"),
        }
    }
}

/// Stable identifier of a card instance.
///
/// Assigned sequentially by `create_game_state` and never reused; an instance
/// keeps its id across every zone change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId(pub u32);

impl InstanceId {
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

/// Card definition identifier, the lookup key into the [`crate::registry::CardRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_involutive() {
        assert_eq!(PlayerId::Player1.opponent(), PlayerId::Player2);
        assert_eq!(PlayerId::Player2.opponent().opponent(), PlayerId::Player2);
    }

    #[test]
    fn fixed_order_lists_player1_first() {
        assert_eq!(PlayerId::BOTH[0], PlayerId::Player1);
        assert_eq!(PlayerId::BOTH[1], PlayerId::Player2);
    }
}
