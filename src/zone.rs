//! Game zones and their visibility rules.

/// The zone a card instance currently occupies.
///
/// Zone transitions are always explicit and atomic; an instance is in exactly
/// one zone at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Zone {
    Deck,
    Hand,
    Board,
    Discard,
    Worldbreaker,
}

impl Zone {
    /// Returns true if cards in this zone are visible to both players.
    pub fn is_public(&self) -> bool {
        matches!(self, Zone::Board | Zone::Discard | Zone::Worldbreaker)
    }

    /// Returns true if cards in this zone are private to their owner.
    pub fn is_hidden(&self) -> bool {
        matches!(self, Zone::Deck | Zone::Hand)
    }

    /// Returns true if card order matters in this zone.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Zone::Deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_visibility() {
        assert!(Zone::Board.is_public());
        assert!(Zone::Discard.is_public());
        assert!(Zone::Worldbreaker.is_public());

        assert!(Zone::Deck.is_hidden());
        assert!(Zone::Hand.is_hidden());
    }

    #[test]
    fn zone_ordering() {
        assert!(Zone::Deck.is_ordered());
        assert!(!Zone::Hand.is_ordered());
        assert!(!Zone::Board.is_ordered());
    }
}
