//! Per-player state filtering.
//!
//! `filter_state_for` produces what one player is allowed to see: the full
//! snapshot with the opponent's hidden-zone cards (deck and hand) replaced
//! by opaque placeholders. Zone and owner stay visible so clients can render
//! card backs and counts; everything else about a hidden card is withheld.
//! The viewer's own cards are never redacted, deck order included.

use crate::game_state::{
    CardInstance, Combat, GameState, LastingEffect, PendingChoice, Phase, PlayerState, Winner,
};
use crate::ids::{InstanceId, PlayerId};
use crate::zone::Zone;

/// A card as one player sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ViewCard {
    Visible(CardInstance),
    Hidden(HiddenCard),
}

impl ViewCard {
    pub fn instance(&self) -> Option<&CardInstance> {
        match self {
            ViewCard::Visible(card) => Some(card),
            ViewCard::Hidden(_) => None,
        }
    }
}

/// The opaque placeholder for an opponent's deck or hand card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct HiddenCard {
    pub hidden: bool,
    pub owner: PlayerId,
    pub zone: Zone,
}

/// One player's filtered snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerView {
    pub viewer: PlayerId,
    pub version: u64,
    pub phase: Phase,
    pub round: u32,
    pub actions_taken: u8,
    pub first_player: PlayerId,
    pub active_player: PlayerId,
    pub players: [PlayerState; 2],
    pub cards: Vec<ViewCard>,
    pub combat: Option<Combat>,
    pub pending_choice: Option<PendingChoice>,
    pub lasting_effects: Vec<LastingEffect>,
    pub winner: Option<Winner>,
}

impl PlayerView {
    /// Visible instance lookup, `None` for hidden or unknown ids.
    pub fn instance(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards
            .iter()
            .filter_map(ViewCard::instance)
            .find(|card| card.instance_id == id)
    }
}

/// Filters a snapshot down to what `viewer` may see.
pub fn filter_state_for(state: &GameState, viewer: PlayerId) -> PlayerView {
    let cards = state
        .cards
        .iter()
        .map(|card| {
            if card.owner != viewer && card.zone.is_hidden() {
                ViewCard::Hidden(HiddenCard {
                    hidden: true,
                    owner: card.owner,
                    zone: card.zone,
                })
            } else {
                ViewCard::Visible(card.clone())
            }
        })
        .collect();
    PlayerView {
        viewer,
        version: state.version,
        phase: state.phase,
        round: state.round,
        actions_taken: state.actions_taken,
        first_player: state.first_player,
        active_player: state.active_player,
        players: state.players.clone(),
        cards,
        combat: state.combat.clone(),
        pending_choice: state.pending_choice.clone(),
        lasting_effects: state.lasting_effects.clone(),
        winner: state.winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;
    use crate::game_state::create_game_state;

    fn setup() -> GameState {
        let registry = cards::starter_registry().unwrap();
        create_game_state(&registry, &cards::starter_config(5)).unwrap()
    }

    #[test]
    fn opponent_deck_and_hand_are_hidden() {
        let state = setup();
        let view = filter_state_for(&state, PlayerId::Player1);
        for (card, seen) in state.cards.iter().zip(&view.cards) {
            let should_hide = card.owner == PlayerId::Player2
                && matches!(card.zone, Zone::Deck | Zone::Hand);
            match seen {
                ViewCard::Hidden(hidden) => {
                    assert!(should_hide);
                    assert!(hidden.hidden);
                    assert_eq!(hidden.owner, card.owner);
                    assert_eq!(hidden.zone, card.zone);
                }
                ViewCard::Visible(visible) => {
                    assert!(!should_hide);
                    assert_eq!(visible, card);
                }
            }
        }
    }

    #[test]
    fn own_cards_are_fully_visible() {
        let state = setup();
        let view = filter_state_for(&state, PlayerId::Player2);
        for (card, seen) in state.cards.iter().zip(&view.cards) {
            if card.owner == PlayerId::Player2 {
                assert_eq!(seen.instance(), Some(card));
            }
        }
    }

    #[test]
    fn public_zones_are_visible_to_both() {
        let mut state = setup();
        let id = state
            .cards
            .iter()
            .find(|c| c.owner == PlayerId::Player2 && c.zone == Zone::Hand)
            .map(|c| c.instance_id)
            .unwrap();
        state.instance_mut(id).unwrap().zone = Zone::Board;
        let view = filter_state_for(&state, PlayerId::Player1);
        assert!(view.instance(id).is_some());
    }

    #[test]
    fn shared_scalars_are_unredacted() {
        let state = setup();
        let view = filter_state_for(&state, PlayerId::Player1);
        assert_eq!(view.version, state.version);
        assert_eq!(view.active_player, state.active_player);
        assert_eq!(view.players, state.players);
        assert_eq!(view.pending_choice, state.pending_choice);
    }
}
