//! Cleanup fixpoint sweep.
//!
//! Runs after every state-mutating step. One pass moves defeated board
//! followers and depleted board locations to the discard pile; if anything
//! moved, the pass repeats, because a defeat can cascade (an overwhelm bonus
//! can defeat a second card the next pass must catch). Each pass can only
//! remove cards from the board, so the pass count is bounded by the board
//! size; the explicit cap is purely a stuck-state detector.

use tracing::debug;

use crate::error::{EngineError, InternalError};
use crate::game_event::GameEvent;
use crate::game_state::GameState;
use crate::mutations;
use crate::registry::CardRegistry;
use crate::types::{CardType, CounterKind};
use crate::zone::Zone;

/// Sweeps the board to a fixpoint. Idempotent: a clean board produces no
/// moves and no events.
pub fn run_cleanup(
    state: &mut GameState,
    registry: &CardRegistry,
    events: &mut Vec<GameEvent>,
) -> Result<(), EngineError> {
    let cap = state.all_in_zone(Zone::Board).len() + 1;
    for pass in 0..=cap {
        if pass == cap {
            return Err(InternalError::CleanupDivergence.into());
        }
        if !sweep_once(state, registry, events)? {
            if pass > 0 {
                debug!(passes = pass, "cleanup reached fixpoint");
            }
            return Ok(());
        }
    }
    unreachable!("loop either returns or errors at the cap");
}

/// One pass. Returns true if any card left the board.
fn sweep_once(
    state: &mut GameState,
    registry: &CardRegistry,
    events: &mut Vec<GameEvent>,
) -> Result<bool, EngineError> {
    let board = state.all_in_zone(Zone::Board);
    let mut moved = false;
    for id in board {
        let definition_id = state.instance_or_err(id)?.definition_id;
        let definition = registry.get(definition_id)?;
        match definition.card_type {
            CardType::Follower => {
                if state.is_defeated(registry, id)? {
                    mutations::move_card(state, id, Zone::Discard, events)?;
                    events.push(GameEvent::CardDefeated { card: id });
                    moved = true;
                }
            }
            CardType::Location => {
                if state.instance_or_err(id)?.counter(CounterKind::Stage) == 0 {
                    mutations::move_card(state, id, Zone::Discard, events)?;
                    events.push(GameEvent::LocationDepleted { card: id });
                    moved = true;
                }
            }
            _ => {}
        }
    }
    Ok(moved)
}
