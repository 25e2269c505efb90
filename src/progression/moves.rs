use crate::errors::LearnMoveError;
use crate::pokemon::{Combatant, MoveSlot, MAX_MOVES};
use crate::species::species_data;
use schema::{Move, Species};

/// Moves the species picks up on reaching exactly `level`.
pub fn moves_learned_at_level(species: Species, level: u8) -> Vec<Move> {
    species_data(species).learnset.learns_at_level(level).to_vec()
}

/// Teach `move_`, replacing the slot at `forget` when the move list is full.
/// Returns the move that was forgotten, if any.
pub fn learn_move(
    combatant: &mut Combatant,
    move_: Move,
    forget: Option<usize>,
) -> Result<Option<Move>, LearnMoveError> {
    if combatant.knows(move_) {
        return Err(LearnMoveError::AlreadyKnown(move_));
    }
    if combatant.moves.len() < MAX_MOVES {
        combatant.moves.push(MoveSlot::new(move_));
        return Ok(None);
    }
    let index = forget.ok_or(LearnMoveError::NoFreeSlot(move_))?;
    let slot = combatant
        .moves
        .get_mut(index)
        .ok_or(LearnMoveError::InvalidSlot(index))?;
    let forgotten = std::mem::replace(slot, MoveSlot::new(move_));
    Ok(Some(forgotten.move_))
}
