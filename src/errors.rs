use schema::{Move, Species};
use thiserror::Error;

/// Main error type for the battle engine's public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    #[error("Move data error: {0}")]
    MoveData(#[from] MoveDataError),
    #[error("Species data error: {0}")]
    SpeciesData(#[from] SpeciesDataError),
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Config error: {0}")]
    Config(String),
}

/// Errors related to move data operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveDataError {
    #[error("Move not found: {0:?}")]
    MoveNotFound(Move),
    #[error("Malformed move data: {0}")]
    MalformedData(String),
}

/// Errors related to species data operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeciesDataError {
    #[error("Species not found: {0:?}")]
    SpeciesNotFound(Species),
    #[error("Malformed species data: {0}")]
    MalformedData(String),
}

/// Errors related to battle session lifecycle and state validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    /// A battle session is already running on this coordinator.
    #[error("A battle is already in progress")]
    BattleInProgress,
    /// The party has no combatant able to fight.
    #[error("The party has no combatant able to battle")]
    NoUsableCombatant,
    #[error("Team has no combatants")]
    EmptyTeam,
}

/// A menu choice the player is not allowed to make. The message is shown and
/// the player goes back to the menu they came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionRejection {
    #[error("{0} is already out!")]
    AlreadyActive(String),
    #[error("There's no will to fight!")]
    Fainted,
    #[error("No! There's no running from a trainer battle!")]
    NoRunningFromTrainer,
    #[error("No PP left for this move!")]
    NoPp,
    #[error("There are no items to use!")]
    NoItems,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnMoveError {
    #[error("{0:?} is already known")]
    AlreadyKnown(Move),
    #[error("no free move slot for {0:?}")]
    NoFreeSlot(Move),
    #[error("Invalid move index: {0}")]
    InvalidSlot(usize),
}

/// Errors raised while saving or loading party data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("binary encoding failed: {0}")]
    Encode(String),
    #[error("binary decoding failed: {0}")]
    Decode(String),
    #[error("JSON error: {0}")]
    Json(String),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using MoveDataError
pub type MoveDataResult<T> = Result<T, MoveDataError>;

/// Type alias for Results using SpeciesDataError
pub type SpeciesDataResult<T> = Result<T, SpeciesDataError>;

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_message() {
        let err: BattleEngineError = BattleStateError::BattleInProgress.into();
        assert_eq!(
            err.to_string(),
            "Battle state error: A battle is already in progress"
        );

        let err: BattleEngineError = MoveDataError::MoveNotFound(Move::Tackle).into();
        assert_eq!(err.to_string(), "Move data error: Move not found: Tackle");
    }

    #[test]
    fn rejections_read_as_battle_text() {
        assert_eq!(
            SelectionRejection::AlreadyActive("PIKACHU".into()).to_string(),
            "PIKACHU is already out!"
        );
        assert_eq!(
            SelectionRejection::NoRunningFromTrainer.to_string(),
            "No! There's no running from a trainer battle!"
        );
    }
}
