//! What a combatant carries away from a battle: experience, levels, new moves
//! and evolutions.

pub mod evolution;
pub mod experience;
pub mod moves;

pub use evolution::{check_evolutions, evolve, EvolutionModifier};
pub use experience::{award_effort, experience_yield, gain_experience};
pub use moves::{learn_move, moves_learned_at_level};
