//! Pokemon Battle Engine
//!
//! Turn-based battles with Generation 1 rules, driven by a single-threaded
//! coordinator that talks to its menu, effects, party store and overworld
//! through traits. Species, moves, trainers and AI tables are RON data baked
//! into the binary.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod move_data;
pub mod pokemon;
pub mod progression;
pub mod services;
pub mod species;
pub mod store;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    BaseStats, EvolutionRequirement, GrowthRate, Item, Learnset, Move, PokemonSpecies, PokemonType,
    Species, StatKind,
};

// --- From this crate's modules (`src/`) ---

// Running a battle.
pub use battle::coordinator::{BattleCoordinator, BattleSetup};
pub use battle::rng::BattleRng;
pub use battle::state::{BattleEvent, BattleInfo, BattleOutcome, Phase};
pub use config::BattleConfig;

// Core runtime types for a battle.
pub use pokemon::{Combatant, StatusCondition};
pub use services::Services;
pub use store::{Location, SaveData};
pub use teams::{create_trainer_team, Side, Team};

// Primary data access functions.
pub use move_data::get_move_data;
pub use species::get_species_data;

// Crate-specific error and result types.
pub use errors::{
    BattleEngineError, BattleResult, BattleStateError, LearnMoveError, MoveDataError,
    MoveDataResult, SelectionRejection, SpeciesDataError, SpeciesDataResult, StoreError,
};
