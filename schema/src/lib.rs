// Pokemon Battle Schema - Shared type definitions
// This crate contains the core enums and static data shapes shared between the
// battle engine and its RON data assets. Nothing in here mutates at runtime.

// Re-export the main types
pub use items::*;
pub use moves::*;
pub use pokemon_types::*;
pub use species::*;
pub use species_data::*;

pub mod items;
pub mod moves;
pub mod pokemon_types;
pub mod species;
pub mod species_data;
