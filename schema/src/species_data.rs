use crate::{Item, Move, PokemonType, Species, StatKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub special: u8,
    pub speed: u8,
}

impl BaseStats {
    pub fn get(&self, stat: StatKind) -> u8 {
        match stat {
            StatKind::Health => self.hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Special => self.special,
            StatKind::Speed => self.speed,
        }
    }

    pub fn total(&self) -> u16 {
        self.hp as u16
            + self.attack as u16
            + self.defense as u16
            + self.special as u16
            + self.speed as u16
    }
}

/// Experience curve a species levels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthRate {
    Fast,
    MediumFast,
    MediumSlow,
    Slow,
}

impl GrowthRate {
    /// Total experience required to be at `level`.
    pub fn experience_for_level(self, level: u8) -> u32 {
        let n = level as i64;
        let cube = n * n * n;
        let total = match self {
            GrowthRate::Fast => 4 * cube / 5,
            GrowthRate::MediumFast => cube,
            GrowthRate::MediumSlow => 6 * cube / 5 - 15 * n * n + 100 * n - 140,
            GrowthRate::Slow => 5 * cube / 4,
        };
        total.max(0) as u32
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Learnset {
    pub level_up: HashMap<u8, Vec<Move>>, // level -> moves learned at that level
}

impl Learnset {
    pub fn learns_at_level(&self, level: u8) -> &[Move] {
        self.level_up.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The (up to) four most recent moves a wild or fresh combatant knows at `level`.
    pub fn moves_known_at(&self, level: u8) -> Vec<Move> {
        let mut learned_moves: Vec<Move> = Vec::new();
        for learn_level in 1..=level {
            for &move_ in self.learns_at_level(learn_level) {
                if !learned_moves.contains(&move_) {
                    learned_moves.push(move_);
                }
            }
        }

        if learned_moves.len() <= 4 {
            learned_moves
        } else {
            learned_moves.split_off(learned_moves.len() - 4)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Day,
    Night,
}

/// A single condition on an evolution path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvolutionRequirement {
    /// Level at or above the threshold.
    Level(u8),
    /// An item used on (or held by) the combatant.
    Item(Item),
    /// The combatant is being traded.
    Trade,
    /// `stat` strictly greater than `other`, or equal when `allow_equal` is set.
    Stats {
        stat: StatKind,
        other: StatKind,
        allow_equal: bool,
    },
    Happiness(u8),
    Time(TimeOfDay),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionData {
    pub evolves_into: Species,
    pub requirements: Vec<EvolutionRequirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub species: Species,
    pub pokedex_number: u16,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    pub growth_rate: GrowthRate,
    pub base_exp: u16,
    pub learnset: Learnset,
    #[serde(default)]
    pub evolutions: Vec<EvolutionData>,
}
