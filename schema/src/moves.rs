use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// Every move title the battle engine knows about. Per-move numbers live in
/// the move data asset, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Move {
    // Normal
    Tackle,
    Scratch,
    QuickAttack,
    Slash,
    Bite,
    HyperFang,
    MegaPunch,
    Growl,
    TailWhip,
    Harden,
    FocusEnergy,
    Struggle,
    // Fighting
    KarateChop,
    LowKick,
    RollingKick,
    // Fire
    Ember,
    Flamethrower,
    // Water
    Bubble,
    WaterGun,
    Surf,
    // Grass
    VineWhip,
    RazorLeaf,
    SleepPowder,
    PoisonPowder,
    // Electric
    ThunderShock,
    Thunderbolt,
    ThunderWave,
    // Flying
    Gust,
    WingAttack,
    // Rock / Ground
    RockThrow,
    Fissure,
    // Psychic
    Confusion,
    Psychic,
    Agility,
    Amnesia,
    // Ice
    IceBeam,
}

impl Move {
    /// Human readable title, e.g. `QuickAttack` -> "Quick Attack".
    pub fn name(self) -> String {
        let debug_string = format!("{:?}", self);
        debug_string
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if i > 0 && c.is_uppercase() {
                    format!(" {}", c)
                } else {
                    c.to_string()
                }
            })
            .collect()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
