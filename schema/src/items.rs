use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum Item {
    // Healing
    Potion,
    SuperPotion,
    FullHeal,
    // Battle boosters
    XAttack,
    XDefend,
    XSpeed,
    XSpecial,
    XAccuracy,
    DireHit,
    // Evolution stones
    FireStone,
    WaterStone,
    ThunderStone,
    LeafStone,
    MoonStone,
}

impl Item {
    pub fn name(self) -> &'static str {
        match self {
            Item::Potion => "POTION",
            Item::SuperPotion => "SUPER POTION",
            Item::FullHeal => "FULL HEAL",
            Item::XAttack => "X ATTACK",
            Item::XDefend => "X DEFEND",
            Item::XSpeed => "X SPEED",
            Item::XSpecial => "X SPECIAL",
            Item::XAccuracy => "X ACCURACY",
            Item::DireHit => "DIRE HIT",
            Item::FireStone => "FIRE STONE",
            Item::WaterStone => "WATER STONE",
            Item::ThunderStone => "THUNDER STONE",
            Item::LeafStone => "LEAF STONE",
            Item::MoonStone => "MOON STONE",
        }
    }

    /// Whether the item may be picked from the in-battle bag.
    pub fn usable_in_battle(self) -> bool {
        !matches!(
            self,
            Item::FireStone | Item::WaterStone | Item::ThunderStone | Item::LeafStone | Item::MoonStone
        )
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
