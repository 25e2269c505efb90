use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Species {
    Bulbasaur,
    Ivysaur,
    Charmander,
    Charmeleon,
    Squirtle,
    Wartortle,
    Pichu,
    Pikachu,
    Raichu,
    Rattata,
    Raticate,
    Pidgey,
    Pidgeotto,
    Geodude,
    Graveler,
    Golem,
    Abra,
    Kadabra,
    Alakazam,
    Eevee,
    Vaporeon,
    Jolteon,
    Flareon,
    Espeon,
    Tyrogue,
    Hitmonlee,
    Hitmonchan,
    Hitmontop,
}

impl Species {
    /// Display name used in battle text.
    pub fn name(self) -> &'static str {
        match self {
            Species::Bulbasaur => "BULBASAUR",
            Species::Ivysaur => "IVYSAUR",
            Species::Charmander => "CHARMANDER",
            Species::Charmeleon => "CHARMELEON",
            Species::Squirtle => "SQUIRTLE",
            Species::Wartortle => "WARTORTLE",
            Species::Pichu => "PICHU",
            Species::Pikachu => "PIKACHU",
            Species::Raichu => "RAICHU",
            Species::Rattata => "RATTATA",
            Species::Raticate => "RATICATE",
            Species::Pidgey => "PIDGEY",
            Species::Pidgeotto => "PIDGEOTTO",
            Species::Geodude => "GEODUDE",
            Species::Graveler => "GRAVELER",
            Species::Golem => "GOLEM",
            Species::Abra => "ABRA",
            Species::Kadabra => "KADABRA",
            Species::Alakazam => "ALAKAZAM",
            Species::Eevee => "EEVEE",
            Species::Vaporeon => "VAPOREON",
            Species::Jolteon => "JOLTEON",
            Species::Flareon => "FLAREON",
            Species::Espeon => "ESPEON",
            Species::Tyrogue => "TYROGUE",
            Species::Hitmonlee => "HITMONLEE",
            Species::Hitmonchan => "HITMONCHAN",
            Species::Hitmontop => "HITMONTOP",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
