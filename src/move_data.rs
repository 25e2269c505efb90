use crate::errors::{MoveDataError, MoveDataResult};
use schema::{Move, PokemonType, StatKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

// Move table, parsed once on first access.
static MOVE_DATA: LazyLock<MoveDataResult<HashMap<Move, MoveData>>> =
    LazyLock::new(|| MoveData::parse_table(include_str!("../data/moves.ron")));

/// Non-volatile status a move can inflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusType {
    Sleep,
    Poison,
    Burn,
    Freeze,
    Paralysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEffect {
    /// Ordinary base-power damage.
    Damage,
    /// Knocks the target out outright when it lands.
    OneHitKnockOut,
    /// Inflict a status with the given percent chance.
    InflictStatus(StatusType, u8),
    /// Raise or lower a statistic by the given number of stages.
    StatChange(Target, StatKind, i8),
    /// Sets the user's raised-critical flag.
    RaiseCritical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub move_: Move,
    pub move_type: PokemonType,
    pub power: Option<u16>,
    /// Percent; `None` never misses.
    pub accuracy: Option<u8>,
    pub max_pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub high_critical: bool,
    #[serde(default)]
    pub effects: Vec<MoveEffect>,
}

impl MoveData {
    fn parse_table(source: &str) -> MoveDataResult<HashMap<Move, MoveData>> {
        let entries: Vec<MoveData> =
            ron::from_str(source).map_err(|e| MoveDataError::MalformedData(e.to_string()))?;
        Ok(entries.into_iter().map(|data| (data.move_, data)).collect())
    }

    /// Look up the static data for a move.
    pub fn get_move_data(move_: Move) -> MoveDataResult<&'static MoveData> {
        let table = MOVE_DATA.as_ref().map_err(Clone::clone)?;
        table.get(&move_).ok_or(MoveDataError::MoveNotFound(move_))
    }

    pub fn deals_damage(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, MoveEffect::Damage | MoveEffect::OneHitKnockOut))
    }

    /// A move whose only job is inflicting a status (Thunder Wave, Sleep Powder).
    pub fn is_status_only(&self) -> bool {
        !self.deals_damage()
            && self
                .effects
                .iter()
                .any(|effect| matches!(effect, MoveEffect::InflictStatus(..)))
    }

    /// Statistics this move raises or lowers, on either side.
    pub fn modified_stats(&self) -> impl Iterator<Item = StatKind> + '_ {
        self.effects.iter().filter_map(|effect| match effect {
            MoveEffect::StatChange(_, stat, _) => Some(*stat),
            _ => None,
        })
    }
}

/// Panicking lookup for use inside the simulation, where every move in play
/// has already been validated against the table.
pub fn get_move_data(move_: Move) -> &'static MoveData {
    match MoveData::get_move_data(move_) {
        Ok(data) => data,
        Err(err) => panic!("move data lookup failed: {err}"),
    }
}

pub fn get_move_max_pp(move_: Move) -> u8 {
    get_move_data(move_).max_pp
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_move_has_data() {
        for move_ in Move::iter() {
            assert!(
                MoveData::get_move_data(move_).is_ok(),
                "{move_:?} is missing from the move table"
            );
        }
    }

    #[test]
    fn move_classification() {
        assert!(get_move_data(Move::ThunderWave).is_status_only());
        assert!(!get_move_data(Move::ThunderShock).is_status_only());
        assert!(!get_move_data(Move::Growl).is_status_only());
        assert!(get_move_data(Move::Fissure).deals_damage());
        assert_eq!(get_move_data(Move::QuickAttack).priority, 1);
        assert!(get_move_data(Move::Slash).high_critical);
        assert_eq!(
            get_move_data(Move::Agility).modified_stats().collect::<Vec<_>>(),
            vec![StatKind::Speed]
        );
    }
}
