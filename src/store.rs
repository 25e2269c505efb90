use crate::errors::{StoreError, StoreResult};
use crate::pokemon::Combatant;
use schema::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point on the overworld map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub map: String,
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(map: impl Into<String>, x: i32, y: i32) -> Self {
        Location {
            map: map.into(),
            x,
            y,
        }
    }
}

/// Everything that persists between battles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub player_name: String,
    pub party: Vec<Combatant>,
    pub inventory: BTreeMap<Item, u32>,
    pub badges: Vec<String>,
    pub money: u32,
    pub last_rest_point: Location,
    pub location: Location,
}

impl SaveData {
    pub fn new(player_name: impl Into<String>, party: Vec<Combatant>) -> Self {
        let home = Location::new("PALLET TOWN", 5, 6);
        SaveData {
            player_name: player_name.into(),
            party,
            inventory: BTreeMap::new(),
            badges: Vec::new(),
            money: 3000,
            last_rest_point: home.clone(),
            location: home,
        }
    }

    pub fn with_item(mut self, item: Item, count: u32) -> Self {
        *self.inventory.entry(item).or_insert(0) += count;
        self
    }

    /// Compact binary save.
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|e| StoreError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Human-readable save.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Json(e.to_string()))
    }

    pub fn from_json(source: &str) -> StoreResult<Self> {
        serde_json::from_str(source).map_err(|e| StoreError::Json(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::StatusCondition;
    use pretty_assertions::assert_eq;
    use schema::Species;

    fn sample_save() -> SaveData {
        let mut pikachu = Combatant::new(Species::Pikachu, 12, None)
            .unwrap()
            .with_nickname("SPARKY");
        pikachu.status = Some(StatusCondition::Sleep(2));
        pikachu.take_damage(7);
        let mut save = SaveData::new("RED", vec![pikachu])
            .with_item(Item::Potion, 3)
            .with_item(Item::ThunderStone, 1);
        save.badges.push("BOULDER BADGE".to_string());
        save
    }

    #[test]
    fn binary_save_preserves_the_party() {
        let save = sample_save();
        let bytes = save.to_bytes().unwrap();
        assert_eq!(SaveData::from_bytes(&bytes).unwrap(), save);
    }

    #[test]
    fn json_save_is_readable() {
        let save = sample_save();
        let json = save.to_json().unwrap();
        assert!(json.contains("\"SPARKY\""));
        assert_eq!(SaveData::from_json(&json).unwrap(), save);
    }

    #[test]
    fn truncated_binary_is_a_decode_error() {
        let bytes = sample_save().to_bytes().unwrap();
        assert!(matches!(
            SaveData::from_bytes(&bytes[..bytes.len() / 2]),
            Err(StoreError::Decode(_))
        ));
    }
}
