use crate::errors::{BattleEngineError, BattleResult};
use serde::{Deserialize, Serialize};

/// Tunables for a battle coordinator. Every field has a default matching the
/// stock rules, so a RON file only needs the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for the battle RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Headless menus advance dialog on their own instead of waiting for input.
    pub auto_advance: bool,
    /// Added to the flee score per attempt made this battle.
    pub flee_attempt_bonus: u32,
    /// Starting priority for every candidate move. Lower is preferred.
    pub base_priority: i32,
    /// Penalty on status-only moves when the defender already has a status.
    pub status_move_penalty: i32,
    /// Experience multiplier when the defeated side belonged to a trainer.
    pub trainer_experience_multiplier: f64,
    /// Money kept on a whiteout, as a divisor of the current total.
    pub whiteout_money_divisor: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            seed: None,
            auto_advance: true,
            flee_attempt_bonus: 30,
            base_priority: 10,
            status_move_penalty: 5,
            trainer_experience_multiplier: 1.5,
            whiteout_money_divisor: 2,
        }
    }
}

impl BattleConfig {
    pub fn from_ron(source: &str) -> BattleResult<Self> {
        ron::from_str(source).map_err(|e| BattleEngineError::Config(e.to_string()))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = BattleConfig::from_ron("(seed: Some(7), flee_attempt_bonus: 40)").unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.flee_attempt_bonus, 40);
        assert_eq!(config.base_priority, 10);
        assert_eq!(config.trainer_experience_multiplier, 1.5);
    }

    #[test]
    fn malformed_ron_is_a_config_error() {
        assert!(matches!(
            BattleConfig::from_ron("(seed: \"x\")"),
            Err(BattleEngineError::Config(_))
        ));
    }
}
