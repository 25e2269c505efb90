use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::trace;

/// Randomness for one battle. Every draw names the reason it was made so that
/// scripted tests fail with a useful message when they run dry.
#[derive(Debug, Clone)]
pub enum BattleRng {
    Seeded(StdRng),
    /// Fixed unit values in `[0, 1)`, consumed front to back.
    Scripted(VecDeque<f64>),
}

impl BattleRng {
    pub fn seeded(seed: u64) -> Self {
        BattleRng::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn from_os() -> Self {
        BattleRng::Seeded(StdRng::from_os_rng())
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os(),
        }
    }

    pub fn new_for_test(outcomes: impl IntoIterator<Item = f64>) -> Self {
        BattleRng::Scripted(outcomes.into_iter().collect())
    }

    /// Values left in a scripted RNG. Seeded RNGs never run out.
    pub fn remaining(&self) -> Option<usize> {
        match self {
            BattleRng::Seeded(_) => None,
            BattleRng::Scripted(outcomes) => Some(outcomes.len()),
        }
    }

    fn next_unit(&mut self, reason: &str) -> f64 {
        let value = match self {
            BattleRng::Seeded(rng) => rng.random::<f64>(),
            BattleRng::Scripted(outcomes) => match outcomes.pop_front() {
                Some(value) => value,
                None => panic!(
                    "BattleRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                    reason
                ),
            },
        };
        trace!(value, reason, "rng draw");
        value
    }

    /// Uniform integer in `[0, bound)`; 0 when `bound` is 0.
    pub fn random_int(&mut self, bound: u32, reason: &str) -> u32 {
        if bound == 0 {
            return 0;
        }
        match self {
            BattleRng::Seeded(rng) => {
                let value = rng.random_range(0..bound);
                trace!(value, bound, reason, "rng draw");
                value
            }
            BattleRng::Scripted(_) => {
                let unit = self.next_unit(reason);
                ((unit * bound as f64) as u32).min(bound - 1)
            }
        }
    }

    /// Uniform float in `[low, high)`.
    pub fn random_range(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        low + self.next_unit(reason) * (high - low)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64, reason: &str) -> bool {
        match self {
            BattleRng::Seeded(rng) => {
                let hit = rng.random_bool(p.clamp(0.0, 1.0));
                trace!(p, hit, reason, "rng draw");
                hit
            }
            BattleRng::Scripted(_) => self.next_unit(reason) < p,
        }
    }

    /// A uniformly chosen member of `items`.
    pub fn choose<'a, T>(&mut self, items: &'a [T], reason: &str) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random_int(items.len() as u32, reason) as usize;
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_values_map_onto_ranges() {
        let mut rng = BattleRng::new_for_test([0.0, 0.999, 0.5, 0.2, 0.75]);
        assert_eq!(rng.random_int(256, "low"), 0);
        assert_eq!(rng.random_int(256, "high"), 255);
        assert!((rng.random_range(0.85, 1.0, "variance") - 0.925).abs() < 1e-9);
        assert!(rng.chance(0.25, "hit"));
        assert_eq!(rng.choose(&['a', 'b', 'c', 'd'], "pick"), Some(&'d'));
        assert_eq!(rng.remaining(), Some(0));
    }

    #[test]
    #[should_panic(expected = "accuracy")]
    fn exhausted_script_names_the_reason() {
        let mut rng = BattleRng::new_for_test([]);
        rng.chance(0.5, "accuracy");
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = BattleRng::seeded(42);
        let mut b = BattleRng::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.random_int(1000, "a"), b.random_int(1000, "b"));
        }
    }

    #[test]
    fn empty_choice_draws_nothing() {
        let mut rng = BattleRng::new_for_test([]);
        let empty: [u8; 0] = [];
        assert_eq!(rng.choose(&empty, "none"), None);
        assert_eq!(rng.random_int(0, "zero"), 0);
    }
}
