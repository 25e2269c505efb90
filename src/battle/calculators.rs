use crate::battle::rng::BattleRng;
use crate::battle::state::{Action, BattleInfo, TeamAndAction};
use crate::move_data::{get_move_data, MoveData};
use crate::species::species_data;
use schema::PokemonType;
use tracing::debug;

const CRITICAL_DENOMINATOR: f64 = 512.0;
const HIGH_CRITICAL_DIVISOR: f64 = 8.0;
const RAISED_CRITICAL_DIVISOR: f64 = 4.0;
const CRITICAL_CAP: f64 = 255.0 / 256.0;
const STAB_MULTIPLIER: f64 = 1.5;
const VARIANCE_LOW: f64 = 0.85;
const VARIANCE_HIGH: f64 = 1.0;

/// Damage component of a move. A non-finite `damage` knocks the target out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEffect {
    pub damage: f64,
}

impl DamageEffect {
    pub fn from_power(power: u16) -> Self {
        DamageEffect {
            damage: power as f64,
        }
    }

    pub fn one_hit_knock_out() -> Self {
        DamageEffect {
            damage: f64::INFINITY,
        }
    }
}

/// Chance that a hit is critical: base species speed over 512, with the
/// denominator divided by 8 for high-critical moves and by 4 when the attacker's
/// critical flag is raised. Never above 255/256.
pub fn critical_probability(base_speed: u8, high_critical: bool, raised_critical: bool) -> f64 {
    let mut denominator = CRITICAL_DENOMINATOR;
    if high_critical {
        denominator /= HIGH_CRITICAL_DIVISOR;
    }
    if raised_critical {
        denominator /= RAISED_CRITICAL_DIVISOR;
    }
    (base_speed as f64 / denominator).min(CRITICAL_CAP)
}

/// One draw decides whether the source's move lands a critical hit.
pub fn roll_critical(
    info: &BattleInfo,
    team_and_action: &TeamAndAction,
    move_data: &MoveData,
    rng: &mut BattleRng,
) -> bool {
    let attacker = info.combatant(team_and_action.source);
    let base_speed = species_data(attacker.species).base_stats.speed;
    let probability =
        critical_probability(base_speed, move_data.high_critical, attacker.raised_critical);
    rng.chance(probability, "critical hit")
}

pub fn type_multiplier(move_type: PokemonType, defender_types: &[PokemonType]) -> f32 {
    PokemonType::effectiveness_against(move_type, defender_types)
}

pub fn stab_multiplier(move_type: PokemonType, attacker_types: &[PokemonType]) -> f64 {
    if attacker_types.contains(&move_type) {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// Damage dealt by the source's move to its target, clamped to
/// `[1, target current health]` (0 only for an already fainted target).
///
/// The level term only counts on a critical hit; a normal hit scales from a
/// level factor of zero.
pub fn calculate_damage(
    info: &BattleInfo,
    team_and_action: &TeamAndAction,
    effect: &DamageEffect,
    critical: bool,
    rng: &mut BattleRng,
) -> u16 {
    let target = info.combatant(team_and_action.target);
    let remaining = target.current_hp();
    if remaining == 0 {
        return 0;
    }
    if !effect.damage.is_finite() {
        return remaining;
    }

    let Action::Move { move_ } = team_and_action.action else {
        panic!(
            "damage requested for a non-move action: {:?}",
            team_and_action.action
        );
    };
    let move_type = get_move_data(move_).move_type;
    let attacker = info.combatant(team_and_action.source);

    let level_factor = if critical { attacker.level as f64 } else { 0.0 };
    let attack = attacker.stats.attack.current as f64;
    let defense = (target.stats.defense.current as f64).max(1.0);
    let raw = (((level_factor * 2.0 + 10.0) / 250.0) * (attack / defense) * effect.damage + 2.0)
        .floor();

    let variance = rng.random_range(VARIANCE_LOW, VARIANCE_HIGH, "damage variance");
    let modifier = stab_multiplier(move_type, &attacker.types)
        * type_multiplier(move_type, &target.types) as f64
        * variance;
    let damage = (raw * modifier).max(1.0).round();

    debug!(?move_, raw, modifier, damage, critical, "damage calculated");
    (damage.min(u16::MAX as f64) as u16).clamp(1, remaining)
}
