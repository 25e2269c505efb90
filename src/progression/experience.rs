use crate::pokemon::{Combatant, MAX_LEVEL};
use crate::species::species_data;
use schema::Species;
use tracing::debug;

/// Experience for knocking out `defeated`: `base_exp * level / 7`, scaled by
/// `trainer_multiplier` when the loser belonged to a trainer.
pub fn experience_yield(defeated: &Combatant, trainer_battle: bool, trainer_multiplier: f64) -> u32 {
    let base_exp = species_data(defeated.species).base_exp as u32;
    let amount = base_exp * defeated.level as u32 / 7;
    if trainer_battle {
        (amount as f64 * trainer_multiplier) as u32
    } else {
        amount
    }
}

/// Add `amount` experience and take every level-up it pays for, recomputing
/// statistics at each one. Returns true if at least one level was gained.
pub fn gain_experience(combatant: &mut Combatant, amount: u32) -> bool {
    let growth_rate = species_data(combatant.species).growth_rate;
    combatant.experience = combatant.experience.saturating_add(amount);

    let starting_level = combatant.level;
    while combatant.level < MAX_LEVEL
        && combatant.experience >= growth_rate.experience_for_level(combatant.level + 1)
    {
        combatant.level += 1;
        if let Err(err) = combatant.recalculate_stats() {
            panic!("stat recalculation failed after level-up: {err}");
        }
    }

    if combatant.level > starting_level {
        debug!(
            species = ?combatant.species,
            from = starting_level,
            to = combatant.level,
            "level up"
        );
        true
    } else {
        false
    }
}

/// Effort from a knockout: the defeated species' base stats, saturating.
pub fn award_effort(combatant: &mut Combatant, defeated: Species) {
    combatant.evs.add_base_stats(&species_data(defeated).base_stats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn level_five_plus_one_hundred_is_level_six() {
        let mut pikachu = Combatant::new(Species::Pikachu, 5, None).unwrap();
        assert_eq!(pikachu.experience, 125);
        assert!(gain_experience(&mut pikachu, 100));
        assert_eq!(pikachu.level, 6);
        assert_eq!(pikachu.experience, 225);
    }

    #[rstest]
    #[case(91, true, 6)]
    #[case(90, false, 5)]
    #[case(1, false, 5)]
    fn threshold_is_exact(#[case] amount: u32, #[case] leveled: bool, #[case] level: u8) {
        let mut pikachu = Combatant::new(Species::Pikachu, 5, None).unwrap();
        assert_eq!(gain_experience(&mut pikachu, amount), leveled);
        assert_eq!(pikachu.level, level);
    }

    #[test]
    fn large_gains_cascade_through_levels() {
        let mut pikachu = Combatant::new(Species::Pikachu, 5, None).unwrap();
        // Level 10 on the medium-fast curve needs 1000 total.
        assert!(gain_experience(&mut pikachu, 875));
        assert_eq!(pikachu.level, 10);
    }

    #[test]
    fn level_up_raises_current_health_by_the_gain() {
        let mut pikachu = Combatant::new(Species::Pikachu, 5, None).unwrap();
        pikachu.take_damage(5);
        let missing = pikachu.max_hp() - pikachu.current_hp();
        gain_experience(&mut pikachu, 100);
        assert_eq!(pikachu.max_hp() - pikachu.current_hp(), missing);
    }

    #[test]
    fn level_cap_holds() {
        let mut pikachu = Combatant::new(Species::Pikachu, 99, None).unwrap();
        assert!(gain_experience(&mut pikachu, u32::MAX));
        assert_eq!(pikachu.level, MAX_LEVEL);
        assert!(!gain_experience(&mut pikachu, 1000));
    }

    #[test]
    fn trainer_battles_pay_half_again() {
        let rattata = Combatant::new(Species::Rattata, 7, None).unwrap();
        assert_eq!(experience_yield(&rattata, false, 1.5), 57);
        assert_eq!(experience_yield(&rattata, true, 1.5), 85);
    }

    #[test]
    fn effort_accumulates_base_stats() {
        let mut pikachu = Combatant::new(Species::Pikachu, 5, None).unwrap();
        award_effort(&mut pikachu, Species::Pidgey);
        award_effort(&mut pikachu, Species::Pidgey);
        let pidgey = &species_data(Species::Pidgey).base_stats;
        assert_eq!(pikachu.evs.speed, pidgey.speed as u16 * 2);
    }
}
