use crate::errors::SpeciesDataResult;
use crate::pokemon::Combatant;
use crate::species::{get_species_data, species_data};
use schema::{EvolutionRequirement, Item, Species};
use tracing::info;

/// Outside circumstance an evolution check runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionModifier {
    /// An item is being used on the combatant.
    Item(Item),
    Trade,
}

fn requirement_met(
    combatant: &Combatant,
    requirement: &EvolutionRequirement,
    modifier: Option<&EvolutionModifier>,
) -> bool {
    match requirement {
        EvolutionRequirement::Level(level) => combatant.level >= *level,
        EvolutionRequirement::Item(item) => modifier == Some(&EvolutionModifier::Item(*item)),
        EvolutionRequirement::Trade => modifier == Some(&EvolutionModifier::Trade),
        EvolutionRequirement::Stats {
            stat,
            other,
            allow_equal,
        } => {
            let value = combatant.stats.get(*stat).normal;
            let compared = combatant.stats.get(*other).normal;
            if *allow_equal {
                value >= compared
            } else {
                value > compared
            }
        }
        // No friendship or clock is tracked.
        EvolutionRequirement::Happiness(_) | EvolutionRequirement::Time(_) => false,
    }
}

/// The first evolution whose requirements all hold, in declaration order.
pub fn check_evolutions(
    combatant: &Combatant,
    modifier: Option<&EvolutionModifier>,
) -> Option<Species> {
    species_data(combatant.species)
        .evolutions
        .iter()
        .find(|evolution| {
            evolution
                .requirements
                .iter()
                .all(|requirement| requirement_met(combatant, requirement, modifier))
        })
        .map(|evolution| evolution.evolves_into)
}

/// Turn `combatant` into `into`, keeping level, experience, points and moves.
pub fn evolve(combatant: &mut Combatant, into: Species) -> SpeciesDataResult<()> {
    let data = get_species_data(into)?;
    info!(from = ?combatant.species, into = ?into, "evolution");
    combatant.species = into;
    combatant.types = data.types.clone();
    combatant.recalculate_stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::StatKind;

    fn combatant(species: Species, level: u8) -> Combatant {
        Combatant::new(species, level, None).unwrap()
    }

    #[rstest]
    #[case(Species::Charmander, 16, None, Some(Species::Charmeleon))]
    #[case(Species::Charmander, 15, None, None)]
    #[case(Species::Pikachu, 30, Some(EvolutionModifier::Item(Item::ThunderStone)), Some(Species::Raichu))]
    #[case(Species::Pikachu, 30, Some(EvolutionModifier::Item(Item::FireStone)), None)]
    #[case(Species::Pikachu, 30, None, None)]
    #[case(Species::Graveler, 30, Some(EvolutionModifier::Trade), Some(Species::Golem))]
    #[case(Species::Graveler, 30, None, None)]
    #[case(Species::Eevee, 20, Some(EvolutionModifier::Item(Item::FireStone)), Some(Species::Flareon))]
    #[case(Species::Eevee, 20, Some(EvolutionModifier::Item(Item::WaterStone)), Some(Species::Vaporeon))]
    #[case(Species::Pichu, 50, None, None)]
    fn evolution_paths(
        #[case] species: Species,
        #[case] level: u8,
        #[case] modifier: Option<EvolutionModifier>,
        #[case] expected: Option<Species>,
    ) {
        let subject = combatant(species, level);
        assert_eq!(check_evolutions(&subject, modifier.as_ref()), expected);
    }

    #[test]
    fn stat_comparisons_pick_the_tyrogue_branch() {
        let mut tyrogue = combatant(Species::Tyrogue, 20);
        tyrogue.stats.get_mut(StatKind::Attack).normal = 40;
        tyrogue.stats.get_mut(StatKind::Defense).normal = 30;
        assert_eq!(check_evolutions(&tyrogue, None), Some(Species::Hitmonlee));

        tyrogue.stats.get_mut(StatKind::Attack).normal = 30;
        tyrogue.stats.get_mut(StatKind::Defense).normal = 40;
        assert_eq!(check_evolutions(&tyrogue, None), Some(Species::Hitmonchan));

        tyrogue.stats.get_mut(StatKind::Defense).normal = 30;
        assert_eq!(check_evolutions(&tyrogue, None), Some(Species::Hitmontop));

        let young = combatant(Species::Tyrogue, 19);
        assert_eq!(check_evolutions(&young, None), None);
    }

    #[test]
    fn evolving_changes_species_types_and_stats() {
        let mut charmander = combatant(Species::Charmander, 16).with_nickname("EMBER");
        let attack_before = charmander.stats.attack.normal;
        evolve(&mut charmander, Species::Charmeleon).unwrap();

        assert_eq!(charmander.species, Species::Charmeleon);
        assert_eq!(charmander.name(), "EMBER");
        assert!(charmander.stats.attack.normal > attack_before);
        assert_eq!(charmander.level, 16);
    }
}
