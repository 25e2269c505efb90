use crate::errors::{SpeciesDataError, SpeciesDataResult};
use schema::{PokemonSpecies, Species};
use std::collections::HashMap;
use std::sync::LazyLock;

// Species table, parsed once on first access.
static SPECIES_DATA: LazyLock<SpeciesDataResult<HashMap<Species, PokemonSpecies>>> =
    LazyLock::new(|| parse_species_table(include_str!("../data/species.ron")));

fn parse_species_table(source: &str) -> SpeciesDataResult<HashMap<Species, PokemonSpecies>> {
    let entries: Vec<PokemonSpecies> =
        ron::from_str(source).map_err(|e| SpeciesDataError::MalformedData(e.to_string()))?;
    Ok(entries
        .into_iter()
        .map(|data| (data.species, data))
        .collect())
}

/// Look up the static data for a species.
pub fn get_species_data(species: Species) -> SpeciesDataResult<&'static PokemonSpecies> {
    let table = SPECIES_DATA.as_ref().map_err(Clone::clone)?;
    table
        .get(&species)
        .ok_or(SpeciesDataError::SpeciesNotFound(species))
}

/// Panicking lookup for the simulation. Every species on a team was resolved
/// when the combatant was created.
pub fn species_data(species: Species) -> &'static PokemonSpecies {
    match get_species_data(species) {
        Ok(data) => data,
        Err(err) => panic!("species data lookup failed: {err}"),
    }
}
