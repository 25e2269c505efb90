use crate::battle::coordinator::{BattleCoordinator, BattleSetup};
use crate::battle::rng::BattleRng;
use crate::battle::state::BattleOutcome;
use crate::config::BattleConfig;
use crate::errors::BattleResult;
use crate::pokemon::{Combatant, StatusCondition};
use crate::services::{
    HeadlessMenu, InstantEffects, MemoryPartyStore, MenuService, NoopOverworld, Services,
    BATTLE_MENU,
};
use crate::store::SaveData;
use crate::teams::{Team, TeamKind};
use schema::{Move, Species};
use std::cell::RefCell;
use std::rc::Rc;

/// A builder for test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let pikachu = TestCombatantBuilder::new(Species::Pikachu, 25)
///     .with_moves(vec![Move::ThunderShock])
///     .with_hp(10)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    species: Species,
    level: u8,
    moves: Option<Vec<Move>>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
    experience: Option<u32>,
}

impl TestCombatantBuilder {
    pub fn new(species: Species, level: u8) -> Self {
        Self {
            species,
            level,
            moves: None,
            status: None,
            current_hp: None,
            experience: None,
        }
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Current HP; 0 leaves the combatant fainted.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = Some(experience);
        self
    }

    pub fn build(self) -> Combatant {
        let mut combatant = match Combatant::new(self.species, self.level, self.moves) {
            Ok(combatant) => combatant,
            Err(err) => panic!("Failed to build {:?}: {}", self.species, err),
        };
        combatant.status = self.status;
        if let Some(hp) = self.current_hp {
            combatant.stats.health.current = hp.min(combatant.max_hp());
        }
        if let Some(experience) = self.experience {
            combatant.experience = experience;
        }
        combatant
    }
}

/// A wild opponent built from explicit combatants.
pub fn wild_setup(combatant: Combatant) -> BattleSetup {
    match Team::new(vec![combatant], TeamKind::Wild) {
        Ok(opponent) => BattleSetup { opponent },
        Err(err) => panic!("Failed to build wild team: {}", err),
    }
}

pub fn trainer_setup(id: &str) -> BattleSetup {
    assert_ok(BattleSetup::trainer(id))
}

/// A coordinator wired to headless collaborators, with handles kept so a
/// test can look at what the battle did.
pub struct Harness {
    pub coordinator: BattleCoordinator,
    pub menu: HeadlessMenu,
    pub effects: InstantEffects,
    pub store: MemoryPartyStore,
    pub overworld: NoopOverworld,
    pub outcomes: Rc<RefCell<Vec<BattleOutcome>>>,
}

impl Harness {
    pub fn new(save: SaveData, menu: HeadlessMenu) -> Self {
        Self::with_rng(save, menu, BattleRng::seeded(7))
    }

    pub fn with_rng(save: SaveData, menu: HeadlessMenu, rng: BattleRng) -> Self {
        let effects = InstantEffects::new();
        let store = MemoryPartyStore::new(save);
        let overworld = NoopOverworld::new();
        let services = Services::new(
            menu.clone(),
            effects.clone(),
            store.clone(),
            overworld.clone(),
            rng,
        );
        Harness {
            coordinator: BattleCoordinator::new(services, BattleConfig::default()),
            menu,
            effects,
            store,
            overworld,
            outcomes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Start a battle that records its outcome in `outcomes`.
    pub fn start(&mut self, setup: BattleSetup) -> BattleResult<()> {
        let outcomes = Rc::clone(&self.outcomes);
        self.coordinator
            .start(setup, move |outcome| outcomes.borrow_mut().push(outcome))
    }

    /// Run the battle, reading every dialog line, until it ends or waits on a
    /// menu choice.
    pub fn drive(&mut self) {
        loop {
            self.coordinator.run_until_idle();
            if !self.menu.advance() {
                break;
            }
        }
    }

    pub fn outcomes(&self) -> Vec<BattleOutcome> {
        self.outcomes.borrow().clone()
    }

    pub fn saw_line(&self, line: &str) -> bool {
        self.menu.dialog_lines().iter().any(|l| l == line)
    }

    /// Drop whatever the menu is still waiting on, for tests that stop a
    /// battle part-way through.
    pub fn abort(&mut self) {
        self.menu.delete_menu(BATTLE_MENU);
    }
}

/// Save data for a player named RED.
pub fn save_with(party: Vec<Combatant>) -> SaveData {
    SaveData::new("RED", party)
}

/// A Raichu that knocks out anything weak to a single Thunderbolt.
pub fn strong_raichu() -> Combatant {
    TestCombatantBuilder::new(Species::Raichu, 50)
        .with_moves(vec![Move::Thunderbolt])
        .build()
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
