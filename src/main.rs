//! Headless demo: one wild encounter and one gym battle, played with
//! auto-advancing menus. Pass a RON config path to override the defaults.

use pokemon_battle::services::{HeadlessMenu, InstantEffects, MemoryPartyStore, NoopOverworld};
use pokemon_battle::{
    BattleConfig, BattleCoordinator, BattleOutcome, BattleResult, BattleRng, BattleSetup,
    Combatant, Item, SaveData, Services, Species,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info};

fn load_config() -> BattleResult<BattleConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let source = std::fs::read_to_string(&path).map_err(|e| {
                pokemon_battle::BattleEngineError::Config(format!("{path}: {e}"))
            })?;
            BattleConfig::from_ron(&source)
        }
        None => Ok(BattleConfig::default().with_seed(151)),
    }
}

fn starting_save() -> BattleResult<SaveData> {
    let party = vec![
        Combatant::new(Species::Squirtle, 22, None)?.with_nickname("SHELLY"),
        Combatant::new(Species::Pikachu, 18, None)?,
    ];
    Ok(SaveData::new("RED", party).with_item(Item::Potion, 3))
}

fn run() -> BattleResult<()> {
    let config = load_config()?;
    let menu = HeadlessMenu::new(config.auto_advance);
    let store = MemoryPartyStore::new(starting_save()?);
    let services = Services::new(
        menu.clone(),
        InstantEffects::new(),
        store.clone(),
        NoopOverworld::new(),
        BattleRng::from_seed_option(config.seed),
    );
    let mut coordinator = BattleCoordinator::new(services, config);
    let outcomes: Rc<RefCell<Vec<BattleOutcome>>> = Rc::default();

    for setup in [BattleSetup::wild(Species::Pidgey, 5)?, BattleSetup::trainer("brock")?] {
        let record = Rc::clone(&outcomes);
        coordinator.start(setup, move |outcome| record.borrow_mut().push(outcome))?;
        let tasks = coordinator.run_until_idle();
        info!(tasks, phase = ?coordinator.phase(), "battle drained");
    }

    for line in menu.dialog_lines() {
        println!("{line}");
    }
    let save = store.snapshot();
    println!();
    println!("outcomes: {:?}", outcomes.borrow());
    println!("money: ${}  badges: {:?}", save.money, save.badges);
    for combatant in &save.party {
        println!(
            "  {} L{} {}/{}",
            combatant.name(),
            combatant.level,
            combatant.current_hp(),
            combatant.max_hp()
        );
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        error!(%err, "demo failed");
        std::process::exit(1);
    }
}
