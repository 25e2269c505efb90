//! Contracts for the collaborators a battle talks to, plus headless
//! implementations that run the engine without a screen.

pub mod headless;

use crate::battle::rng::BattleRng;
use crate::battle::sequencer::Continuation;
use crate::pokemon::Combatant;
use crate::store::Location;
use crate::teams::Side;
use schema::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use headless::{HeadlessMenu, InstantEffects, MemoryPartyStore, NoopOverworld};

/// Name of the menu the battle creates for itself.
pub const BATTLE_MENU: &str = "battle";

/// Dialog and option menus.
pub trait MenuService {
    fn create_menu(&mut self, name: &str);
    fn delete_menu(&mut self, name: &str);
    /// Queue a line of text. `done` resumes once the player has read it.
    fn add_dialog(&mut self, menu: &str, text: String, done: Option<Continuation>);
    /// Offer a list of options. `chosen` resumes with the picked index.
    fn add_options(&mut self, menu: &str, options: Vec<String>, chosen: Continuation<usize>);
    fn set_active(&mut self, menu: &str);
}

/// What a presentation effect acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Screen,
    Sprite(Side),
    Trainer(Side),
    HealthBar(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Fade { target: Target, to_black: bool },
    Slide { target: Target, direction: SlideDirection },
    Flicker { target: Target },
    Shake { target: Target },
    /// Drain or fill a health bar from one value to another.
    HealthBar { side: Side, from: u16, to: u16, max: u16 },
}

/// Status-line contents for one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub name: String,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub status: Option<String>,
}

/// Low-level presentation primitives.
pub trait EffectsService {
    fn play(&mut self, effect: Effect, done: Continuation);
    /// Replace the decoration for `side`. Instantaneous.
    fn show_hud(&mut self, side: Side, hud: &Hud);
    /// Switch the background music. Instantaneous.
    fn play_theme(&mut self, theme: &str);
}

/// Persistent party storage. Read when a battle starts, written at teardown.
pub trait PartyStore {
    fn player_name(&self) -> String;
    fn party(&self) -> Vec<Combatant>;
    fn set_party(&mut self, party: Vec<Combatant>);
    fn inventory(&self) -> BTreeMap<Item, u32>;
    fn set_inventory(&mut self, inventory: BTreeMap<Item, u32>);
    fn badges(&self) -> Vec<String>;
    fn add_badge(&mut self, badge: String);
    fn money(&self) -> u32;
    fn set_money(&mut self, money: u32);
    fn last_rest_point(&self) -> Location;
    fn location(&self) -> Location;
    fn set_location(&mut self, location: Location);
}

/// The map engine, paused while a battle runs.
pub trait Overworld {
    fn suspend(&mut self);
    fn resume(&mut self);
    fn warp_to(&mut self, location: &Location);
}

/// Everything a battle borrows from the outside world.
pub struct Services {
    pub menu: Box<dyn MenuService>,
    pub effects: Box<dyn EffectsService>,
    pub store: Box<dyn PartyStore>,
    pub overworld: Box<dyn Overworld>,
    pub rng: BattleRng,
}

impl Services {
    pub fn new(
        menu: impl MenuService + 'static,
        effects: impl EffectsService + 'static,
        store: impl PartyStore + 'static,
        overworld: impl Overworld + 'static,
        rng: BattleRng,
    ) -> Self {
        Services {
            menu: Box::new(menu),
            effects: Box::new(effects),
            store: Box::new(store),
            overworld: Box::new(overworld),
            rng,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").field("rng", &self.rng).finish_non_exhaustive()
    }
}
