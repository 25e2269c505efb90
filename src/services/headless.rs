//! Screenless collaborators. Each one is a cheap `Clone` handle over shared
//! state so a caller can keep a copy and inspect what the battle did.

use super::{Effect, EffectsService, Hud, MenuService, Overworld, PartyStore};
use crate::battle::sequencer::Continuation;
use crate::pokemon::Combatant;
use crate::store::{Location, SaveData};
use crate::teams::Side;
use schema::Item;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Dialog(String),
    Options(Vec<String>),
    Chose(usize),
}

#[derive(Default)]
struct MenuState {
    menus: Vec<String>,
    active: Option<String>,
    transcript: Vec<MenuEntry>,
    scripted: VecDeque<usize>,
    auto_advance: bool,
    pending_dialog: VecDeque<Continuation>,
    pending_choice: Option<(usize, Continuation<usize>)>,
    /// Last list auto-advance answered, and the pick it made.
    last_auto_pick: Option<(Vec<String>, usize)>,
}

/// Records every line and option list. Scripted choices are consumed first;
/// after that, auto-advance picks option 0, otherwise the menu waits for
/// `choose`. When auto-advance sees the same list twice in a row (its last
/// pick was refused) it moves one option further down.
#[derive(Clone, Default)]
pub struct HeadlessMenu {
    state: Rc<RefCell<MenuState>>,
}

impl HeadlessMenu {
    pub fn new(auto_advance: bool) -> Self {
        let menu = Self::default();
        menu.state.borrow_mut().auto_advance = auto_advance;
        menu
    }

    pub fn with_choices(self, choices: impl IntoIterator<Item = usize>) -> Self {
        self.state.borrow_mut().scripted.extend(choices);
        self
    }

    pub fn push_choice(&self, choice: usize) {
        self.state.borrow_mut().scripted.push_back(choice);
    }

    pub fn transcript(&self) -> Vec<MenuEntry> {
        self.state.borrow().transcript.clone()
    }

    /// Only the dialog lines, in order.
    pub fn dialog_lines(&self) -> Vec<String> {
        self.state
            .borrow()
            .transcript
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Dialog(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn active_menu(&self) -> Option<String> {
        self.state.borrow().active.clone()
    }

    pub fn menus(&self) -> Vec<String> {
        self.state.borrow().menus.clone()
    }

    /// Resume the oldest dialog waiting on the player. False if none was waiting.
    pub fn advance(&self) -> bool {
        let pending = self.state.borrow_mut().pending_dialog.pop_front();
        match pending {
            Some(done) => {
                done.resume(());
                true
            }
            None => false,
        }
    }

    /// Answer the option list waiting on the player.
    pub fn choose(&self, index: usize) -> bool {
        let pending = self.state.borrow_mut().pending_choice.take();
        match pending {
            Some((count, chosen)) => {
                let index = index.min(count.saturating_sub(1));
                self.state
                    .borrow_mut()
                    .transcript
                    .push(MenuEntry::Chose(index));
                chosen.resume(index);
                true
            }
            None => false,
        }
    }

    pub fn is_waiting(&self) -> bool {
        let state = self.state.borrow();
        !state.pending_dialog.is_empty() || state.pending_choice.is_some()
    }
}

impl MenuService for HeadlessMenu {
    fn create_menu(&mut self, name: &str) {
        let mut state = self.state.borrow_mut();
        if !state.menus.iter().any(|menu| menu == name) {
            state.menus.push(name.to_string());
        }
    }

    fn delete_menu(&mut self, name: &str) {
        let (dialogs, choice) = {
            let mut state = self.state.borrow_mut();
            state.menus.retain(|menu| menu != name);
            if state.active.as_deref() == Some(name) {
                state.active = None;
            }
            (
                std::mem::take(&mut state.pending_dialog),
                state.pending_choice.take(),
            )
        };
        for done in dialogs {
            done.abandon();
        }
        if let Some((_, chosen)) = choice {
            chosen.abandon();
        }
    }

    fn add_dialog(&mut self, menu: &str, text: String, done: Option<Continuation>) {
        debug!(menu, text = %text, "dialog");
        let resume_now = {
            let mut state = self.state.borrow_mut();
            state.transcript.push(MenuEntry::Dialog(text));
            match done {
                Some(done) if state.auto_advance => Some(done),
                Some(done) => {
                    state.pending_dialog.push_back(done);
                    None
                }
                None => None,
            }
        };
        if let Some(done) = resume_now {
            done.resume(());
        }
    }

    fn add_options(&mut self, menu: &str, options: Vec<String>, chosen: Continuation<usize>) {
        debug!(menu, ?options, "options");
        let count = options.len();
        let pick = {
            let mut state = self.state.borrow_mut();
            let pick = match state.scripted.pop_front() {
                Some(choice) => Some(choice.min(count.saturating_sub(1))),
                None if state.auto_advance => {
                    let index = match &state.last_auto_pick {
                        Some((previous, index)) if *previous == options => {
                            (index + 1) % count.max(1)
                        }
                        _ => 0,
                    };
                    state.last_auto_pick = Some((options.clone(), index));
                    Some(index)
                }
                None => None,
            };
            state.transcript.push(MenuEntry::Options(options));
            if let Some(index) = pick {
                state.transcript.push(MenuEntry::Chose(index));
            }
            pick
        };
        match pick {
            Some(index) => chosen.resume(index),
            None => self.state.borrow_mut().pending_choice = Some((count, chosen)),
        }
    }

    fn set_active(&mut self, menu: &str) {
        self.state.borrow_mut().active = Some(menu.to_string());
    }
}

#[derive(Debug, Default)]
struct EffectsLog {
    played: Vec<Effect>,
    huds: Vec<(Side, Hud)>,
    themes: Vec<String>,
}

/// Plays every effect in zero time and remembers what was asked for.
#[derive(Clone, Default)]
pub struct InstantEffects {
    log: Rc<RefCell<EffectsLog>>,
}

impl InstantEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Effect> {
        self.log.borrow().played.clone()
    }

    pub fn themes(&self) -> Vec<String> {
        self.log.borrow().themes.clone()
    }

    /// Most recent HUD shown for `side`.
    pub fn last_hud(&self, side: Side) -> Option<Hud> {
        self.log
            .borrow()
            .huds
            .iter()
            .rev()
            .find(|(s, _)| *s == side)
            .map(|(_, hud)| hud.clone())
    }
}

impl EffectsService for InstantEffects {
    fn play(&mut self, effect: Effect, done: Continuation) {
        self.log.borrow_mut().played.push(effect);
        done.resume(());
    }

    fn show_hud(&mut self, side: Side, hud: &Hud) {
        self.log.borrow_mut().huds.push((side, hud.clone()));
    }

    fn play_theme(&mut self, theme: &str) {
        self.log.borrow_mut().themes.push(theme.to_string());
    }
}

/// Party storage held in memory.
#[derive(Clone)]
pub struct MemoryPartyStore {
    save: Rc<RefCell<SaveData>>,
}

impl MemoryPartyStore {
    pub fn new(save: SaveData) -> Self {
        MemoryPartyStore {
            save: Rc::new(RefCell::new(save)),
        }
    }

    pub fn snapshot(&self) -> SaveData {
        self.save.borrow().clone()
    }
}

impl PartyStore for MemoryPartyStore {
    fn player_name(&self) -> String {
        self.save.borrow().player_name.clone()
    }

    fn party(&self) -> Vec<Combatant> {
        self.save.borrow().party.clone()
    }

    fn set_party(&mut self, party: Vec<Combatant>) {
        self.save.borrow_mut().party = party;
    }

    fn inventory(&self) -> BTreeMap<Item, u32> {
        self.save.borrow().inventory.clone()
    }

    fn set_inventory(&mut self, inventory: BTreeMap<Item, u32>) {
        self.save.borrow_mut().inventory = inventory;
    }

    fn badges(&self) -> Vec<String> {
        self.save.borrow().badges.clone()
    }

    fn add_badge(&mut self, badge: String) {
        let mut save = self.save.borrow_mut();
        if !save.badges.contains(&badge) {
            save.badges.push(badge);
        }
    }

    fn money(&self) -> u32 {
        self.save.borrow().money
    }

    fn set_money(&mut self, money: u32) {
        self.save.borrow_mut().money = money;
    }

    fn last_rest_point(&self) -> Location {
        self.save.borrow().last_rest_point.clone()
    }

    fn location(&self) -> Location {
        self.save.borrow().location.clone()
    }

    fn set_location(&mut self, location: Location) {
        self.save.borrow_mut().location = location;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverworldLog {
    pub suspended: bool,
    pub suspend_count: u32,
    pub resume_count: u32,
    pub warps: Vec<Location>,
}

/// An overworld that only counts what happened to it.
#[derive(Clone, Default)]
pub struct NoopOverworld {
    log: Rc<RefCell<OverworldLog>>,
}

impl NoopOverworld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> OverworldLog {
        self.log.borrow().clone()
    }
}

impl Overworld for NoopOverworld {
    fn suspend(&mut self) {
        let mut log = self.log.borrow_mut();
        log.suspended = true;
        log.suspend_count += 1;
    }

    fn resume(&mut self) {
        let mut log = self.log.borrow_mut();
        log.suspended = false;
        log.resume_count += 1;
    }

    fn warp_to(&mut self, location: &Location) {
        self.log.borrow_mut().warps.push(location.clone());
    }
}
