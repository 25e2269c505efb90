use crate::config::BattleConfig;
use crate::move_data::StatusType;
use crate::pokemon::{Combatant, StatChangeOutcome};
use crate::teams::{Side, Team};
use schema::{Item, Move, Species, StatKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where the coordinator is in the battle lifecycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    SelectingActions,
    Ordering,
    ResolvingEffects,
    CheckingOutcome,
    Ending,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    PlayerVictory,
    OpponentVictory,
    PlayerFled,
}

/// The one thing a team does in a turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move { move_: Move },
    Switch { new_actor: usize },
    Item { item: Item },
    Flee,
}

impl Action {
    pub fn is_move(&self) -> bool {
        matches!(self, Action::Move { .. })
    }
}

/// A combatant slot on one side.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub side: Side,
    pub index: usize,
}

/// An action bound to its source and target once both teams have decided.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamAndAction {
    pub action: Action,
    pub source: Actor,
    pub target: Actor,
}

/// Per-team action selector state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    TopLevel,
    Moves,
    Items,
    Party,
    Chosen(Action),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    IsAsleep,
    IsFrozen,
    IsParalyzed,
    /// OHKO against a faster target, or a status on an already afflicted one.
    MoveFailed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    TurnStarted {
        turn_number: u32,
    },
    SentOut {
        side: Side,
        index: usize,
        species: Species,
    },
    Recalled {
        side: Side,
        index: usize,
        species: Species,
    },
    MoveUsed {
        side: Side,
        index: usize,
        species: Species,
        move_used: Move,
    },
    MoveMissed {
        side: Side,
        index: usize,
        species: Species,
    },
    CriticalHit,
    AttackTypeEffectiveness {
        multiplier: f32,
    },
    /// The move's type cannot touch the defender.
    NoEffect {
        side: Side,
        index: usize,
        species: Species,
    },
    DamageDealt {
        side: Side,
        species: Species,
        damage: u16,
        previous_hp: u16,
        remaining_hp: u16,
        max_hp: u16,
    },
    OneHitKnockOut,
    ActionFailed {
        side: Side,
        index: usize,
        species: Species,
        reason: ActionFailureReason,
    },
    StatusApplied {
        side: Side,
        index: usize,
        species: Species,
        status: StatusType,
    },
    StatusCured {
        side: Side,
        index: usize,
        species: Species,
        status: StatusType,
    },
    WokeUp {
        side: Side,
        index: usize,
        species: Species,
    },
    StatusDamage {
        side: Side,
        index: usize,
        species: Species,
        status: StatusType,
        damage: u16,
        previous_hp: u16,
        remaining_hp: u16,
        max_hp: u16,
    },
    StatChanged {
        side: Side,
        index: usize,
        species: Species,
        stat: StatKind,
        outcome: StatChangeOutcome,
    },
    CriticalRaised {
        side: Side,
        index: usize,
        species: Species,
    },
    ItemUsed {
        item: Item,
    },
    Healed {
        side: Side,
        index: usize,
        species: Species,
        previous_hp: u16,
        remaining_hp: u16,
        max_hp: u16,
    },
    NothingHappened,
    FleeSucceeded,
    FleeFailed,
    Fainted {
        side: Side,
        index: usize,
        species: Species,
    },
    ExperienceGained {
        species: Species,
        amount: u32,
    },
    LevelUp {
        species: Species,
        level: u8,
    },
    MoveLearned {
        species: Species,
        move_learned: Move,
        forgot: Option<Move>,
    },
    MoveNotLearned {
        species: Species,
        move_skipped: Move,
    },
    Evolved {
        from: Species,
        into: Species,
    },
    MoneyWon {
        amount: u32,
    },
    BadgeReceived {
        badge: String,
    },
    GiftReceived {
        item: Item,
    },
    OutOfCombatants {
        side: Side,
    },
    BlackedOut,
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, info: &BattleInfo) -> Option<String> {
        match self {
            BattleEvent::TurnStarted { .. } => None,
            BattleEvent::SentOut {
                side,
                index,
                species,
            } => Some(match side {
                Side::Player => format!("Go! {}!", info.combatant_label(*side, *index)),
                Side::Opponent => match info.team(Side::Opponent).leader() {
                    Some(leader) => format!("{} sent out {}!", leader.name, species.name()),
                    None => format!("Wild {} appeared!", species.name()),
                },
            }),
            BattleEvent::Recalled {
                side,
                index,
                species,
            } => Some(match side {
                Side::Player => {
                    format!("{} enough! Come back!", info.combatant_label(*side, *index))
                }
                Side::Opponent => format!("{} withdrew {}!", info.side_name(*side), species.name()),
            }),
            BattleEvent::MoveUsed {
                side,
                index,
                move_used,
                ..
            } => Some(format!(
                "{} used {}!",
                info.combatant_label(*side, *index),
                move_used.name().to_uppercase()
            )),
            BattleEvent::MoveMissed { side, index, .. } => Some(format!(
                "{}'s attack missed!",
                info.combatant_label(*side, *index)
            )),
            BattleEvent::CriticalHit => Some("Critical hit!".to_string()),
            BattleEvent::AttackTypeEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 && m > 0.0 => Some("It's not very effective...".to_string()),
                _ => None,
            },
            BattleEvent::NoEffect { side, index, .. } => Some(format!(
                "It doesn't affect {}!",
                info.combatant_label(*side, *index)
            )),
            BattleEvent::DamageDealt { .. } => None,
            BattleEvent::OneHitKnockOut => Some("One-hit KO!".to_string()),
            BattleEvent::ActionFailed {
                side,
                index,
                reason,
                ..
            } => {
                let name = info.combatant_label(*side, *index);
                Some(match reason {
                    ActionFailureReason::IsAsleep => format!("{name} is fast asleep!"),
                    ActionFailureReason::IsFrozen => format!("{name} is frozen solid!"),
                    ActionFailureReason::IsParalyzed => format!("{name} is fully paralyzed!"),
                    ActionFailureReason::MoveFailed => "But it failed!".to_string(),
                })
            }
            BattleEvent::StatusApplied {
                side,
                index,
                status,
                ..
            } => Some(format!(
                "{} {}",
                info.combatant_label(*side, *index),
                Self::format_status_applied(*status)
            )),
            BattleEvent::StatusCured {
                side,
                index,
                status,
                ..
            } => Some(format!(
                "{} was cured of {}!",
                info.combatant_label(*side, *index),
                Self::format_status(*status)
            )),
            BattleEvent::WokeUp { side, index, .. } => Some(format!(
                "{} woke up!",
                info.combatant_label(*side, *index)
            )),
            BattleEvent::StatusDamage {
                side,
                index,
                status,
                ..
            } => Some(format!(
                "{}'s hurt by the {}!",
                info.combatant_label(*side, *index),
                Self::format_status(*status)
            )),
            BattleEvent::StatChanged {
                side,
                index,
                stat,
                outcome,
                ..
            } => {
                let name = info.combatant_label(*side, *index);
                Some(match outcome {
                    StatChangeOutcome::Rose => format!("{name}'s {} rose!", stat.label()),
                    StatChangeOutcome::Fell => format!("{name}'s {} fell!", stat.label()),
                    StatChangeOutcome::Unchanged => "Nothing happened!".to_string(),
                })
            }
            BattleEvent::CriticalRaised { side, index, .. } => Some(format!(
                "{}'s getting pumped!",
                info.combatant_label(*side, *index)
            )),
            BattleEvent::ItemUsed { item } => {
                Some(format!("{} used {}!", info.player_name(), item.name()))
            }
            BattleEvent::Healed {
                side,
                index,
                previous_hp,
                remaining_hp,
                ..
            } => Some(format!(
                "{} recovered by {}!",
                info.combatant_label(*side, *index),
                remaining_hp - previous_hp
            )),
            BattleEvent::NothingHappened => Some("Nothing happened!".to_string()),
            BattleEvent::FleeSucceeded => Some("Got away safely!".to_string()),
            BattleEvent::FleeFailed => Some("Can't escape!".to_string()),
            BattleEvent::Fainted { side, index, .. } => Some(format!(
                "{} fainted!",
                info.combatant_label(*side, *index)
            )),
            BattleEvent::ExperienceGained { species, amount } => Some(format!(
                "{} gained {} EXP. Points!",
                species.name(),
                amount
            )),
            BattleEvent::LevelUp { species, level } => Some(format!(
                "{} grew to level {}!",
                species.name(),
                level
            )),
            BattleEvent::MoveLearned {
                species,
                move_learned,
                forgot,
            } => Some(match forgot {
                Some(old) => format!(
                    "{} forgot {} and learned {}!",
                    species.name(),
                    old.name().to_uppercase(),
                    move_learned.name().to_uppercase()
                ),
                None => format!(
                    "{} learned {}!",
                    species.name(),
                    move_learned.name().to_uppercase()
                ),
            }),
            BattleEvent::MoveNotLearned {
                species,
                move_skipped,
            } => Some(format!(
                "{} did not learn {}!",
                species.name(),
                move_skipped.name().to_uppercase()
            )),
            BattleEvent::Evolved { from, into } => Some(format!(
                "{} evolved into {}!",
                from.name(),
                into.name()
            )),
            BattleEvent::MoneyWon { amount } => Some(format!(
                "{} got ${} for winning!",
                info.player_name(),
                amount
            )),
            BattleEvent::BadgeReceived { badge } => {
                Some(format!("{} received the {}!", info.player_name(), badge))
            }
            BattleEvent::GiftReceived { item } => {
                Some(format!("{} received {}!", info.player_name(), item.name()))
            }
            BattleEvent::OutOfCombatants { side } => Some(match side {
                Side::Player => format!("{} is out of usable POKEMON!", info.player_name()),
                Side::Opponent => format!("{} was defeated!", info.side_name(*side)),
            }),
            BattleEvent::BlackedOut => {
                Some(format!("{} blacked out!", info.player_name()))
            }
            BattleEvent::BattleEnded { .. } => None,
        }
    }

    fn format_status(status: StatusType) -> &'static str {
        match status {
            StatusType::Sleep => "sleep",
            StatusType::Poison => "poison",
            StatusType::Burn => "burn",
            StatusType::Freeze => "freeze",
            StatusType::Paralysis => "paralysis",
        }
    }

    fn format_status_applied(status: StatusType) -> &'static str {
        match status {
            StatusType::Sleep => "fell asleep!",
            StatusType::Poison => "was poisoned!",
            StatusType::Burn => "was burned!",
            StatusType::Freeze => "was frozen solid!",
            StatusType::Paralysis => "is paralyzed! It may not attack!",
        }
    }
}

/// Event bus for collecting battle events. The log is the structured record
/// of what happened; presentation text is derived from it.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Events pushed at or after `start`.
    pub fn since(&self, start: usize) -> &[BattleEvent] {
        &self.events[start.min(self.events.len())..]
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The user-visible lines for every event, in order.
    pub fn formatted(&self, info: &BattleInfo) -> Vec<String> {
        self.events.iter().filter_map(|e| e.format(info)).collect()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Aggregate root for one battle session.
#[derive(Debug, Clone)]
pub struct BattleInfo {
    /// Indexed by `Side::index`.
    pub teams: [Team; 2],
    pub flee_attempts: u32,
    pub events: EventBus,
    pub phase: Phase,
    pub selectors: [SelectorState; 2],
    pub turn_number: u32,
    pub outcome: Option<BattleOutcome>,
    /// Music for beating this opponent.
    pub ending_theme: Option<String>,
    /// Bag contents copied from the store at start, written back at teardown.
    pub inventory: BTreeMap<Item, u32>,
    pub money: u32,
    /// Party slots that gained a level this battle; checked for evolution at the end.
    pub leveled_up: BTreeSet<usize>,
    pub config: BattleConfig,
}

impl BattleInfo {
    pub fn new(player: Team, opponent: Team, config: BattleConfig) -> Self {
        let ending_theme = opponent.leader().and_then(|leader| leader.theme.clone());
        BattleInfo {
            teams: [player, opponent],
            flee_attempts: 0,
            events: EventBus::new(),
            phase: Phase::Idle,
            selectors: [SelectorState::TopLevel; 2],
            turn_number: 0,
            outcome: None,
            ending_theme,
            inventory: BTreeMap::new(),
            money: 0,
            leveled_up: BTreeSet::new(),
            config,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        &mut self.teams[side.index()]
    }

    pub fn active(&self, side: Side) -> &Combatant {
        self.team(side).active()
    }

    pub fn active_mut(&mut self, side: Side) -> &mut Combatant {
        self.team_mut(side).active_mut()
    }

    pub fn combatant(&self, actor: Actor) -> &Combatant {
        &self.team(actor.side).actors[actor.index]
    }

    pub fn combatant_mut(&mut self, actor: Actor) -> &mut Combatant {
        &mut self.team_mut(actor.side).actors[actor.index]
    }

    pub fn active_actor(&self, side: Side) -> Actor {
        Actor {
            side,
            index: self.team(side).selected,
        }
    }

    pub fn is_trainer_battle(&self) -> bool {
        self.team(Side::Opponent).is_trainer()
    }

    pub fn push_event(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn player_name(&self) -> &str {
        self.side_name(Side::Player)
    }

    /// Trainer name for a side, or "Wild" for a wild encounter.
    pub fn side_name(&self, side: Side) -> &str {
        self.team(side)
            .leader()
            .map(|leader| leader.name.as_str())
            .unwrap_or("Wild")
    }

    /// How text refers to the combatant in slot `index`: its nickname if it
    /// has one, and an "Enemy" prefix on the opponent's side.
    pub fn combatant_label(&self, side: Side, index: usize) -> String {
        let name = self.team(side).actors[index].name();
        match side {
            Side::Player => name.to_string(),
            Side::Opponent => format!("Enemy {name}"),
        }
    }
}
