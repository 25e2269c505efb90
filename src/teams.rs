use crate::errors::{BattleEngineError, BattleResult, BattleStateError, SpeciesDataResult};
use crate::pokemon::Combatant;
use schema::{Item, Move, Species};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static TRAINER_DATA: LazyLock<Result<HashMap<String, TrainerTemplate>, String>> =
    LazyLock::new(|| {
        let templates: Vec<TrainerTemplate> =
            ron::from_str(include_str!("../data/trainers.ron")).map_err(|e| e.to_string())?;
        Ok(templates
            .into_iter()
            .map(|template| (template.id.clone(), template))
            .collect())
    });

/// One side of the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }
}

/// Named trainer owning a team, with the payout for beating them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    pub name: String,
    pub reward: u32,
    pub badge: Option<String>,
    pub gift: Option<Item>,
    /// Music cue played when the battle ends.
    pub theme: Option<String>,
}

impl Leader {
    pub fn named(name: impl Into<String>) -> Self {
        Leader {
            name: name.into(),
            reward: 0,
            badge: None,
            gift: None,
            theme: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    pub leader: Leader,
    /// Uses the good-AI table and picks replacements by matchup.
    pub smart: bool,
    /// Skips every heuristic and picks moves like a wild combatant's trainer would.
    pub dumb: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamKind {
    Wild,
    Trainer(Trainer),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub actors: Vec<Combatant>,
    pub selected: usize,
    pub kind: TeamKind,
    /// Turns the selected combatant has spent in battle since it came in.
    #[serde(default)]
    pub turns_with_active: u32,
    /// The selected combatant came in part-way through the current turn.
    #[serde(default)]
    pub entered_this_turn: bool,
}

impl Team {
    pub fn new(actors: Vec<Combatant>, kind: TeamKind) -> BattleResult<Self> {
        if actors.is_empty() {
            return Err(BattleStateError::EmptyTeam.into());
        }
        let selected = actors.iter().position(|c| !c.is_fainted()).unwrap_or(0);
        Ok(Team {
            actors,
            selected,
            kind,
            turns_with_active: 0,
            entered_this_turn: false,
        })
    }

    /// A lone wild combatant.
    pub fn wild(species: Species, level: u8) -> BattleResult<Self> {
        let combatant = Combatant::new(species, level, None)?;
        Self::new(vec![combatant], TeamKind::Wild)
    }

    /// The player's side, led by the player.
    pub fn player(name: impl Into<String>, party: Vec<Combatant>) -> BattleResult<Self> {
        Self::new(
            party,
            TeamKind::Trainer(Trainer {
                leader: Leader::named(name),
                smart: false,
                dumb: false,
            }),
        )
    }

    pub fn active(&self) -> &Combatant {
        &self.actors[self.selected]
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        &mut self.actors[self.selected]
    }

    pub fn is_trainer(&self) -> bool {
        matches!(self.kind, TeamKind::Trainer(_))
    }

    pub fn trainer(&self) -> Option<&Trainer> {
        match &self.kind {
            TeamKind::Trainer(trainer) => Some(trainer),
            TeamKind::Wild => None,
        }
    }

    pub fn leader(&self) -> Option<&Leader> {
        self.trainer().map(|trainer| &trainer.leader)
    }

    pub fn has_living(&self) -> bool {
        self.actors.iter().any(|c| !c.is_fainted())
    }

    pub fn living_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.actors
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_fainted())
            .map(|(index, _)| index)
    }

    /// Bring `index` in. The outgoing combatant loses its battle-only changes.
    pub fn switch_to(&mut self, index: usize) {
        self.actors[self.selected].reset_battle_stats();
        self.selected = index;
        self.turns_with_active = 0;
        self.entered_this_turn = true;
    }

    /// Count the turn that just ended for the selected combatant. One that
    /// came in during the turn starts counting from the next.
    pub fn finish_turn(&mut self) {
        if self.entered_this_turn {
            self.entered_this_turn = false;
        } else {
            self.turns_with_active += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub species: Species,
    pub level: u8,
    pub moves: Option<Vec<Move>>,
}

impl CombatantTemplate {
    pub fn build(&self) -> SpeciesDataResult<Combatant> {
        Combatant::new(self.species, self.level, self.moves.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerTemplate {
    pub id: String,
    pub leader: Leader,
    pub smart: bool,
    pub dumb: bool,
    pub team: Vec<CombatantTemplate>,
}

impl TrainerTemplate {
    pub fn build_team(&self) -> BattleResult<Team> {
        let actors = self
            .team
            .iter()
            .map(CombatantTemplate::build)
            .collect::<SpeciesDataResult<Vec<_>>>()?;
        Team::new(
            actors,
            TeamKind::Trainer(Trainer {
                leader: self.leader.clone(),
                smart: self.smart,
                dumb: self.dumb,
            }),
        )
    }
}

/// Build a fresh opponent team for a prefab trainer.
pub fn create_trainer_team(id: &str) -> BattleResult<Team> {
    let table = TRAINER_DATA
        .as_ref()
        .map_err(|e| BattleEngineError::Config(format!("trainer table: {e}")))?;
    let template = table.get(id).ok_or_else(|| {
        BattleEngineError::Config(format!("unknown trainer '{id}'"))
    })?;
    template.build_team()
}

pub fn get_available_trainer_ids() -> Vec<String> {
    TRAINER_DATA
        .as_ref()
        .map(|table| table.keys().cloned().collect())
        .unwrap_or_default()
}
