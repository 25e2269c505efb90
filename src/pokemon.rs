use crate::errors::SpeciesDataResult;
use crate::move_data::{get_move_max_pp, StatusType};
use crate::species::get_species_data;
use schema::{BaseStats, Move, PokemonType, Species, StatKind};
use serde::{Deserialize, Serialize};

pub const MAX_LEVEL: u8 = 100;
pub const MAX_MOVES: usize = 4;
const DEFAULT_IV: u16 = 8;

/// Non-volatile status. Sleep carries the number of turns left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    Sleep(u8),
    Poison,
    Burn,
    Freeze,
    Paralysis,
}

impl StatusCondition {
    pub fn from_type(status: StatusType, sleep_turns: u8) -> Self {
        match status {
            StatusType::Sleep => StatusCondition::Sleep(sleep_turns),
            StatusType::Poison => StatusCondition::Poison,
            StatusType::Burn => StatusCondition::Burn,
            StatusType::Freeze => StatusCondition::Freeze,
            StatusType::Paralysis => StatusCondition::Paralysis,
        }
    }

    pub fn kind(&self) -> StatusType {
        match self {
            StatusCondition::Sleep(_) => StatusType::Sleep,
            StatusCondition::Poison => StatusType::Poison,
            StatusCondition::Burn => StatusType::Burn,
            StatusCondition::Freeze => StatusType::Freeze,
            StatusCondition::Paralysis => StatusType::Paralysis,
        }
    }
}

/// Per-stat points, used for both individual and effort values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPoints {
    pub health: u16,
    pub attack: u16,
    pub defense: u16,
    pub special: u16,
    pub speed: u16,
}

impl StatPoints {
    pub fn uniform(value: u16) -> Self {
        Self {
            health: value,
            attack: value,
            defense: value,
            special: value,
            speed: value,
        }
    }

    pub fn get(&self, stat: StatKind) -> u16 {
        match stat {
            StatKind::Health => self.health,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Special => self.special,
            StatKind::Speed => self.speed,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut u16 {
        match stat {
            StatKind::Health => &mut self.health,
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Special => &mut self.special,
            StatKind::Speed => &mut self.speed,
        }
    }

    /// Add a defeated species' base stats, saturating at the 16-bit cap.
    pub fn add_base_stats(&mut self, base: &BaseStats) {
        for stat in [
            StatKind::Health,
            StatKind::Attack,
            StatKind::Defense,
            StatKind::Special,
            StatKind::Speed,
        ] {
            let points = self.get_mut(stat);
            *points = points.saturating_add(base.get(stat) as u16);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    pub current: u16,
    pub normal: u16,
}

impl Statistic {
    pub fn full(normal: u16) -> Self {
        Self {
            current: normal,
            normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub health: Statistic,
    pub attack: Statistic,
    pub defense: Statistic,
    pub special: Statistic,
    pub speed: Statistic,
}

impl Statistics {
    pub fn get(&self, stat: StatKind) -> &Statistic {
        match stat {
            StatKind::Health => &self.health,
            StatKind::Attack => &self.attack,
            StatKind::Defense => &self.defense,
            StatKind::Special => &self.special,
            StatKind::Speed => &self.speed,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut Statistic {
        match stat {
            StatKind::Health => &mut self.health,
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Special => &mut self.special,
            StatKind::Speed => &mut self.speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_: Move,
    pub pp: u8,
    pub max_pp: u8,
}

impl MoveSlot {
    /// Create a new slot with full PP from the move table.
    pub fn new(move_: Move) -> Self {
        let max_pp = get_move_max_pp(move_);
        MoveSlot {
            move_,
            pp: max_pp,
            max_pp,
        }
    }

    pub fn use_pp(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }
}

/// Outcome of a stage change on a non-health statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatChangeOutcome {
    Rose,
    Fell,
    /// Already at the bound in the requested direction.
    Unchanged,
}

/// One creature instance: persisted in the party between battles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub species: Species,
    pub nickname: Option<String>,
    pub level: u8,
    pub experience: u32,
    pub ivs: StatPoints,
    pub evs: StatPoints,
    pub stats: Statistics,
    pub status: Option<StatusCondition>,
    pub types: Vec<PokemonType>,
    pub moves: Vec<MoveSlot>,
    /// Set by Focus Energy or Dire Hit; cleared on switch-out and at battle end.
    #[serde(default)]
    pub raised_critical: bool,
}

impl Combatant {
    /// Create a combatant at `level`, starting at the experience floor for that
    /// level. Without explicit moves it knows the latest four from its learnset.
    pub fn new(species: Species, level: u8, moves: Option<Vec<Move>>) -> SpeciesDataResult<Self> {
        let data = get_species_data(species)?;
        let level = level.clamp(1, MAX_LEVEL);
        let ivs = StatPoints::uniform(DEFAULT_IV);
        let evs = StatPoints::default();

        let moves = moves
            .unwrap_or_else(|| data.learnset.moves_known_at(level))
            .into_iter()
            .fold(Vec::new(), |mut acc: Vec<Move>, move_| {
                if !acc.contains(&move_) {
                    acc.push(move_);
                }
                acc
            });

        Ok(Combatant {
            species,
            nickname: None,
            level,
            experience: data.growth_rate.experience_for_level(level),
            ivs,
            evs,
            stats: Self::calculate_stats(&data.base_stats, level, &ivs, &evs),
            status: None,
            types: data.types.clone(),
            moves: moves.into_iter().take(MAX_MOVES).map(MoveSlot::new).collect(),
            raised_critical: false,
        })
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Nickname if it has one, otherwise the species name.
    pub fn name(&self) -> &str {
        self.nickname.as_deref().unwrap_or_else(|| self.species.name())
    }

    /// `((base + iv) * 2 + ceil(sqrt(ev)) / 4) * level / 100`, plus `level + 10`
    /// for health and 5 for everything else.
    pub fn calculate_stat(base: u8, iv: u16, ev: u16, level: u8, is_health: bool) -> u16 {
        let effort = (ev as f64).sqrt().ceil() as u32 / 4;
        let core = ((base as u32 + iv as u32) * 2 + effort) * level as u32 / 100;
        let value = if is_health {
            core + level as u32 + 10
        } else {
            core + 5
        };
        value.min(u16::MAX as u32) as u16
    }

    fn calculate_stats(
        base: &BaseStats,
        level: u8,
        ivs: &StatPoints,
        evs: &StatPoints,
    ) -> Statistics {
        let stat = |kind: StatKind| {
            Statistic::full(Self::calculate_stat(
                base.get(kind),
                ivs.get(kind),
                evs.get(kind),
                level,
                kind == StatKind::Health,
            ))
        };
        Statistics {
            health: stat(StatKind::Health),
            attack: stat(StatKind::Attack),
            defense: stat(StatKind::Defense),
            special: stat(StatKind::Special),
            speed: stat(StatKind::Speed),
        }
    }

    /// Recompute every normal value for the current species, level and points.
    /// Health rises by the gained normal amount; other stats reset to normal.
    pub fn recalculate_stats(&mut self) -> SpeciesDataResult<()> {
        let base = &get_species_data(self.species)?.base_stats;
        let fresh = Self::calculate_stats(base, self.level, &self.ivs, &self.evs);
        let old_health = self.stats.health;
        let gained = fresh.health.normal.saturating_sub(old_health.normal);

        self.stats = fresh;
        self.stats.health.current = old_health
            .current
            .saturating_add(gained)
            .min(self.stats.health.normal);
        if old_health.current == 0 {
            self.stats.health.current = 0;
        }
        Ok(())
    }

    pub fn current_hp(&self) -> u16 {
        self.stats.health.current
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.health.normal
    }

    pub fn is_fainted(&self) -> bool {
        self.stats.health.current == 0
    }

    /// Apply damage and return true when this knocks the combatant out.
    pub fn take_damage(&mut self, amount: u16) -> bool {
        let health = &mut self.stats.health;
        health.current = health.current.saturating_sub(amount);
        if health.current == 0 {
            self.status = None;
            true
        } else {
            false
        }
    }

    /// Heal a living combatant, returning the amount actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let health = &mut self.stats.health;
        let before = health.current;
        health.current = health.current.saturating_add(amount).min(health.normal);
        health.current - before
    }

    /// Full restore used by whiteout and rest points.
    pub fn restore(&mut self) {
        self.stats.health.current = self.stats.health.normal;
        self.status = None;
        for slot in &mut self.moves {
            slot.pp = slot.max_pp;
        }
        self.reset_battle_stats();
    }

    /// Drop every battle-only modification: stat stages and the raised
    /// critical flag.
    pub fn reset_battle_stats(&mut self) {
        for stat in [
            StatKind::Attack,
            StatKind::Defense,
            StatKind::Special,
            StatKind::Speed,
        ] {
            let statistic = self.stats.get_mut(stat);
            statistic.current = statistic.normal;
        }
        self.raised_critical = false;
    }

    /// Move a non-health statistic by `stages` quarter steps of its normal
    /// value, clamped to `[normal / 2, normal * 4]`.
    pub fn modify_stat(&mut self, stat: StatKind, stages: i8) -> StatChangeOutcome {
        if stat == StatKind::Health || stages == 0 {
            return StatChangeOutcome::Unchanged;
        }
        let statistic = self.stats.get_mut(stat);
        let normal = statistic.normal as i32;
        let step = (normal / 4).max(1);
        let lower = normal / 2;
        let upper = normal * 4;
        let before = statistic.current as i32;
        let after = (before + step * stages as i32).clamp(lower, upper);
        statistic.current = after.min(u16::MAX as i32) as u16;

        match after.cmp(&before) {
            std::cmp::Ordering::Greater => StatChangeOutcome::Rose,
            std::cmp::Ordering::Less => StatChangeOutcome::Fell,
            std::cmp::Ordering::Equal => StatChangeOutcome::Unchanged,
        }
    }

    pub fn knows(&self, move_: Move) -> bool {
        self.moves.iter().any(|slot| slot.move_ == move_)
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(|slot| slot.pp > 0)
    }

    /// Spend one PP on `move_`. Struggle and unknown moves cost nothing.
    pub fn spend_pp(&mut self, move_: Move) {
        if let Some(slot) = self.moves.iter_mut().find(|slot| slot.move_ == move_) {
            slot.use_pp();
        }
    }
}
