//! Opponent decision making.
//!
//! Every candidate move starts at the same priority and heuristics nudge it up
//! or down. Lower is preferred; the final pick is uniform among the lowest.

use crate::battle::calculators::type_multiplier;
use crate::battle::rng::BattleRng;
use crate::battle::state::{Action, BattleInfo};
use crate::config::BattleConfig;
use crate::move_data::get_move_data;
use crate::teams::{Side, Team};
use ordered_float::OrderedFloat;
use schema::{Effectiveness, Move, StatKind};
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static AI_PREFERENCES: LazyLock<Result<AiPreferences, String>> = LazyLock::new(|| {
    ron::from_str(include_str!("../../data/ai_preferences.ron")).map_err(|e| e.to_string())
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PreferenceCondition {
    /// The move raises or lowers this statistic.
    Stat(StatKind),
    Move(Move),
    /// The move's type matchup against the defender falls in this class.
    Effectiveness(Effectiveness),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PreferenceEntry {
    pub when: PreferenceCondition,
    pub delta: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceTable {
    pub default: Vec<PreferenceEntry>,
    #[serde(default)]
    pub leaders: HashMap<String, Vec<PreferenceEntry>>,
}

impl PreferenceTable {
    pub fn lists(&self, leader: &str) -> bool {
        self.leaders.contains_key(leader)
    }

    /// The leader's own entries, or the defaults for a smart trainer that has none.
    fn entries_for(&self, leader: &str, smart: bool) -> &[PreferenceEntry] {
        match self.leaders.get(leader) {
            Some(entries) => entries,
            None if smart => &self.default,
            None => &[],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiPreferences {
    pub turn_two: PreferenceTable,
    pub good_ai: PreferenceTable,
}

pub fn ai_preferences() -> &'static AiPreferences {
    match AI_PREFERENCES.as_ref() {
        Ok(preferences) => preferences,
        Err(err) => panic!("AI preference table is malformed: {err}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePossibility {
    pub move_: Move,
    pub priority: i32,
}

fn matches(condition: PreferenceCondition, move_: Move, defender: &Team) -> bool {
    let data = get_move_data(move_);
    match condition {
        PreferenceCondition::Move(wanted) => wanted == move_,
        PreferenceCondition::Stat(stat) => data.modified_stats().any(|s| s == stat),
        PreferenceCondition::Effectiveness(class) => {
            data.deals_damage()
                && Effectiveness::classify(type_multiplier(data.move_type, &defender.active().types))
                    == class
        }
    }
}

fn apply(entries: &[PreferenceEntry], possibility: &mut MovePossibility, defender: &Team) {
    for entry in entries {
        if matches(entry.when, possibility.move_, defender) {
            possibility.priority += entry.delta;
        }
    }
}

/// Score each of `moves` for `attacking` against `defending`'s active combatant.
pub fn generate(
    attacking: &Team,
    defending: &Team,
    moves: &[Move],
    config: &BattleConfig,
) -> Vec<MovePossibility> {
    let mut possibilities: Vec<MovePossibility> = moves
        .iter()
        .map(|&move_| MovePossibility {
            move_,
            priority: config.base_priority,
        })
        .collect();

    let Some(trainer) = attacking.trainer() else {
        return possibilities;
    };
    if trainer.dumb {
        return possibilities;
    }

    let tables = ai_preferences();
    let leader = trainer.leader.name.as_str();
    let uses_turn_two = trainer.smart || tables.turn_two.lists(leader);
    let uses_good_ai = trainer.smart || tables.good_ai.lists(leader);
    if !uses_turn_two && !uses_good_ai {
        return possibilities;
    }

    let defender_has_status = defending.active().status.is_some();
    let second_turn = attacking.turns_with_active == 1;

    for possibility in &mut possibilities {
        if defender_has_status && get_move_data(possibility.move_).is_status_only() {
            possibility.priority += config.status_move_penalty;
        }
        if uses_turn_two && second_turn {
            apply(tables.turn_two.entries_for(leader, trainer.smart), possibility, defending);
        }
        if uses_good_ai {
            apply(tables.good_ai.entries_for(leader, trainer.smart), possibility, defending);
        }
    }
    debug!(leader, ?possibilities, "move priorities");
    possibilities
}

/// Uniform pick among the possibilities sharing the lowest priority.
pub fn choose(possibilities: &[MovePossibility], rng: &mut BattleRng) -> Option<Move> {
    let best = possibilities.iter().map(|p| p.priority).min()?;
    let candidates: Vec<Move> = possibilities
        .iter()
        .filter(|p| p.priority == best)
        .map(|p| p.move_)
        .collect();
    rng.choose(&candidates, "opponent move choice").copied()
}

/// The action a computer-controlled side takes this turn.
pub fn next_action(info: &BattleInfo, side: Side, rng: &mut BattleRng) -> Action {
    let attacking = info.team(side);
    let usable: Vec<Move> = attacking
        .active()
        .moves
        .iter()
        .filter(|slot| slot.pp > 0)
        .map(|slot| slot.move_)
        .collect();
    if usable.is_empty() {
        return Action::Move {
            move_: Move::Struggle,
        };
    }

    let move_ = if attacking.is_trainer() {
        let possibilities = generate(attacking, info.team(side.opponent()), &usable, &info.config);
        choose(&possibilities, rng)
    } else {
        rng.choose(&usable, "wild move choice").copied()
    };
    Action::Move {
        move_: move_.unwrap_or(Move::Struggle),
    }
}

/// Best type multiplier among the candidate's damaging moves.
fn best_matchup(team: &Team, index: usize, defender: &Team) -> f32 {
    team.actors[index]
        .moves
        .iter()
        .map(|slot| get_move_data(slot.move_))
        .filter(|data| data.deals_damage())
        .map(|data| type_multiplier(data.move_type, &defender.active().types))
        .fold(0.0, f32::max)
}

/// Replacement for a knocked-out active combatant, or `None` when the side is
/// out of living combatants. Smart trainers pick the best matchup against the
/// other side's active combatant; everyone else takes the first living one.
pub fn after_knockout(info: &BattleInfo, side: Side) -> Option<usize> {
    let team = info.team(side);
    let smart = team.trainer().is_some_and(|trainer| trainer.smart);
    if !smart {
        return team.living_indices().next();
    }
    let defender = info.team(side.opponent());
    team.living_indices()
        .max_by_key(|&index| (OrderedFloat(best_matchup(team, index, defender)), Reverse(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::{Combatant, StatusCondition};
    use crate::teams::{create_trainer_team, TeamKind};
    use pretty_assertions::assert_eq;
    use schema::Species;

    fn priorities(possibilities: &[MovePossibility]) -> Vec<(Move, i32)> {
        possibilities.iter().map(|p| (p.move_, p.priority)).collect()
    }

    fn moves_of(team: &Team) -> Vec<Move> {
        team.active().moves.iter().map(|slot| slot.move_).collect()
    }

    fn player_with(species: Species) -> Team {
        Team::player("RED", vec![Combatant::new(species, 20, None).unwrap()]).unwrap()
    }

    #[test]
    fn preference_tables_load() {
        let tables = ai_preferences();
        assert!(tables.turn_two.lists("Brock"));
        assert!(tables.good_ai.lists("Misty"));
        assert_eq!(tables.good_ai.default.len(), 3);
    }

    #[test]
    fn good_ai_prefers_super_effective_moves() {
        let surge = create_trainer_team("lt_surge").unwrap();
        let defender = player_with(Species::Pidgey);
        let scored = generate(&surge, &defender, &moves_of(&surge), &BattleConfig::default());
        assert_eq!(
            priorities(&scored),
            vec![
                (Move::ThunderShock, 9),
                (Move::Growl, 10),
                (Move::ThunderWave, 9),
                (Move::QuickAttack, 10),
            ]
        );
    }

    #[test]
    fn status_moves_are_penalized_against_an_afflicted_defender() {
        let surge = create_trainer_team("lt_surge").unwrap();
        let mut defender = player_with(Species::Pidgey);
        defender.active_mut().status = Some(StatusCondition::Paralysis);
        let scored = generate(&surge, &defender, &moves_of(&surge), &BattleConfig::default());
        let thunder_wave = scored.iter().find(|p| p.move_ == Move::ThunderWave).unwrap();
        assert_eq!(thunder_wave.priority, 14);

        let mut rng = BattleRng::new_for_test([0.0]);
        assert_eq!(choose(&scored, &mut rng), Some(Move::ThunderShock));
    }

    #[test]
    fn turn_two_table_applies_only_on_the_second_turn() {
        let mut brock = create_trainer_team("brock").unwrap();
        let defender = player_with(Species::Pikachu);
        let moves = moves_of(&brock);
        let config = BattleConfig::default();

        let first = generate(&brock, &defender, &moves, &config);
        assert_eq!(priorities(&first), vec![(Move::Tackle, 10), (Move::Harden, 10)]);

        brock.turns_with_active = 1;
        let second = generate(&brock, &defender, &moves, &config);
        assert_eq!(priorities(&second), vec![(Move::Tackle, 10), (Move::Harden, 7)]);
    }

    #[test]
    fn a_replacement_does_not_count_the_turn_it_came_in_on() {
        let mut brock = create_trainer_team("brock").unwrap();
        let defender = player_with(Species::Pikachu);
        let config = BattleConfig::default();
        let harden = |brock: &Team| {
            let scored = generate(brock, &defender, &moves_of(brock), &config);
            scored.iter().find(|p| p.move_ == Move::Harden).unwrap().priority
        };

        // Geodude falls during turn one and Graveler comes in.
        brock.actors[0].take_damage(u16::MAX);
        brock.switch_to(1);
        brock.finish_turn();
        assert_eq!(harden(&brock), 10);

        brock.finish_turn();
        assert_eq!(harden(&brock), 7);
    }

    #[test]
    fn dumb_trainers_skip_every_heuristic() {
        let joey = create_trainer_team("youngster_joey").unwrap();
        let mut defender = player_with(Species::Pidgey);
        defender.active_mut().status = Some(StatusCondition::Poison);
        let scored = generate(&joey, &defender, &moves_of(&joey), &BattleConfig::default());
        assert!(scored.iter().all(|p| p.priority == 10));
    }

    #[test]
    fn exhausted_moves_fall_back_to_struggle() {
        let mut wild = Team::wild(Species::Rattata, 5).unwrap();
        for slot in &mut wild.active_mut().moves {
            slot.pp = 0;
        }
        let info = BattleInfo::new(player_with(Species::Pikachu), wild, BattleConfig::default());
        let mut rng = BattleRng::new_for_test([]);
        assert_eq!(
            next_action(&info, Side::Opponent, &mut rng),
            Action::Move {
                move_: Move::Struggle
            }
        );
    }

    #[test]
    fn wild_opponents_pick_uniformly() {
        let wild = Team::new(
            vec![Combatant::new(Species::Rattata, 10, Some(vec![Move::Tackle, Move::TailWhip])).unwrap()],
            TeamKind::Wild,
        )
        .unwrap();
        let info = BattleInfo::new(player_with(Species::Pikachu), wild, BattleConfig::default());
        let mut rng = BattleRng::new_for_test([0.75]);
        assert_eq!(
            next_action(&info, Side::Opponent, &mut rng),
            Action::Move {
                move_: Move::TailWhip
            }
        );
    }

    #[test]
    fn smart_replacement_prefers_the_best_matchup() {
        let mut surge = create_trainer_team("lt_surge").unwrap();
        surge.actors.push(Combatant::new(Species::Geodude, 20, Some(vec![Move::RockThrow])).unwrap());
        surge.actors[0].take_damage(u16::MAX);
        // Rock is super effective on a flying defender; electric is too, so
        // the tie goes to the earlier slot.
        let info = BattleInfo::new(player_with(Species::Pidgey), surge, BattleConfig::default());
        assert_eq!(after_knockout(&info, Side::Opponent), Some(1));

        let mut info = info;
        info.teams[0] = player_with(Species::Charmander);
        // Only rock throw is super effective on fire.
        assert_eq!(after_knockout(&info, Side::Opponent), Some(2));
    }

    #[test]
    fn replacement_is_none_when_everyone_fainted() {
        let mut wild = Team::wild(Species::Pidgey, 3).unwrap();
        wild.actors[0].take_damage(u16::MAX);
        let info = BattleInfo::new(player_with(Species::Pikachu), wild, BattleConfig::default());
        assert_eq!(after_knockout(&info, Side::Opponent), None);
    }
}
