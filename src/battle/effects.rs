//! Applying one resolved action to the battle state.
//!
//! Everything here is synchronous: the state changes at once and every change
//! is recorded as a [`BattleEvent`]. Presentation is built from those events
//! afterwards.

use crate::battle::calculators::{calculate_damage, roll_critical, type_multiplier, DamageEffect};
use crate::battle::rng::BattleRng;
use crate::battle::state::{
    ActionFailureReason, Action, Actor, BattleEvent, BattleInfo, TeamAndAction,
};
use crate::move_data::{get_move_data, MoveData, MoveEffect, StatusType, Target};
use crate::pokemon::StatusCondition;
use schema::{Item, Move, PokemonType, StatKind};
use tracing::debug;

const FULL_PARALYSIS_CHANCE: f64 = 0.25;
const MAX_SLEEP_TURNS: u32 = 7;
const POTION_HEAL: u16 = 20;
const SUPER_POTION_HEAL: u16 = 50;

pub fn apply(info: &mut BattleInfo, team_and_action: &TeamAndAction, rng: &mut BattleRng) {
    match team_and_action.action {
        Action::Move { move_ } => apply_move(info, team_and_action, move_, rng),
        Action::Switch { new_actor } => apply_switch(info, team_and_action.source, new_actor),
        Action::Item { item } => apply_item(info, team_and_action.source, item),
        // The escape roll already happened when the player chose to run.
        Action::Flee => {}
    }
}

fn apply_switch(info: &mut BattleInfo, source: Actor, new_actor: usize) {
    let side = source.side;
    let outgoing = info.active_actor(side);
    info.push_event(BattleEvent::Recalled {
        side,
        index: outgoing.index,
        species: info.combatant(outgoing).species,
    });
    info.team_mut(side).switch_to(new_actor);
    let incoming = info.active(side).species;
    info.push_event(BattleEvent::SentOut {
        side,
        index: new_actor,
        species: incoming,
    });
}

fn take_from_bag(info: &mut BattleInfo, item: Item) {
    if let Some(count) = info.inventory.get_mut(&item) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            info.inventory.remove(&item);
        }
    }
}

fn apply_item(info: &mut BattleInfo, source: Actor, item: Item) {
    take_from_bag(info, item);
    info.push_event(BattleEvent::ItemUsed { item });

    let side = source.side;
    let index = info.team(side).selected;
    let combatant = info.active_mut(side);
    let species = combatant.species;
    let event = match item {
        Item::Potion | Item::SuperPotion => {
            let amount = if item == Item::Potion {
                POTION_HEAL
            } else {
                SUPER_POTION_HEAL
            };
            let previous_hp = combatant.current_hp();
            match combatant.heal(amount) {
                0 => BattleEvent::NothingHappened,
                _ => BattleEvent::Healed {
                    side,
                    index,
                    species,
                    previous_hp,
                    remaining_hp: combatant.current_hp(),
                    max_hp: combatant.max_hp(),
                },
            }
        }
        Item::FullHeal => match combatant.status.take() {
            Some(status) => BattleEvent::StatusCured {
                side,
                index,
                species,
                status: status.kind(),
            },
            None => BattleEvent::NothingHappened,
        },
        Item::XAttack | Item::XDefend | Item::XSpeed | Item::XSpecial => {
            let stat = match item {
                Item::XAttack => StatKind::Attack,
                Item::XDefend => StatKind::Defense,
                Item::XSpeed => StatKind::Speed,
                _ => StatKind::Special,
            };
            BattleEvent::StatChanged {
                side,
                index,
                species,
                stat,
                outcome: combatant.modify_stat(stat, 1),
            }
        }
        Item::DireHit => {
            combatant.raised_critical = true;
            BattleEvent::CriticalRaised {
                side,
                index,
                species,
            }
        }
        // Accuracy is not modelled; evolution stones do nothing in battle.
        _ => BattleEvent::NothingHappened,
    };
    info.push_event(event);
}

/// Sleep, freeze and paralysis may stop the source before it moves.
/// Returns true when the turn is lost.
fn status_prevents_action(info: &mut BattleInfo, source: Actor, rng: &mut BattleRng) -> bool {
    let Actor { side, index } = source;
    let combatant = info.combatant_mut(source);
    let species = combatant.species;
    let reason = match combatant.status {
        Some(StatusCondition::Sleep(turns)) => {
            let left = turns.saturating_sub(1);
            if left == 0 {
                combatant.status = None;
                info.push_event(BattleEvent::WokeUp {
                    side,
                    index,
                    species,
                });
                return true;
            }
            combatant.status = Some(StatusCondition::Sleep(left));
            ActionFailureReason::IsAsleep
        }
        Some(StatusCondition::Freeze) => ActionFailureReason::IsFrozen,
        Some(StatusCondition::Paralysis) => {
            if !rng.chance(FULL_PARALYSIS_CHANCE, "full paralysis") {
                return false;
            }
            ActionFailureReason::IsParalyzed
        }
        _ => return false,
    };
    info.push_event(BattleEvent::ActionFailed {
        side,
        index,
        species,
        reason,
    });
    true
}

fn targets_opponent(data: &MoveData) -> bool {
    data.effects.iter().any(|effect| match effect {
        MoveEffect::Damage | MoveEffect::OneHitKnockOut | MoveEffect::InflictStatus(..) => true,
        MoveEffect::StatChange(target, ..) => *target == Target::Target,
        MoveEffect::RaiseCritical => false,
    })
}

/// Types that shrug off a status of their own element.
fn immune_to_status(types: &[PokemonType], status: StatusType) -> bool {
    let immune_type = match status {
        StatusType::Poison => PokemonType::Poison,
        StatusType::Burn => PokemonType::Fire,
        StatusType::Freeze => PokemonType::Ice,
        StatusType::Sleep | StatusType::Paralysis => return false,
    };
    types.contains(&immune_type)
}

fn fail(info: &mut BattleInfo, source: Actor) {
    let species = info.combatant(source).species;
    info.push_event(BattleEvent::ActionFailed {
        side: source.side,
        index: source.index,
        species,
        reason: ActionFailureReason::MoveFailed,
    });
}

fn deal_damage(info: &mut BattleInfo, target: Actor, damage: u16) {
    let combatant = info.combatant_mut(target);
    let previous_hp = combatant.current_hp();
    combatant.take_damage(damage);
    let event = BattleEvent::DamageDealt {
        side: target.side,
        species: combatant.species,
        damage,
        previous_hp,
        remaining_hp: combatant.current_hp(),
        max_hp: combatant.max_hp(),
    };
    info.push_event(event);
}

fn apply_move(info: &mut BattleInfo, taa: &TeamAndAction, move_: Move, rng: &mut BattleRng) {
    let source = taa.source;
    let target = taa.target;

    if status_prevents_action(info, source, rng) {
        residual_damage(info, source);
        return;
    }

    let user = info.combatant_mut(source);
    user.spend_pp(move_);
    let species = user.species;
    info.push_event(BattleEvent::MoveUsed {
        side: source.side,
        index: source.index,
        species,
        move_used: move_,
    });

    let data = get_move_data(move_);
    let target_was_standing = !info.combatant(target).is_fainted();
    if landed(info, taa, data, rng) {
        apply_move_effects(info, taa, data, rng);
    }

    if target_was_standing && info.combatant(target).is_fainted() {
        let fainted = info.combatant(target).species;
        info.push_event(BattleEvent::Fainted {
            side: target.side,
            index: target.index,
            species: fainted,
        });
    }
    residual_damage(info, source);
}

/// Accuracy and type immunity. Records the miss or the immunity.
fn landed(info: &mut BattleInfo, taa: &TeamAndAction, data: &MoveData, rng: &mut BattleRng) -> bool {
    let source = taa.source;
    let target = taa.target;

    if let Some(accuracy) = data.accuracy {
        if accuracy < 100 && !rng.chance(accuracy as f64 / 100.0, "accuracy") {
            let species = info.combatant(source).species;
            info.push_event(BattleEvent::MoveMissed {
                side: source.side,
                index: source.index,
                species,
            });
            return false;
        }
    }

    let defender = info.combatant(target);
    if targets_opponent(data)
        && !defender.is_fainted()
        && type_multiplier(data.move_type, &defender.types) == 0.0
        && (data.deals_damage() || data.is_status_only())
    {
        let species = defender.species;
        info.push_event(BattleEvent::NoEffect {
            side: target.side,
            index: target.index,
            species,
        });
        return false;
    }
    true
}

fn apply_move_effects(
    info: &mut BattleInfo,
    taa: &TeamAndAction,
    data: &MoveData,
    rng: &mut BattleRng,
) {
    let source = taa.source;
    let target = taa.target;

    for effect in &data.effects {
        match effect {
            MoveEffect::Damage => {
                if info.combatant(target).is_fainted() {
                    continue;
                }
                let power = data.power.unwrap_or(0);
                let critical = roll_critical(info, taa, data, rng);
                let damage =
                    calculate_damage(info, taa, &DamageEffect::from_power(power), critical, rng);
                let multiplier = type_multiplier(data.move_type, &info.combatant(target).types);
                deal_damage(info, target, damage);
                if critical {
                    info.push_event(BattleEvent::CriticalHit);
                }
                info.push_event(BattleEvent::AttackTypeEffectiveness { multiplier });

                let defender = info.combatant_mut(target);
                if data.move_type == PokemonType::Fire
                    && defender.status == Some(StatusCondition::Freeze)
                {
                    defender.status = None;
                    let species = defender.species;
                    info.push_event(BattleEvent::StatusCured {
                        side: target.side,
                        index: target.index,
                        species,
                        status: StatusType::Freeze,
                    });
                }
            }
            MoveEffect::OneHitKnockOut => {
                let attacker_speed = info.combatant(source).stats.speed.current;
                let defender_speed = info.combatant(target).stats.speed.current;
                if defender_speed > attacker_speed {
                    fail(info, source);
                    return;
                }
                let damage = calculate_damage(
                    info,
                    taa,
                    &DamageEffect::one_hit_knock_out(),
                    false,
                    rng,
                );
                deal_damage(info, target, damage);
                info.push_event(BattleEvent::OneHitKnockOut);
            }
            MoveEffect::InflictStatus(status, chance) => {
                inflict_status(info, taa, data, *status, *chance, rng);
            }
            MoveEffect::StatChange(who, stat, stages) => {
                let actor = match who {
                    Target::User => source,
                    Target::Target => target,
                };
                let combatant = info.combatant_mut(actor);
                if combatant.is_fainted() {
                    continue;
                }
                let outcome = combatant.modify_stat(*stat, *stages);
                let species = combatant.species;
                info.push_event(BattleEvent::StatChanged {
                    side: actor.side,
                    index: actor.index,
                    species,
                    stat: *stat,
                    outcome,
                });
            }
            MoveEffect::RaiseCritical => {
                let user = info.combatant_mut(source);
                let species = user.species;
                let event = if user.raised_critical {
                    BattleEvent::NothingHappened
                } else {
                    user.raised_critical = true;
                    BattleEvent::CriticalRaised {
                        side: source.side,
                        index: source.index,
                        species,
                    }
                };
                info.push_event(event);
            }
        }
    }
}

fn inflict_status(
    info: &mut BattleInfo,
    taa: &TeamAndAction,
    data: &MoveData,
    status: StatusType,
    chance: u8,
    rng: &mut BattleRng,
) {
    let target = taa.target;
    let defender = info.combatant(target);
    if defender.is_fainted() {
        return;
    }
    if defender.status.is_some() || immune_to_status(&defender.types, status) {
        if data.is_status_only() {
            fail(info, taa.source);
        }
        return;
    }
    if chance < 100 && !rng.chance(chance as f64 / 100.0, "secondary status") {
        return;
    }
    let sleep_turns = match status {
        StatusType::Sleep => (rng.random_int(MAX_SLEEP_TURNS, "sleep turns") + 1) as u8,
        _ => 0,
    };

    let defender = info.combatant_mut(target);
    defender.status = Some(StatusCondition::from_type(status, sleep_turns));
    let species = defender.species;
    debug!(?species, ?status, sleep_turns, "status applied");
    info.push_event(BattleEvent::StatusApplied {
        side: target.side,
        index: target.index,
        species,
        status,
    });
}

/// Poison and burn bite the source after its action: 1/16 of max health.
fn residual_damage(info: &mut BattleInfo, source: Actor) {
    let combatant = info.combatant_mut(source);
    if combatant.is_fainted() {
        return;
    }
    let status = match combatant.status {
        Some(StatusCondition::Poison) => StatusType::Poison,
        Some(StatusCondition::Burn) => StatusType::Burn,
        _ => return,
    };
    let damage = (combatant.max_hp() / 16).max(1);
    let previous_hp = combatant.current_hp();
    let fainted = combatant.take_damage(damage);
    let species = combatant.species;
    let event = BattleEvent::StatusDamage {
        side: source.side,
        index: source.index,
        species,
        status,
        damage,
        previous_hp,
        remaining_hp: combatant.current_hp(),
        max_hp: combatant.max_hp(),
    };
    info.push_event(event);
    if fainted {
        info.push_event(BattleEvent::Fainted {
            side: source.side,
            index: source.index,
            species,
        });
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::pokemon::Combatant;
    use crate::teams::{Side, Team, TeamKind};
    use pretty_assertions::assert_eq;
    use schema::Species;

    fn info(player: Combatant, opponent: Combatant) -> BattleInfo {
        BattleInfo::new(
            Team::player("RED", vec![player]).unwrap(),
            Team::new(vec![opponent], TeamKind::Wild).unwrap(),
            BattleConfig::default(),
        )
    }

    fn player(species: Species, level: u8, moves: &[Move]) -> Combatant {
        Combatant::new(species, level, Some(moves.to_vec())).unwrap()
    }

    fn player_action(info: &BattleInfo, action: Action) -> TeamAndAction {
        TeamAndAction {
            action,
            source: info.active_actor(Side::Player),
            target: info.active_actor(Side::Opponent),
        }
    }

    fn uses(move_: Move) -> Action {
        Action::Move { move_ }
    }

    #[test]
    fn damaging_move_spends_pp_and_records_the_hit() {
        let mut info = info(
            player(Species::Pikachu, 25, &[Move::QuickAttack]),
            Combatant::new(Species::Pidgey, 10, None).unwrap(),
        );
        let taa = player_action(&info, uses(Move::QuickAttack));
        // crit roll, variance
        let mut rng = BattleRng::new_for_test([0.99, 0.5]);
        apply(&mut info, &taa, &mut rng);

        assert_eq!(info.active(Side::Player).moves[0].pp, 29);
        assert!(matches!(info.events.events()[0], BattleEvent::MoveUsed { .. }));
        assert!(matches!(info.events.events()[1], BattleEvent::DamageDealt { .. }));
        let opponent = info.active(Side::Opponent);
        assert!(opponent.current_hp() < opponent.max_hp());
        assert_eq!(rng.remaining(), Some(0));
    }

    #[test]
    fn sleep_counts_down_then_wakes() {
        let mut sleeper = player(Species::Pikachu, 25, &[Move::QuickAttack]);
        sleeper.status = Some(StatusCondition::Sleep(2));
        let mut info = info(sleeper, Combatant::new(Species::Pidgey, 10, None).unwrap());
        let taa = player_action(&info, uses(Move::QuickAttack));
        let mut rng = BattleRng::new_for_test([]);

        apply(&mut info, &taa, &mut rng);
        assert_eq!(info.active(Side::Player).status, Some(StatusCondition::Sleep(1)));
        apply(&mut info, &taa, &mut rng);
        assert_eq!(info.active(Side::Player).status, None);
        assert!(matches!(
            info.events.events(),
            [
                BattleEvent::ActionFailed {
                    reason: ActionFailureReason::IsAsleep,
                    ..
                },
                BattleEvent::WokeUp { .. }
            ]
        ));
    }

    #[test]
    fn full_paralysis_skips_the_move() {
        let mut paralyzed = player(Species::Pikachu, 25, &[Move::QuickAttack]);
        paralyzed.status = Some(StatusCondition::Paralysis);
        let mut info = info(paralyzed, Combatant::new(Species::Pidgey, 10, None).unwrap());
        let taa = player_action(&info, uses(Move::QuickAttack));
        let mut rng = BattleRng::new_for_test([0.1]);
        apply(&mut info, &taa, &mut rng);

        assert_eq!(info.active(Side::Player).moves[0].pp, 30);
        assert!(matches!(
            info.events.events(),
            [BattleEvent::ActionFailed {
                reason: ActionFailureReason::IsParalyzed,
                ..
            }]
        ));
    }

    #[test]
    fn inaccurate_move_can_miss() {
        let mut info = info(
            player(Species::Rattata, 20, &[Move::HyperFang]),
            Combatant::new(Species::Pidgey, 10, None).unwrap(),
        );
        let taa = player_action(&info, uses(Move::HyperFang));
        let mut rng = BattleRng::new_for_test([0.95]);
        apply(&mut info, &taa, &mut rng);
        assert!(matches!(info.events.events()[1], BattleEvent::MoveMissed { .. }));
        let opponent = info.active(Side::Opponent);
        assert_eq!(opponent.current_hp(), opponent.max_hp());
    }

    #[test]
    fn immune_defender_takes_nothing_and_draws_nothing() {
        let mut info = info(
            player(Species::Pikachu, 25, &[Move::ThunderShock]),
            Combatant::new(Species::Geodude, 10, None).unwrap(),
        );
        let taa = player_action(&info, uses(Move::ThunderShock));
        let mut rng = BattleRng::new_for_test([]);
        apply(&mut info, &taa, &mut rng);
        assert!(matches!(info.events.events()[1], BattleEvent::NoEffect { .. }));
    }

    #[test]
    fn one_hit_knock_out_fails_against_a_faster_target() {
        let mut info = info(
            player(Species::Geodude, 30, &[Move::Fissure]),
            Combatant::new(Species::Rattata, 30, None).unwrap(),
        );
        let taa = player_action(&info, uses(Move::Fissure));
        let mut rng = BattleRng::new_for_test([0.0]);
        apply(&mut info, &taa, &mut rng);
        assert!(matches!(
            info.events.events()[1],
            BattleEvent::ActionFailed {
                reason: ActionFailureReason::MoveFailed,
                ..
            }
        ));
    }

    #[test]
    fn one_hit_knock_out_empties_a_slower_target() {
        let mut info = info(
            player(Species::Geodude, 30, &[Move::Fissure]),
            Combatant::new(Species::Rattata, 5, None).unwrap(),
        );
        let taa = player_action(&info, uses(Move::Fissure));
        let mut rng = BattleRng::new_for_test([0.0]);
        apply(&mut info, &taa, &mut rng);

        assert!(info.active(Side::Opponent).is_fainted());
        assert!(info
            .events
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::Fainted { side: Side::Opponent, .. })));
    }

    #[test]
    fn status_move_fails_on_an_afflicted_target() {
        let mut pidgey = Combatant::new(Species::Pidgey, 10, None).unwrap();
        pidgey.status = Some(StatusCondition::Poison);
        let mut info = info(player(Species::Pikachu, 25, &[Move::ThunderWave]), pidgey);
        let taa = player_action(&info, uses(Move::ThunderWave));
        let mut rng = BattleRng::new_for_test([]);
        apply(&mut info, &taa, &mut rng);

        assert_eq!(info.active(Side::Opponent).status, Some(StatusCondition::Poison));
        assert!(matches!(
            info.events.events()[1],
            BattleEvent::ActionFailed {
                reason: ActionFailureReason::MoveFailed,
                ..
            }
        ));
    }

    #[test]
    fn poison_bites_after_the_action() {
        let mut poisoned = player(Species::Pikachu, 25, &[Move::Growl]);
        poisoned.status = Some(StatusCondition::Poison);
        let max = poisoned.max_hp();
        let mut info = info(poisoned, Combatant::new(Species::Pidgey, 10, None).unwrap());
        let taa = player_action(&info, uses(Move::Growl));
        let mut rng = BattleRng::new_for_test([]);
        apply(&mut info, &taa, &mut rng);

        assert_eq!(info.active(Side::Player).current_hp(), max - (max / 16).max(1));
        assert!(matches!(
            info.events.events().last(),
            Some(BattleEvent::StatusDamage {
                status: StatusType::Poison,
                ..
            })
        ));
    }

    #[test]
    fn potion_heals_and_leaves_the_bag() {
        let mut hurt = player(Species::Pikachu, 25, &[Move::Growl]);
        hurt.take_damage(30);
        let before = hurt.current_hp();
        let mut info = info(hurt, Combatant::new(Species::Pidgey, 10, None).unwrap());
        info.inventory.insert(Item::Potion, 1);
        let taa = player_action(&info, Action::Item { item: Item::Potion });
        apply(&mut info, &taa, &mut BattleRng::new_for_test([]));

        assert_eq!(info.active(Side::Player).current_hp(), before + 20);
        assert!(info.inventory.is_empty());
    }

    #[test]
    fn switching_swaps_the_active_combatant() {
        let party = vec![
            player(Species::Pikachu, 25, &[Move::Growl]),
            player(Species::Charmander, 20, &[Move::Ember]),
        ];
        let mut info = BattleInfo::new(
            Team::player("RED", party).unwrap(),
            Team::wild(Species::Pidgey, 10).unwrap(),
            BattleConfig::default(),
        );
        let taa = player_action(&info, Action::Switch { new_actor: 1 });
        apply(&mut info, &taa, &mut BattleRng::new_for_test([]));
        assert_eq!(info.team(Side::Player).selected, 1);
        assert!(matches!(
            info.events.events(),
            [BattleEvent::Recalled { .. }, BattleEvent::SentOut { species: Species::Charmander, .. }]
        ));
    }
}
