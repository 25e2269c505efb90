//! What happens after an action knocks a combatant out: experience and new
//! moves for the winner, a replacement for the loser, or the end of the battle.

use crate::battle::animation;
use crate::battle::coordinator::{end_battle, evolve_if_ready, BattleSession};
use crate::battle::decoration;
use crate::battle::selectors;
use crate::battle::sequencer::Continuation;
use crate::battle::state::{BattleEvent, BattleInfo, BattleOutcome};
use crate::errors::LearnMoveError;
use crate::progression::{
    award_effort, experience_yield, gain_experience, learn_move, moves_learned_at_level,
};
use crate::teams::Side;
use schema::Move;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

const KEEP_OLD_MOVES: &str = "KEEP OLD MOVES";

/// Check both active combatants after an action. `next` resumes when both
/// sides have someone standing; it is abandoned if the battle ends. The
/// opponent is handled first, so a double knockout with nobody left on either
/// side is a player victory.
pub fn after_action(session: &mut BattleSession, next: Continuation) {
    if session.info.outcome.is_some() {
        next.abandon();
    } else if session.info.active(Side::Opponent).is_fainted() {
        opponent_fainted(session, next);
    } else if session.info.active(Side::Player).is_fainted() {
        player_fainted(session, next);
    } else {
        next.resume(());
    }
}

/// Record an event and show its text, if it has any.
fn announce(session: &mut BattleSession, event: BattleEvent, done: Continuation) {
    let text = event.format(&session.info);
    session.info.push_event(event);
    match text {
        Some(text) => session.say(text, done),
        None => done.resume(()),
    }
}

/// Experience and effort for the player's active combatant. Returns the moves
/// its learnset offers at every level it just reached.
fn award_experience(info: &mut BattleInfo) -> Vec<Move> {
    let winner = info.active_actor(Side::Player);
    if info.combatant(winner).is_fainted() {
        return Vec::new();
    }
    let defeated = info.active(Side::Opponent);
    let defeated_species = defeated.species;
    let amount = experience_yield(
        defeated,
        info.is_trainer_battle(),
        info.config.trainer_experience_multiplier,
    );

    let combatant = info.combatant_mut(winner);
    award_effort(combatant, defeated_species);
    let species = combatant.species;
    let from = combatant.level;
    gain_experience(combatant, amount);
    let to = combatant.level;

    info.push_event(BattleEvent::ExperienceGained { species, amount });
    let mut offered = Vec::new();
    for level in from + 1..=to {
        info.push_event(BattleEvent::LevelUp { species, level });
        offered.extend(moves_learned_at_level(species, level));
    }
    if to > from {
        info.leveled_up.insert(winner.index);
    }
    offered
}

fn opponent_fainted(session: &mut BattleSession, next: Continuation) {
    let start = session.info.events.len();
    let offered: VecDeque<Move> = award_experience(&mut session.info).into();
    let events = session.info.events.since(start).to_vec();
    let sequence = animation::for_events(&events, &session.info);

    let replace = session.continuation("replace opponent", move |session, ()| {
        replace_opponent(session, next)
    });
    let evolve = session.continuation("evolve winner", move |session, ()| {
        evolve_winner(session, replace)
    });
    let teach = session.continuation("teach moves", move |session, ()| {
        teach_moves(session, offered, evolve)
    });
    sequence.run(session, teach);
}

/// With more opponents still to come, the player's active combatant evolves
/// on the spot. After the last knockout evolution waits for the end of the
/// battle.
fn evolve_winner(session: &mut BattleSession, done: Continuation) {
    if !session.info.team(Side::Opponent).has_living() {
        done.resume(());
        return;
    }
    let start = session.info.events.len();
    let winner = session.info.team(Side::Player).selected;
    if !evolve_if_ready(&mut session.info, winner) {
        done.resume(());
        return;
    }
    let events = session.info.events.since(start).to_vec();
    let sequence = animation::for_events(&events, &session.info).action(decoration::refresh);
    sequence.run(session, done);
}

/// Offer each move in turn. A free slot takes it at once; a full move list
/// asks which move to forget.
fn teach_moves(session: &mut BattleSession, mut offered: VecDeque<Move>, done: Continuation) {
    let Some(move_) = offered.pop_front() else {
        done.resume(());
        return;
    };
    let actor = session.info.active_actor(Side::Player);
    let combatant = session.info.combatant_mut(actor);
    let species = combatant.species;

    match learn_move(combatant, move_, None) {
        Ok(_) => {
            let rest = session.continuation("remaining moves", move |session, ()| {
                teach_moves(session, offered, done)
            });
            let event = BattleEvent::MoveLearned {
                species,
                move_learned: move_,
                forgot: None,
            };
            announce(session, event, rest);
        }
        Err(LearnMoveError::NoFreeSlot(_)) => {
            let mut options = vec![KEEP_OLD_MOVES.to_string()];
            options.extend(
                combatant
                    .moves
                    .iter()
                    .map(|slot| slot.move_.name().to_uppercase()),
            );
            let prompt = format!(
                "{} is trying to learn {}! Delete an older move?",
                combatant.name(),
                move_.name().to_uppercase()
            );
            let chosen = session.continuation("forget move", move |session, index: usize| {
                let event = forget_and_learn(session, actor.index, move_, index);
                let rest = session.continuation("remaining moves", move |session, ()| {
                    teach_moves(session, offered, done)
                });
                announce(session, event, rest);
            });
            let ask = session.continuation("forget prompt", move |session, ()| {
                session.offer(options, chosen)
            });
            session.say(prompt, ask);
        }
        Err(err) => {
            debug!(%err, "move not offered");
            teach_moves(session, offered, done);
        }
    }
}

/// Option 0 keeps the old moves; option `k` forgets slot `k - 1`.
fn forget_and_learn(
    session: &mut BattleSession,
    index: usize,
    move_: Move,
    choice: usize,
) -> BattleEvent {
    let combatant = &mut session.info.team_mut(Side::Player).actors[index];
    let species = combatant.species;
    let skipped = BattleEvent::MoveNotLearned {
        species,
        move_skipped: move_,
    };
    if choice == 0 {
        return skipped;
    }
    match learn_move(combatant, move_, Some(choice - 1)) {
        Ok(forgot) => BattleEvent::MoveLearned {
            species,
            move_learned: move_,
            forgot,
        },
        Err(err) => {
            warn!(%err, choice, "could not replace move");
            skipped
        }
    }
}

fn replace_opponent(session: &mut BattleSession, next: Continuation) {
    match selectors::opponent_after_knockout(session) {
        Some(index) => send_in(session, Side::Opponent, index, next),
        None => {
            info!("opponent is out of combatants");
            next.abandon();
            let finish = session.continuation("player victory", |session, ()| {
                end_battle(session, BattleOutcome::PlayerVictory)
            });
            announce(
                session,
                BattleEvent::OutOfCombatants {
                    side: Side::Opponent,
                },
                finish,
            );
        }
    }
}

fn player_fainted(session: &mut BattleSession, next: Continuation) {
    if !session.info.team(Side::Player).has_living() {
        info!("player is out of combatants");
        next.abandon();
        let finish = session.continuation("opponent victory", |session, ()| {
            end_battle(session, BattleOutcome::OpponentVictory)
        });
        announce(
            session,
            BattleEvent::OutOfCombatants { side: Side::Player },
            finish,
        );
        return;
    }
    let replaced = session.continuation("player replacement", move |session, index: usize| {
        send_in(session, Side::Player, index, next)
    });
    selectors::forced_replacement(session, replaced);
}

/// Bring `index` in for `side`, show it, then check the field again.
fn send_in(session: &mut BattleSession, side: Side, index: usize, next: Continuation) {
    session.info.team_mut(side).switch_to(index);
    let species = session.info.active(side).species;
    debug!(?side, ?species, index, "replacement sent in");

    let start = session.info.events.len();
    session
        .info
        .push_event(BattleEvent::SentOut {
            side,
            index,
            species,
        });
    let events = session.info.events.since(start).to_vec();
    let sequence = animation::for_events(&events, &session.info);
    let recheck = session.continuation("recheck field", move |session, ()| {
        after_action(session, next)
    });
    sequence.run(session, recheck);
}
