//! Per-team action selection.
//!
//! The player walks a small menu tree; every leaf either resumes `done` with
//! an [`Action`] or rejects the choice and goes back to the menu it came from.
//! The opponent decides on the spot.

use crate::battle::ai;
use crate::battle::coordinator::{end_battle, BattleSession};
use crate::battle::flee;
use crate::battle::sequencer::Continuation;
use crate::battle::state::{Action, BattleOutcome, SelectorState};
use crate::errors::SelectionRejection;
use crate::teams::Side;
use schema::{Item, Move};
use tracing::{debug, warn};

const TOP_LEVEL_OPTIONS: [&str; 4] = ["FIGHT", "ITEM", "POKEMON", "RUN"];
const BACK: &str = "BACK";

type Menu = fn(&mut BattleSession, Continuation<Action>);

fn set_state(session: &mut BattleSession, side: Side, state: SelectorState) {
    session.info.selectors[side.index()] = state;
}

fn choose(session: &mut BattleSession, action: Action, done: Continuation<Action>) {
    debug!(?action, "player action chosen");
    set_state(session, Side::Player, SelectorState::Chosen(action));
    done.resume(action);
}

/// Show why a choice was refused, then reopen `back`.
fn reject(
    session: &mut BattleSession,
    rejection: SelectionRejection,
    back: Menu,
    done: Continuation<Action>,
) {
    warn!(%rejection, "selection rejected");
    let reopen = session.continuation("reopen menu", move |session, ()| back(session, done));
    session.say(rejection.to_string(), reopen);
}

/// Top-level menu for the player's turn.
pub fn select_player_action(session: &mut BattleSession, done: Continuation<Action>) {
    set_state(session, Side::Player, SelectorState::TopLevel);
    let options = TOP_LEVEL_OPTIONS.iter().map(|o| o.to_string()).collect();
    let chosen = session.continuation("top level", move |session, index: usize| match index {
        0 => fight_menu(session, done),
        1 => item_menu(session, done),
        2 => party_menu(session, done),
        _ => run(session, done),
    });
    session.offer(options, chosen);
}

fn fight_menu(session: &mut BattleSession, done: Continuation<Action>) {
    let active = session.info.active(Side::Player);
    if !active.has_usable_move() {
        let text = format!("{} has no moves left!", active.name());
        let struggle = session.continuation("struggle", move |session, ()| {
            choose(
                session,
                Action::Move {
                    move_: Move::Struggle,
                },
                done,
            )
        });
        session.say(text, struggle);
        return;
    }

    let slots = active.moves.clone();
    set_state(session, Side::Player, SelectorState::Moves);
    let mut options: Vec<String> = slots
        .iter()
        .map(|slot| format!("{} {}/{}", slot.move_.name().to_uppercase(), slot.pp, slot.max_pp))
        .collect();
    options.push(BACK.to_string());

    let chosen = session.continuation("fight menu", move |session, index: usize| {
        match slots.get(index) {
            None => select_player_action(session, done),
            Some(slot) if slot.pp == 0 => reject(session, SelectionRejection::NoPp, fight_menu, done),
            Some(slot) => choose(session, Action::Move { move_: slot.move_ }, done),
        }
    });
    session.offer(options, chosen);
}

fn bag(session: &BattleSession) -> Vec<(Item, u32)> {
    session
        .info
        .inventory
        .iter()
        .filter(|(item, count)| item.usable_in_battle() && **count > 0)
        .map(|(item, count)| (*item, *count))
        .collect()
}

fn item_menu(session: &mut BattleSession, done: Continuation<Action>) {
    let items = bag(session);
    if items.is_empty() {
        reject(session, SelectionRejection::NoItems, select_player_action, done);
        return;
    }

    set_state(session, Side::Player, SelectorState::Items);
    let mut options: Vec<String> = items
        .iter()
        .map(|(item, count)| format!("{} x{}", item.name(), count))
        .collect();
    options.push(BACK.to_string());

    let chosen = session.continuation("item menu", move |session, index: usize| {
        match items.get(index) {
            Some((item, _)) => choose(session, Action::Item { item: *item }, done),
            None => select_player_action(session, done),
        }
    });
    session.offer(options, chosen);
}

fn party_options(session: &BattleSession) -> Vec<String> {
    session
        .info
        .team(Side::Player)
        .actors
        .iter()
        .map(|c| format!("{} L{} {}/{}", c.name(), c.level, c.current_hp(), c.max_hp()))
        .collect()
}

/// Whether the player may bring `index` in.
fn check_switch(session: &BattleSession, index: usize) -> Result<(), SelectionRejection> {
    let team = session.info.team(Side::Player);
    let candidate = &team.actors[index];
    if index == team.selected {
        return Err(SelectionRejection::AlreadyActive(candidate.name().to_string()));
    }
    if candidate.is_fainted() {
        return Err(SelectionRejection::Fainted);
    }
    Ok(())
}

fn party_menu(session: &mut BattleSession, done: Continuation<Action>) {
    set_state(session, Side::Player, SelectorState::Party);
    let mut options = party_options(session);
    let party_size = options.len();
    options.push(BACK.to_string());

    let chosen = session.continuation("party menu", move |session, index: usize| {
        if index >= party_size {
            select_player_action(session, done);
            return;
        }
        match check_switch(session, index) {
            Ok(()) => choose(session, Action::Switch { new_actor: index }, done),
            Err(rejection) => reject(session, rejection, party_menu, done),
        }
    });
    session.offer(options, chosen);
}

fn run(session: &mut BattleSession, done: Continuation<Action>) {
    if !flee::can_team_attempt_flee(&session.info, Side::Player) {
        reject(
            session,
            SelectionRejection::NoRunningFromTrainer,
            select_player_action,
            done,
        );
        return;
    }
    let result = session.continuation("flee", move |session, escaped: bool| {
        if escaped {
            done.abandon();
            end_battle(session, BattleOutcome::PlayerFled);
        } else {
            choose(session, Action::Flee, done);
        }
    });
    flee::attempt(session, result);
}

/// Party menu after the player's active combatant fainted. There is no way
/// back out; `done` gets the index of a living replacement.
pub fn forced_replacement(session: &mut BattleSession, done: Continuation<usize>) {
    set_state(session, Side::Player, SelectorState::Party);
    let options = party_options(session);
    let chosen = session.continuation("forced replacement", move |session, index: usize| {
        let team = session.info.team(Side::Player);
        let index = index.min(team.actors.len() - 1);
        if team.actors[index].is_fainted() {
            warn!(index, "fainted combatant picked as replacement");
            let reopen = session.continuation("reopen replacement", move |session, ()| {
                forced_replacement(session, done)
            });
            session.say(SelectionRejection::Fainted.to_string(), reopen);
        } else {
            done.resume(index);
        }
    });
    session.offer(options, chosen);
}

/// The opponent's action for this turn.
pub fn select_opponent_action(session: &mut BattleSession, done: Continuation<Action>) {
    let action = ai::next_action(&session.info, Side::Opponent, &mut session.services.rng);
    debug!(?action, "opponent action chosen");
    set_state(session, Side::Opponent, SelectorState::Chosen(action));
    done.resume(action);
}

/// Replacement for the opponent's knocked-out combatant, or `None` when the
/// opponent is out of combatants.
pub fn opponent_after_knockout(session: &BattleSession) -> Option<usize> {
    ai::after_knockout(&session.info, Side::Opponent)
}
