//! Turn ordering for the two chosen actions.

use crate::battle::state::{Action, BattleInfo, TeamAndAction};
use crate::move_data::get_move_data;
use crate::teams::Side;
use tracing::debug;

/// True when `first` should go before `second`.
type OrderFilter = fn(&TeamAndAction, &TeamAndAction, &BattleInfo) -> bool;

/// Checked in order. The first filter that holds for exactly one of the two
/// possible orderings decides.
const FILTERS: [(&str, OrderFilter); 6] = [
    ("flee", player_flees_first),
    ("switch", switches_first),
    ("item", items_first),
    ("move priority", higher_move_priority_first),
    ("speed", faster_first),
    ("move", moves_first),
];

fn player_flees_first(first: &TeamAndAction, _: &TeamAndAction, _: &BattleInfo) -> bool {
    first.source.side == Side::Player && first.action == Action::Flee
}

fn switches_first(first: &TeamAndAction, _: &TeamAndAction, _: &BattleInfo) -> bool {
    matches!(first.action, Action::Switch { .. })
}

fn items_first(first: &TeamAndAction, _: &TeamAndAction, _: &BattleInfo) -> bool {
    matches!(first.action, Action::Item { .. })
}

fn move_priority(action: &Action) -> Option<i8> {
    match action {
        Action::Move { move_ } => Some(get_move_data(*move_).priority),
        _ => None,
    }
}

fn higher_move_priority_first(
    first: &TeamAndAction,
    second: &TeamAndAction,
    _: &BattleInfo,
) -> bool {
    match (move_priority(&first.action), move_priority(&second.action)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

fn faster_first(first: &TeamAndAction, second: &TeamAndAction, info: &BattleInfo) -> bool {
    let speed = |taa: &TeamAndAction| info.active(taa.source.side).stats.speed.current;
    speed(first) > speed(second)
}

fn moves_first(first: &TeamAndAction, _: &TeamAndAction, _: &BattleInfo) -> bool {
    first.action.is_move()
}

/// Bind each team's action to its active combatant and the other side's.
pub fn bind(side: Side, action: Action, info: &BattleInfo) -> TeamAndAction {
    TeamAndAction {
        action,
        source: info.active_actor(side),
        target: info.active_actor(side.opponent()),
    }
}

/// Order the turn's two actions. Unresolved ties keep the opponent first.
pub fn order(opponent_action: Action, player_action: Action, info: &BattleInfo) -> [TeamAndAction; 2] {
    let opponent = bind(Side::Opponent, opponent_action, info);
    let player = bind(Side::Player, player_action, info);

    for (name, filter) in FILTERS {
        let opponent_first = filter(&opponent, &player, info);
        let player_first = filter(&player, &opponent, info);
        if opponent_first != player_first {
            debug!(decided_by = name, player_first, "turn order");
            return if player_first {
                [player, opponent]
            } else {
                [opponent, player]
            };
        }
    }
    debug!("turn order tied, opponent first");
    [opponent, player]
}
