//! Running from a wild battle.

use crate::battle::coordinator::BattleSession;
use crate::battle::rng::BattleRng;
use crate::battle::sequencer::Continuation;
use crate::battle::state::{BattleEvent, BattleInfo};
use crate::teams::Side;
use tracing::debug;

/// Only a trainer on the other side stops a team from running.
pub fn can_team_attempt_flee(info: &BattleInfo, side: Side) -> bool {
    !info.team(side.opponent()).is_trainer()
}

/// One escape roll for the player. Counts the attempt first, then compares
/// the player's current speed against a quarter of the opponent's normal
/// speed; each attempt made this battle adds a flat bonus.
pub fn roll(info: &mut BattleInfo, rng: &mut BattleRng) -> bool {
    info.flee_attempts += 1;
    let speed = info.active(Side::Player).stats.speed.current as u32;
    let opponent_speed = (info.active(Side::Opponent).stats.speed.normal as u32 / 4) % 256;
    if opponent_speed == 0 {
        return true;
    }
    let odds = speed * 32 / opponent_speed + info.flee_attempts * info.config.flee_attempt_bonus;
    debug!(speed, opponent_speed, odds, attempts = info.flee_attempts, "flee roll");
    if odds > 255 {
        return true;
    }
    rng.random_int(256, "flee") < odds
}

/// Roll, record and announce the result. `on_complete` gets whether the
/// player got away once the text has been read.
pub fn attempt(session: &mut BattleSession, on_complete: Continuation<bool>) {
    let escaped = roll(&mut session.info, &mut session.services.rng);
    let event = if escaped {
        BattleEvent::FleeSucceeded
    } else {
        BattleEvent::FleeFailed
    };
    let text = event.format(&session.info).unwrap_or_default();
    session.info.push_event(event);
    let next = session.continuation("flee result", move |_, ()| on_complete.resume(escaped));
    session.say(text, next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::pokemon::Combatant;
    use crate::teams::{create_trainer_team, Team};
    use pretty_assertions::assert_eq;
    use schema::Species;

    fn wild_info(player_speed: u16, opponent_normal_speed: u16) -> BattleInfo {
        let mut player = Combatant::new(Species::Pikachu, 20, None).unwrap();
        player.stats.speed.current = player_speed;
        let mut opponent = Team::wild(Species::Rattata, 20).unwrap();
        opponent.active_mut().stats.speed.normal = opponent_normal_speed;
        BattleInfo::new(
            Team::player("RED", vec![player]).unwrap(),
            opponent,
            BattleConfig::default(),
        )
    }

    #[test]
    fn overwhelming_odds_escape_without_a_draw() {
        let mut info = wild_info(103, 10);
        let mut rng = BattleRng::new_for_test([]);
        assert!(roll(&mut info, &mut rng));
        assert_eq!(info.flee_attempts, 1);
    }

    #[test]
    fn a_very_slow_opponent_cannot_stop_anyone() {
        let mut info = wild_info(1, 3);
        assert!(roll(&mut info, &mut BattleRng::new_for_test([])));
    }

    #[test]
    fn odds_use_the_opponents_speed() {
        // 20 * 32 / (80 / 4) + 30 = 62; a draw of 64 fails.
        let mut info = wild_info(20, 80);
        let mut rng = BattleRng::new_for_test([0.25, 0.25]);
        assert!(!roll(&mut info, &mut rng));
        // The second attempt adds another 30: 92 beats 64.
        assert!(roll(&mut info, &mut rng));
        assert_eq!(info.flee_attempts, 2);
    }

    #[test]
    fn trainers_block_running() {
        let info = BattleInfo::new(
            Team::player("RED", vec![Combatant::new(Species::Pikachu, 20, None).unwrap()]).unwrap(),
            create_trainer_team("brock").unwrap(),
            BattleConfig::default(),
        );
        assert!(!can_team_attempt_flee(&info, Side::Player));
        assert!(can_team_attempt_flee(&wild_info(10, 10), Side::Player));
    }
}
