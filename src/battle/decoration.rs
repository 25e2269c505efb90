//! Status-line contents for each side.

use crate::battle::coordinator::BattleSession;
use crate::battle::state::BattleInfo;
use crate::pokemon::StatusCondition;
use crate::services::Hud;
use crate::teams::Side;

pub fn status_label(status: StatusCondition) -> &'static str {
    match status {
        StatusCondition::Sleep(_) => "SLP",
        StatusCondition::Poison => "PSN",
        StatusCondition::Burn => "BRN",
        StatusCondition::Freeze => "FRZ",
        StatusCondition::Paralysis => "PAR",
    }
}

pub fn hud_for(info: &BattleInfo, side: Side) -> Hud {
    let active = info.active(side);
    Hud {
        name: active.name().to_string(),
        level: active.level,
        current_hp: active.current_hp(),
        max_hp: active.max_hp(),
        status: active.status.map(|status| status_label(status).to_string()),
    }
}

/// Redraw both sides' status lines from the current state.
pub fn refresh(session: &mut BattleSession) {
    for side in [Side::Player, Side::Opponent] {
        let hud = hud_for(&session.info, side);
        session.services.effects.show_hud(side, &hud);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::pokemon::Combatant;
    use crate::teams::Team;
    use pretty_assertions::assert_eq;
    use schema::Species;

    #[test]
    fn hud_reflects_the_active_combatant() {
        let mut pikachu = Combatant::new(Species::Pikachu, 25, None).unwrap();
        pikachu.status = Some(StatusCondition::Paralysis);
        pikachu.take_damage(10);
        let info = BattleInfo::new(
            Team::player("RED", vec![pikachu.clone()]).unwrap(),
            Team::wild(Species::Pidgey, 10).unwrap(),
            BattleConfig::default(),
        );

        let hud = hud_for(&info, Side::Player);
        assert_eq!(hud.name, "PIKACHU");
        assert_eq!(hud.level, 25);
        assert_eq!(hud.current_hp, pikachu.current_hp());
        assert_eq!(hud.status.as_deref(), Some("PAR"));
        assert_eq!(hud_for(&info, Side::Opponent).status, None);
    }
}
