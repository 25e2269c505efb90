//! Presentation sequences built from what the simulation recorded.

use crate::battle::decoration;
use crate::battle::sequencer::Sequence;
use crate::battle::state::{BattleEvent, BattleInfo};
use crate::services::{Effect, SlideDirection, Target};
use crate::teams::Side;

/// Screen fade-in, the opposing trainer's entrance and both send-outs.
pub fn battle_start(info: &BattleInfo, intro: &[BattleEvent]) -> Sequence {
    let mut sequence = Sequence::new("battle start").effect(Effect::Fade {
        target: Target::Screen,
        to_black: false,
    });
    if let Some(leader) = info.team(Side::Opponent).leader() {
        sequence = sequence
            .effect(Effect::Slide {
                target: Target::Trainer(Side::Opponent),
                direction: SlideDirection::In,
            })
            .dialog(format!("{} wants to fight!", leader.name))
            .effect(Effect::Slide {
                target: Target::Trainer(Side::Opponent),
                direction: SlideDirection::Out,
            });
    }
    sequence.append(for_events(intro, info))
}

/// A combatant entering the field.
pub fn switch_enter(side: Side) -> Sequence {
    Sequence::new("switch enter")
        .effect(Effect::Slide {
            target: Target::Sprite(side),
            direction: SlideDirection::In,
        })
        .action(decoration::refresh)
}

/// The player's side shakes when hit; the opponent's sprite flickers.
pub fn hit(side: Side) -> Effect {
    match side {
        Side::Player => Effect::Shake {
            target: Target::Sprite(side),
        },
        Side::Opponent => Effect::Flicker {
            target: Target::Sprite(side),
        },
    }
}

fn health_bar(side: Side, from: u16, to: u16, max: u16) -> Sequence {
    Sequence::new("health bar")
        .effect(Effect::HealthBar {
            side,
            from,
            to,
            max,
        })
        .action(decoration::refresh)
}

/// One step per event, in order: text for anything that has some, plus the
/// sprite and health-bar effects that go with damage, healing and send-outs.
pub fn for_events(events: &[BattleEvent], info: &BattleInfo) -> Sequence {
    let mut sequence = Sequence::new("events");
    for event in events {
        match event {
            BattleEvent::SentOut { side, .. } => {
                if let Some(text) = event.format(info) {
                    sequence = sequence.dialog(text);
                }
                sequence = sequence.append(switch_enter(*side));
            }
            BattleEvent::Recalled { side, .. } | BattleEvent::Fainted { side, .. } => {
                sequence = sequence.effect(Effect::Slide {
                    target: Target::Sprite(*side),
                    direction: SlideDirection::Out,
                });
                if let Some(text) = event.format(info) {
                    sequence = sequence.dialog(text);
                }
            }
            BattleEvent::DamageDealt {
                side,
                previous_hp,
                remaining_hp,
                max_hp,
                ..
            } => {
                sequence = sequence
                    .effect(hit(*side))
                    .append(health_bar(*side, *previous_hp, *remaining_hp, *max_hp));
            }
            BattleEvent::StatusDamage {
                side,
                previous_hp,
                remaining_hp,
                max_hp,
                ..
            } => {
                if let Some(text) = event.format(info) {
                    sequence = sequence.dialog(text);
                }
                sequence = sequence.append(health_bar(*side, *previous_hp, *remaining_hp, *max_hp));
            }
            BattleEvent::Healed {
                side,
                previous_hp,
                remaining_hp,
                max_hp,
                ..
            } => {
                sequence = sequence.append(health_bar(*side, *previous_hp, *remaining_hp, *max_hp));
                if let Some(text) = event.format(info) {
                    sequence = sequence.dialog(text);
                }
            }
            BattleEvent::StatusApplied { .. }
            | BattleEvent::StatusCured { .. }
            | BattleEvent::WokeUp { .. } => {
                if let Some(text) = event.format(info) {
                    sequence = sequence.dialog(text);
                }
                sequence = sequence.action(decoration::refresh);
            }
            _ => {
                if let Some(text) = event.format(info) {
                    sequence = sequence.dialog(text);
                }
            }
        }
    }
    sequence
}

/// The victory theme, if there is one.
pub fn victory(info: &BattleInfo) -> Sequence {
    let sequence = Sequence::new("victory");
    match info.ending_theme.clone() {
        Some(theme) => sequence.action(move |session| session.services.effects.play_theme(&theme)),
        None => sequence,
    }
}

/// Screen fade-out.
pub fn battle_end() -> Sequence {
    Sequence::new("battle end").effect(Effect::Fade {
        target: Target::Screen,
        to_black: true,
    })
}
