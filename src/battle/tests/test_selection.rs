#[cfg(test)]
mod tests {
    use crate::battle::coordinator::BattleSetup;
    use crate::battle::state::{BattleEvent, Phase, SelectorState};
    use crate::battle::tests::common::{
        assert_ok, save_with, strong_raichu, trainer_setup, wild_setup, Harness,
        TestCombatantBuilder,
    };
    use crate::services::HeadlessMenu;
    use crate::teams::Side;
    use pretty_assertions::assert_eq;
    use schema::{Item, Move, Species};

    fn passive_rattata() -> crate::pokemon::Combatant {
        TestCombatantBuilder::new(Species::Rattata, 3)
            .with_moves(vec![Move::Growl])
            .build()
    }

    #[test]
    fn switching_to_the_active_combatant_is_rejected() {
        // Arrange: POKEMON, then the slot that is already out.
        let party = vec![
            TestCombatantBuilder::new(Species::Pikachu, 20).build(),
            TestCombatantBuilder::new(Species::Charmander, 20).build(),
        ];
        let mut harness = Harness::new(save_with(party), HeadlessMenu::new(false).with_choices([2, 0]));

        // Act
        assert_ok(harness.start(wild_setup(passive_rattata())));
        harness.drive();

        // Assert: back in the party menu with nothing changed.
        assert!(harness.saw_line("PIKACHU is already out!"));
        let info = harness.coordinator.info().expect("battle should still be running");
        assert_eq!(info.team(Side::Player).selected, 0);
        assert_eq!(info.selectors[0], SelectorState::Party);
        assert_eq!(harness.coordinator.phase(), Phase::SelectingActions);
        assert!(harness.menu.is_waiting());

        // A valid pick goes through.
        assert!(harness.menu.choose(1));
        harness.drive();
        let info = harness.coordinator.info().expect("battle should still be running");
        assert_eq!(info.team(Side::Player).selected, 1);
        assert_eq!(info.active(Side::Player).species, Species::Charmander);
        assert_eq!(info.turn_number, 2);
        assert!(harness.saw_line("PIKACHU enough! Come back!"));
        assert!(harness.saw_line("Go! CHARMANDER!"));

        harness.abort();
    }

    #[test]
    fn switching_to_a_fainted_combatant_is_rejected() {
        let party = vec![
            TestCombatantBuilder::new(Species::Pikachu, 20).build(),
            TestCombatantBuilder::new(Species::Charmander, 20).with_hp(0).build(),
        ];
        let mut harness = Harness::new(save_with(party), HeadlessMenu::new(false).with_choices([2, 1]));

        assert_ok(harness.start(wild_setup(passive_rattata())));
        harness.drive();

        assert!(harness.saw_line("There's no will to fight!"));
        let info = harness.coordinator.info().expect("battle should still be running");
        assert_eq!(info.team(Side::Player).selected, 0);
        harness.abort();
    }

    #[test]
    fn running_from_a_trainer_is_rejected() {
        let mut harness = Harness::new(
            save_with(vec![strong_raichu()]),
            HeadlessMenu::new(false).with_choices([3]),
        );

        assert_ok(harness.start(trainer_setup("misty")));
        harness.drive();

        assert!(harness.saw_line("Misty wants to fight!"));
        assert!(harness.saw_line("No! There's no running from a trainer battle!"));
        let info = harness.coordinator.info().expect("battle should still be running");
        assert_eq!(info.outcome, None);
        assert_eq!(info.flee_attempts, 0);
        assert_eq!(info.selectors[0], SelectorState::TopLevel);
        harness.abort();
    }

    #[test]
    fn an_empty_bag_is_rejected() {
        let mut harness = Harness::new(
            save_with(vec![strong_raichu()]),
            HeadlessMenu::new(false).with_choices([1]),
        );

        assert_ok(harness.start(assert_ok(BattleSetup::wild(Species::Rattata, 3))));
        harness.drive();

        assert!(harness.saw_line("There are no items to use!"));
        assert_eq!(
            harness.coordinator.info().map(|info| info.selectors[0]),
            Some(SelectorState::TopLevel)
        );
        harness.abort();
    }

    #[test]
    fn a_move_without_pp_is_rejected() {
        let mut pikachu = TestCombatantBuilder::new(Species::Pikachu, 20)
            .with_moves(vec![Move::ThunderShock, Move::Growl])
            .build();
        pikachu.moves[0].pp = 0;
        let mut harness = Harness::new(
            save_with(vec![pikachu]),
            HeadlessMenu::new(false).with_choices([0, 0]),
        );

        assert_ok(harness.start(wild_setup(passive_rattata())));
        harness.drive();

        assert!(harness.saw_line("No PP left for this move!"));
        assert_eq!(
            harness.coordinator.info().map(|info| info.selectors[0]),
            Some(SelectorState::Moves)
        );
        harness.abort();
    }

    #[test]
    fn using_a_potion_heals_and_spends_it() {
        let hurt = TestCombatantBuilder::new(Species::Pikachu, 20)
            .with_hp(5)
            .build();
        let save = save_with(vec![hurt]).with_item(Item::Potion, 1);
        let mut harness = Harness::new(save, HeadlessMenu::new(false).with_choices([1, 0]));

        assert_ok(harness.start(wild_setup(passive_rattata())));
        harness.drive();

        let info = harness.coordinator.info().expect("battle should still be running");
        let pikachu = info.active(Side::Player);
        assert_eq!(pikachu.current_hp(), 25.min(pikachu.max_hp()));
        assert_eq!(info.inventory.get(&Item::Potion), None);
        assert!(info
            .events
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::ItemUsed { item: Item::Potion })));
        assert!(harness.saw_line("RED used POTION!"));
        assert_eq!(info.turn_number, 2);
        harness.abort();
    }

    #[test]
    fn choosing_a_move_records_it() {
        let mut harness = Harness::new(
            save_with(vec![TestCombatantBuilder::new(Species::Pikachu, 20)
                .with_moves(vec![Move::Growl, Move::ThunderShock])
                .build()]),
            HeadlessMenu::new(false).with_choices([0, 0]),
        );

        assert_ok(harness.start(wild_setup(passive_rattata())));
        harness.drive();

        // Turn two is waiting on the top-level menu; turn one used Growl.
        assert!(harness.saw_line("PIKACHU used GROWL!"));
        let info = harness.coordinator.info().expect("battle should still be running");
        assert_eq!(info.turn_number, 2);
        assert_eq!(info.selectors, [SelectorState::TopLevel; 2]);
        assert_eq!(
            info.active(Side::Player).moves[0].pp,
            info.active(Side::Player).moves[0].max_pp - 1
        );
        harness.abort();
    }
}
