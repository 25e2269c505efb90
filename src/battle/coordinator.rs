//! Session lifecycle and the turn loop.
//!
//! A [`BattleCoordinator`] owns the collaborators between battles and lends
//! them to a [`BattleSession`] while one runs. Every step of the battle is a
//! task on the coordinator's scheduler; [`BattleCoordinator::run_until_idle`]
//! drains them until the battle either ends or waits on the player.

use crate::battle::action_order;
use crate::battle::animation;
use crate::battle::decoration;
use crate::battle::effects;
use crate::battle::fainting;
use crate::battle::selectors;
use crate::battle::sequencer::{Continuation, Scheduler, Sequence};
use crate::battle::state::{
    Action, BattleEvent, BattleInfo, BattleOutcome, Phase, SelectorState, TeamAndAction,
};
use crate::config::BattleConfig;
use crate::errors::{BattleResult, BattleStateError};
use crate::progression::{check_evolutions, evolve};
use crate::services::{Services, BATTLE_MENU};
use crate::teams::{create_trainer_team, Side, Team};
use schema::Species;
use std::collections::VecDeque;
use tracing::{debug, error, info, trace, warn};

type CompletionCallback = Box<dyn FnOnce(BattleOutcome)>;

/// Who the player is up against.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub opponent: Team,
}

impl BattleSetup {
    pub fn wild(species: Species, level: u8) -> BattleResult<Self> {
        Ok(BattleSetup {
            opponent: Team::wild(species, level)?,
        })
    }

    pub fn trainer(id: &str) -> BattleResult<Self> {
        Ok(BattleSetup {
            opponent: create_trainer_team(id)?,
        })
    }
}

/// One running battle: the state plus the collaborators it borrowed.
pub struct BattleSession {
    pub info: BattleInfo,
    pub services: Services,
    scheduler: Scheduler,
    on_complete: Option<CompletionCallback>,
    finished: bool,
}

impl BattleSession {
    pub fn continuation<T: 'static>(
        &self,
        label: impl Into<String>,
        next: impl FnOnce(&mut BattleSession, T) + 'static,
    ) -> Continuation<T> {
        self.scheduler.continuation(label, next)
    }

    /// Show a line of battle text; `done` resumes once it has been read.
    pub fn say(&mut self, text: impl Into<String>, done: Continuation) {
        self.services
            .menu
            .add_dialog(BATTLE_MENU, text.into(), Some(done));
    }

    /// Offer a list of options; `chosen` resumes with the picked index.
    pub fn offer(&mut self, options: Vec<String>, chosen: Continuation<usize>) {
        self.services.menu.add_options(BATTLE_MENU, options, chosen);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Report the outcome to whoever started the battle.
    pub fn complete(&mut self, outcome: BattleOutcome) {
        let Some(on_complete) = self.on_complete.take() else {
            panic!("battle completion reported twice");
        };
        self.finished = true;
        on_complete(outcome);
    }
}

impl std::fmt::Debug for BattleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleSession")
            .field("phase", &self.info.phase)
            .field("turn_number", &self.info.turn_number)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Runs one battle at a time against a fixed set of collaborators.
pub struct BattleCoordinator {
    scheduler: Scheduler,
    services: Option<Services>,
    session: Option<BattleSession>,
    config: BattleConfig,
}

impl BattleCoordinator {
    pub fn new(services: Services, config: BattleConfig) -> Self {
        BattleCoordinator {
            scheduler: Scheduler::new(),
            services: Some(services),
            session: None,
            config,
        }
    }

    /// Begin a battle against `setup`'s opponent with the party in the store.
    /// `on_complete` is called exactly once, after teardown.
    pub fn start(
        &mut self,
        setup: BattleSetup,
        on_complete: impl FnOnce(BattleOutcome) + 'static,
    ) -> BattleResult<()> {
        if self.session.is_some() {
            return Err(BattleStateError::BattleInProgress.into());
        }
        let Some(mut services) = self.services.take() else {
            return Err(BattleStateError::BattleInProgress.into());
        };

        let party = services.store.party();
        if !party.iter().any(|combatant| !combatant.is_fainted()) {
            self.services = Some(services);
            return Err(BattleStateError::NoUsableCombatant.into());
        }
        let player = match Team::player(services.store.player_name(), party) {
            Ok(team) => team,
            Err(err) => {
                self.services = Some(services);
                return Err(err);
            }
        };

        let mut info = BattleInfo::new(player, setup.opponent, self.config.clone());
        info.inventory = services.store.inventory();
        info.money = services.store.money();
        info.phase = Phase::Starting;

        services.overworld.suspend();
        services.menu.create_menu(BATTLE_MENU);
        services.menu.set_active(BATTLE_MENU);

        info!(
            player = info.player_name(),
            opponent = info.side_name(Side::Opponent),
            trainer = info.is_trainer_battle(),
            "battle started"
        );

        self.session = Some(BattleSession {
            info,
            services,
            scheduler: self.scheduler.clone(),
            on_complete: Some(Box::new(on_complete)),
            finished: false,
        });
        self.scheduler.schedule(begin);
        Ok(())
    }

    /// Run queued tasks until the battle ends or waits on input. Returns the
    /// number of tasks run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while let Some(session) = self.session.as_mut() {
            let Some(task) = self.scheduler.pop() else {
                break;
            };
            task(session);
            ran += 1;
            if session.finished {
                self.finish();
            }
        }
        trace!(ran, "scheduler idle");
        ran
    }

    fn finish(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let discarded = self.scheduler.clear();
        if discarded > 0 {
            error!(discarded, "tasks left queued after the battle ended");
        }
        self.services = Some(session.services);
    }

    pub fn phase(&self) -> Phase {
        self.session
            .as_ref()
            .map_or(Phase::Idle, |session| session.info.phase)
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// The running battle's state.
    pub fn info(&self) -> Option<&BattleInfo> {
        self.session.as_ref().map(|session| &session.info)
    }

    /// The collaborators, while no battle holds them.
    pub fn services(&self) -> Option<&Services> {
        self.services.as_ref()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }
}

fn begin(session: &mut BattleSession) {
    let start = session.info.events.len();
    for side in [Side::Opponent, Side::Player] {
        let index = session.info.team(side).selected;
        let species = session.info.active(side).species;
        session.info.push_event(BattleEvent::SentOut {
            side,
            index,
            species,
        });
    }
    let intro = session.info.events.since(start).to_vec();
    let sequence = animation::battle_start(&session.info, &intro);
    let first_turn = session.continuation("first turn", |session, ()| start_turn(session));
    sequence.run(session, first_turn);
}

fn start_turn(session: &mut BattleSession) {
    let info = &mut session.info;
    info.phase = Phase::SelectingActions;
    info.turn_number += 1;
    info.selectors = [SelectorState::TopLevel; 2];
    let turn_number = info.turn_number;
    info.push_event(BattleEvent::TurnStarted { turn_number });
    debug!(turn_number, "turn started");
    decoration::refresh(session);

    let player_chosen = session.continuation("player action", |session, player_action: Action| {
        let opponent_chosen =
            session.continuation("opponent action", move |session, opponent_action: Action| {
                resolve_turn(session, player_action, opponent_action)
            });
        selectors::select_opponent_action(session, opponent_chosen);
    });
    selectors::select_player_action(session, player_chosen);
}

fn resolve_turn(session: &mut BattleSession, player_action: Action, opponent_action: Action) {
    session.info.phase = Phase::Ordering;
    let order = action_order::order(opponent_action, player_action, &session.info);
    debug!(first = ?order[0].source.side, second = ?order[1].source.side, "turn order");
    session.info.phase = Phase::ResolvingEffects;
    run_actions(session, VecDeque::from(order));
}

fn run_actions(session: &mut BattleSession, mut queue: VecDeque<TeamAndAction>) {
    match queue.pop_front() {
        None => end_turn(session),
        Some(team_and_action) => {
            let next =
                session.continuation("next action", move |session, ()| run_actions(session, queue));
            resolve_action(session, team_and_action, next);
        }
    }
}

/// Apply one action, present what it did, then deal with any knockout.
fn resolve_action(session: &mut BattleSession, team_and_action: TeamAndAction, next: Continuation) {
    let source = team_and_action.source;
    let source_team = session.info.team(source.side);
    if source_team.selected != source.index || session.info.combatant(source).is_fainted() {
        trace!(?source, "skipping action of a combatant that left the field");
        next.resume(());
        return;
    }
    // The target side may have switched since the order was fixed.
    let team_and_action = TeamAndAction {
        target: session.info.active_actor(team_and_action.target.side),
        ..team_and_action
    };

    let start = session.info.events.len();
    effects::apply(
        &mut session.info,
        &team_and_action,
        &mut session.services.rng,
    );
    let events = session.info.events.since(start).to_vec();
    let sequence = animation::for_events(&events, &session.info);
    let after = session.continuation("after action", move |session, ()| {
        fainting::after_action(session, next)
    });
    sequence.run(session, after);
}

fn end_turn(session: &mut BattleSession) {
    session.info.phase = Phase::CheckingOutcome;
    for team in session.info.teams.iter_mut() {
        team.finish_turn();
    }
    start_turn(session);
}

fn grant_rewards(info: &mut BattleInfo) {
    let Some(leader) = info.team(Side::Opponent).leader().cloned() else {
        return;
    };
    if leader.reward > 0 {
        info.money = info.money.saturating_add(leader.reward);
        info.push_event(BattleEvent::MoneyWon {
            amount: leader.reward,
        });
    }
    if let Some(badge) = leader.badge {
        info.push_event(BattleEvent::BadgeReceived { badge });
    }
    if let Some(item) = leader.gift {
        *info.inventory.entry(item).or_insert(0) += 1;
        info.push_event(BattleEvent::GiftReceived { item });
    }
}

/// Evolve party member `index` if it is standing and qualifies. Returns
/// whether it evolved.
pub fn evolve_if_ready(info: &mut BattleInfo, index: usize) -> bool {
    let combatant = &mut info.team_mut(Side::Player).actors[index];
    if combatant.is_fainted() {
        return false;
    }
    let Some(into) = check_evolutions(combatant, None) else {
        return false;
    };
    let from = combatant.species;
    if let Err(err) = evolve(combatant, into) {
        panic!("evolution of {from:?} into {into:?} failed: {err}");
    }
    debug!(?from, ?into, index, "evolved");
    info.push_event(BattleEvent::Evolved { from, into });
    true
}

/// Evolve every party member that levelled up this battle and qualifies.
fn evolve_leveled(info: &mut BattleInfo) {
    let leveled: Vec<usize> = info.leveled_up.iter().copied().collect();
    for index in leveled {
        evolve_if_ready(info, index);
    }
}

/// Settle rewards and evolutions, play them out, then tear the session down.
/// Ignored if the battle already has an outcome.
pub fn end_battle(session: &mut BattleSession, outcome: BattleOutcome) {
    if let Some(existing) = session.info.outcome {
        warn!(?existing, ?outcome, "battle already ended");
        return;
    }
    session.info.outcome = Some(outcome);
    session.info.phase = Phase::Ending;
    info!(?outcome, turns = session.info.turn_number, "battle over");

    let start = session.info.events.len();
    if outcome == BattleOutcome::PlayerVictory {
        grant_rewards(&mut session.info);
    }
    // A last combatant can win and still faint to poison in the same action.
    if !session.info.team(Side::Player).has_living() {
        session.info.push_event(BattleEvent::BlackedOut);
    }
    if outcome != BattleOutcome::OpponentVictory {
        evolve_leveled(&mut session.info);
    }

    let events = session.info.events.since(start).to_vec();
    let mut sequence = Sequence::new("ending");
    if outcome == BattleOutcome::PlayerVictory {
        sequence = sequence.append(animation::victory(&session.info));
    }
    let sequence = sequence
        .append(animation::for_events(&events, &session.info))
        .append(animation::battle_end());
    let done = session.continuation("teardown", move |session, ()| teardown(session, outcome));
    sequence.run(session, done);
}

fn teardown(session: &mut BattleSession, outcome: BattleOutcome) {
    let BattleSession { info, services, .. } = &mut *session;
    let party = &mut info.teams[Side::Player.index()].actors;
    for combatant in party.iter_mut() {
        combatant.reset_battle_stats();
    }

    if !party.iter().any(|combatant| !combatant.is_fainted()) {
        for combatant in party.iter_mut() {
            combatant.restore();
        }
        info.money /= info.config.whiteout_money_divisor.max(1);
        let rest_point = services.store.last_rest_point();
        services.overworld.warp_to(&rest_point);
        services.store.set_location(rest_point);
    }

    if outcome == BattleOutcome::PlayerVictory {
        if let Some(badge) = info.team(Side::Opponent).leader().and_then(|l| l.badge.clone()) {
            services.store.add_badge(badge);
        }
    }

    services
        .store
        .set_party(info.team(Side::Player).actors.clone());
    services.store.set_inventory(info.inventory.clone());
    services.store.set_money(info.money);

    info.push_event(BattleEvent::BattleEnded { outcome });
    services.menu.delete_menu(BATTLE_MENU);
    services.overworld.resume();
    info.phase = Phase::Idle;
    debug!(?outcome, events = info.events.len(), "battle torn down");

    session.complete(outcome);
}
