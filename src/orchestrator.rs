//! Drives one battle through create-then-simulate and publishes the
//! resulting state for whatever renders it.

use log::{debug, error};
use tokio::sync::watch;

use crate::battle::Battle;
use crate::client::BattleApi;
use crate::presentation;
use crate::state::{Generation, Observable};

pub const CREATE_FAILED_MESSAGE: &str = "Error during loading Pokémons.";
pub const SIMULATE_FAILED_MESSAGE: &str = "Error during battle simulation.";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Simulating,
    Done,
    Failed,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BattleState {
    pub battle: Option<Battle>,
    pub phase: Phase,
    pub error_message: Option<String>,
}

impl BattleState {
    pub fn is_finished(&self) -> bool {
        self.battle.as_ref().is_some_and(Battle::is_finished)
    }

    pub fn winner_name(&self) -> &str {
        presentation::winner_name(self.battle.as_ref())
    }
}

/// How a single `start_new_battle` call ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AttemptOutcome {
    Finished,
    CreateFailed,
    SimulateFailed,
    /// A newer attempt started before this one resolved; its responses
    /// were dropped without touching state.
    Superseded,
}

pub struct BattleOrchestrator<C> {
    api: C,
    state: Observable<BattleState>,
    generation: Generation,
}

impl<C: BattleApi> BattleOrchestrator<C> {
    pub fn new(api: C) -> Self {
        BattleOrchestrator {
            api,
            state: Observable::default(),
            generation: Generation::new(),
        }
    }

    pub fn state(&self) -> BattleState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<BattleState> {
        self.state.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        self.state.get().is_finished()
    }

    pub fn winner_name(&self) -> String {
        self.state.get().winner_name().to_string()
    }

    /// Creates a random battle and simulates it.
    ///
    /// Calling this again while an earlier call is still waiting supersedes
    /// the earlier one: its late responses are discarded.
    pub async fn start_new_battle(&self) -> AttemptOutcome {
        let token = self.generation.advance();
        self.state.set(BattleState {
            battle: None,
            phase: Phase::Loading,
            error_message: None,
        });
        debug!("battle attempt {}: loading", token);

        let created = match self.api.create_random_battle().await {
            Ok(battle) => battle,
            Err(e) => {
                if !self.generation.is_current(token) {
                    return self.superseded(token);
                }
                error!("battle attempt {}: create failed: {}", token, e);
                self.state.update(|s| {
                    s.phase = Phase::Failed;
                    s.error_message = Some(CREATE_FAILED_MESSAGE.to_string());
                });
                return AttemptOutcome::CreateFailed;
            }
        };
        if !self.generation.is_current(token) {
            return self.superseded(token);
        }

        let id = created.id;
        self.state.update(|s| {
            s.battle = Some(created);
            s.phase = Phase::Simulating;
        });
        debug!("battle attempt {}: simulating battle {}", token, id);

        match self.api.simulate_battle(id).await {
            Ok(finished) => {
                if !self.generation.is_current(token) {
                    return self.superseded(token);
                }
                debug!("battle attempt {}: battle {} finished", token, id);
                self.state.update(|s| {
                    s.battle = Some(finished);
                    s.phase = Phase::Done;
                });
                AttemptOutcome::Finished
            }
            Err(e) => {
                if !self.generation.is_current(token) {
                    return self.superseded(token);
                }
                error!("battle attempt {}: simulate {} failed: {}", token, id, e);
                self.state.update(|s| {
                    s.phase = Phase::Failed;
                    s.error_message = Some(SIMULATE_FAILED_MESSAGE.to_string());
                });
                AttemptOutcome::SimulateFailed
            }
        }
    }

    fn superseded(&self, token: u64) -> AttemptOutcome {
        debug!(
            "battle attempt {}: stale response dropped, attempt {} is current",
            token,
            self.generation.current()
        );
        AttemptOutcome::Superseded
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::battle::{Creature, WinnerSide};
    use crate::client::ClientError;

    fn created() -> Battle {
        Battle::pending(
            1,
            Creature::named("Pikachu"),
            Creature::named("Charmander"),
            "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        )
    }

    /// Answers from queues; records which ids were simulated.
    #[derive(Default)]
    struct Scripted {
        creates: RefCell<VecDeque<Result<Battle, ClientError>>>,
        simulates: RefCell<VecDeque<Result<Battle, ClientError>>>,
        simulated_ids: RefCell<Vec<u64>>,
    }

    impl BattleApi for Scripted {
        async fn create_random_battle(&self) -> Result<Battle, ClientError> {
            self.creates
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Other("no scripted create".to_string())))
        }

        async fn simulate_battle(&self, id: u64) -> Result<Battle, ClientError> {
            self.simulated_ids.borrow_mut().push(id);
            self.simulates
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Other("no scripted simulate".to_string())))
        }

        async fn list_battles(&self, _query: Option<&str>) -> Result<Vec<Battle>, ClientError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn starts_idle() {
        let orchestrator = BattleOrchestrator::new(Scripted::default());
        let state = orchestrator.state();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.battle.is_none());
        assert!(!orchestrator.is_finished());
        assert_eq!(orchestrator.winner_name(), "Draw");
    }

    #[tokio::test]
    async fn create_then_simulate_finishes() {
        let api = Scripted::default();
        let pending = created();
        let done = pending.finish(WinnerSide::First, "2024-01-01T00:00:00Z".parse().expect("timestamp"));
        api.creates.borrow_mut().push_back(Ok(pending));
        api.simulates.borrow_mut().push_back(Ok(done.clone()));

        let orchestrator = BattleOrchestrator::new(&api);
        assert_eq!(orchestrator.start_new_battle().await, AttemptOutcome::Finished);

        let state = orchestrator.state();
        assert_eq!(state.phase, Phase::Done);
        assert_eq!(state.battle, Some(done));
        assert_eq!(state.error_message, None);
        assert!(orchestrator.is_finished());
        assert_eq!(orchestrator.winner_name(), "Pikachu");
        assert_eq!(*api.simulated_ids.borrow(), vec![1]);
    }

    #[tokio::test]
    async fn create_failure_skips_simulation() {
        let api = Scripted::default();
        api.creates
            .borrow_mut()
            .push_back(Err(ClientError::Status { status: 500, body: String::new() }));

        let orchestrator = BattleOrchestrator::new(&api);
        assert_eq!(orchestrator.start_new_battle().await, AttemptOutcome::CreateFailed);

        let state = orchestrator.state();
        assert_eq!(state.phase, Phase::Failed);
        assert!(state.battle.is_none());
        assert_eq!(state.error_message.as_deref(), Some(CREATE_FAILED_MESSAGE));
        assert!(api.simulated_ids.borrow().is_empty());
    }

    #[tokio::test]
    async fn simulate_failure_keeps_pending_battle() {
        let api = Scripted::default();
        api.creates.borrow_mut().push_back(Ok(created()));
        api.simulates
            .borrow_mut()
            .push_back(Err(ClientError::Other("boom".to_string())));

        let orchestrator = BattleOrchestrator::new(&api);
        assert_eq!(orchestrator.start_new_battle().await, AttemptOutcome::SimulateFailed);

        let state = orchestrator.state();
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.battle, Some(created()));
        assert_eq!(state.error_message.as_deref(), Some(SIMULATE_FAILED_MESSAGE));
        assert!(!state.is_finished());
    }

    #[tokio::test]
    async fn restart_after_failure_clears_error() {
        let api = Scripted::default();
        api.creates.borrow_mut().push_back(Err(ClientError::Other("down".to_string())));
        api.creates.borrow_mut().push_back(Ok(created()));
        api.simulates.borrow_mut().push_back(Ok(
            created().finish(WinnerSide::Draw, "2024-01-01T00:00:00Z".parse().expect("timestamp"))
        ));

        let orchestrator = BattleOrchestrator::new(&api);
        orchestrator.start_new_battle().await;
        assert_eq!(orchestrator.state().phase, Phase::Failed);

        assert_eq!(orchestrator.start_new_battle().await, AttemptOutcome::Finished);
        let state = orchestrator.state();
        assert_eq!(state.error_message, None);
        assert_eq!(state.winner_name(), "Draw");
    }

    #[tokio::test]
    async fn observers_see_every_phase() {
        let api = Scripted::default();
        api.creates.borrow_mut().push_back(Ok(created()));
        api.simulates.borrow_mut().push_back(Ok(
            created().finish(WinnerSide::Second, "2024-01-01T00:00:00Z".parse().expect("timestamp"))
        ));
        let orchestrator = BattleOrchestrator::new(&api);
        let mut rx = orchestrator.subscribe();

        let seen = RefCell::new(vec![rx.borrow().phase]);
        let watch_phases = async {
            while rx.changed().await.is_ok() {
                let phase = rx.borrow_and_update().phase;
                seen.borrow_mut().push(phase);
                if phase == Phase::Done {
                    break;
                }
            }
        };
        let run = async {
            let outcome = orchestrator.start_new_battle().await;
            tokio::task::yield_now().await;
            outcome
        };
        let (outcome, ()) = tokio::join!(run, watch_phases);
        assert_eq!(outcome, AttemptOutcome::Finished);
        let seen = seen.into_inner();
        assert_eq!(seen.first(), Some(&Phase::Idle));
        assert_eq!(seen.last(), Some(&Phase::Done));
    }
}
