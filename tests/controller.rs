// ABOUTME: Integration tests for the state controller's sequencing.
// ABOUTME: Scripted states record their starts so transitions can be asserted.

mod support;

use async_trait::async_trait;
use hedera_local::controller::{Observer, StateController, StateProvider, WorkflowOutcome};
use hedera_local::data::StateConfiguration;
use hedera_local::state::{State, StateError};
use hedera_local::types::{EventType, InvalidTimestamp};
use nonempty::NonEmpty;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, Copy)]
enum Script {
    Finish,
    Raise(EventType),
    /// Raise DockerError `n` times, then Finish.
    DockerErrors(u32),
    /// Finish from a spawned task after `on_start` returns.
    SpawnedFinish,
    NotImplemented,
    InvalidInput,
    Silent,
}

struct ScriptedState {
    name: &'static str,
    script: Script,
    log: Log,
    observer: Option<Observer>,
}

#[async_trait]
impl State for ScriptedState {
    fn name(&self) -> &'static str {
        self.name
    }

    fn subscribe(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self
            .observer
            .clone()
            .ok_or(StateError::NotSubscribed(self.name))?;
        self.log.lock().push(format!("start {}", self.name));
        match self.script {
            Script::Finish => observer.update(EventType::Finish).await,
            Script::Raise(event) => observer.update(event).await,
            Script::DockerErrors(n) => {
                for _ in 0..n {
                    observer.update(EventType::DockerError).await;
                    self.log.lock().push(format!("resume {}", self.name));
                }
                observer.update(EventType::Finish).await;
            }
            Script::SpawnedFinish => {
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    observer.update(EventType::Finish).await;
                });
            }
            Script::NotImplemented => return Err(StateError::NotImplemented(self.name)),
            Script::InvalidInput => return Err(InvalidTimestamp.into()),
            Script::Silent => {}
        }
        Ok(())
    }
}

struct ScriptedWorkflows {
    workflows: HashMap<&'static str, Vec<(&'static str, Script)>>,
    log: Log,
}

impl ScriptedWorkflows {
    fn new(workflow: &'static str, states: Vec<(&'static str, Script)>) -> Self {
        Self {
            workflows: HashMap::from([(workflow, states)]),
            log: Log::default(),
        }
    }

    fn state(&self, name: &'static str, script: Script) -> ScriptedState {
        ScriptedState {
            name,
            script,
            log: Arc::clone(&self.log),
            observer: None,
        }
    }
}

impl StateProvider<ScriptedState> for ScriptedWorkflows {
    fn configuration(
        &self,
        workflow: &str,
    ) -> Result<Option<StateConfiguration<ScriptedState>>, StateError> {
        let Some(states) = self.workflows.get(workflow) else {
            return Ok(None);
        };
        let states = states
            .iter()
            .map(|&(name, script)| self.state(name, script))
            .collect();
        Ok(NonEmpty::from_vec(states).map(|states| StateConfiguration {
            state_machine_name: workflow.to_string(),
            states,
        }))
    }

    fn recovery(&self, _event: EventType) -> Result<ScriptedState, StateError> {
        Ok(self.state("RecoveryState", Script::Raise(EventType::UnknownError)))
    }

    fn cleanup(&self) -> Result<ScriptedState, StateError> {
        Ok(self.state("CleanUpState", Script::Finish))
    }
}

async fn run(
    workflow: &str,
    provider: ScriptedWorkflows,
) -> (WorkflowOutcome, usize, Vec<String>) {
    support::init_tracing();
    let log = Arc::clone(&provider.log);
    let mut controller: StateController<ScriptedState, ScriptedWorkflows> =
        StateController::new(workflow, provider);
    let outcome = controller.start_state_machine().await;
    let entries = log.lock().clone();
    (outcome, controller.curr_state_num(), entries)
}

fn starts(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| format!("start {n}")).collect()
}

#[tokio::test]
async fn every_state_starts_once_in_order() {
    let provider = ScriptedWorkflows::new(
        "start",
        vec![("InitState", Script::Finish), ("StartState", Script::Finish)],
    );

    let (outcome, curr, log) = run("start", provider).await;

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(curr, 2);
    assert_eq!(log, starts(&["InitState", "StartState"]));
}

#[tokio::test]
async fn two_finishes_point_at_the_third_state() {
    let provider = ScriptedWorkflows::new(
        "start",
        vec![
            ("InitState", Script::Finish),
            ("StartState", Script::Finish),
            ("NetworkPrepState", Script::InvalidInput),
            ("AccountCreationState", Script::Finish),
            ("CleanUpState", Script::Finish),
            ("AttachState", Script::Finish),
        ],
    );

    let (outcome, curr, log) = run("start", provider).await;

    assert_eq!(curr, 2);
    assert!(matches!(
        outcome,
        WorkflowOutcome::Halted { state: "NetworkPrepState", .. }
    ));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(log, starts(&["InitState", "StartState", "NetworkPrepState"]));
}

#[tokio::test]
async fn unknown_workflow_starts_nothing() {
    let provider = ScriptedWorkflows::new("start", vec![("InitState", Script::Finish)]);

    let (outcome, _, log) = run("deploy", provider).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::ConfigurationMissing {
            workflow: "deploy".into()
        }
    );
    assert_eq!(outcome.exit_code(), 1);
    assert!(log.is_empty());
}

#[tokio::test]
async fn terminal_errors_clean_up_exactly_once() {
    for event in [EventType::UnknownError, EventType::UnresolvableError] {
        let provider = ScriptedWorkflows::new(
            "start",
            vec![
                ("InitState", Script::Finish),
                ("StartState", Script::Raise(event)),
                ("NetworkPrepState", Script::Finish),
            ],
        );

        let (outcome, _, log) = run("start", provider).await;

        assert_eq!(
            outcome,
            WorkflowOutcome::Failed {
                state: "StartState",
                event
            }
        );
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(log, starts(&["InitState", "StartState", "CleanUpState"]));
    }
}

#[tokio::test]
async fn docker_error_recovers_before_the_state_resumes() {
    let provider = ScriptedWorkflows::new(
        "start",
        vec![
            ("StartState", Script::DockerErrors(1)),
            ("NetworkPrepState", Script::Finish),
        ],
    );

    let (outcome, _, log) = run("start", provider).await;

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(
        log,
        vec![
            "start StartState",
            "start RecoveryState",
            "resume StartState",
            "start NetworkPrepState",
        ]
    );
}

#[tokio::test]
async fn repeated_docker_errors_abandon_the_workflow() {
    let provider = ScriptedWorkflows::new(
        "start",
        vec![
            ("StartState", Script::DockerErrors(4)),
            ("NetworkPrepState", Script::Finish),
        ],
    );

    let (outcome, _, log) = run("start", provider).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::Failed {
            state: "StartState",
            event: EventType::UnknownError
        }
    );
    let recoveries = log.iter().filter(|l| *l == "start RecoveryState").count();
    assert_eq!(recoveries, 3);
    assert_eq!(log.last().map(String::as_str), Some("start CleanUpState"));
    assert!(!log.contains(&"start NetworkPrepState".to_string()));
}

#[tokio::test]
async fn unimplemented_states_are_skipped() {
    let provider = ScriptedWorkflows::new(
        "debug",
        vec![("DebugState", Script::NotImplemented), ("StopState", Script::Finish)],
    );

    let (outcome, _, log) = run("debug", provider).await;

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(log, starts(&["DebugState", "StopState"]));
}

#[tokio::test]
async fn finish_from_spawned_work_advances() {
    let provider = ScriptedWorkflows::new(
        "start",
        vec![
            ("ResourceCreationState", Script::SpawnedFinish),
            ("AttachState", Script::Finish),
        ],
    );

    let (outcome, _, log) = run("start", provider).await;

    assert_eq!(outcome, WorkflowOutcome::Completed);
    assert_eq!(log, starts(&["ResourceCreationState", "AttachState"]));
}

#[tokio::test]
async fn a_state_that_never_reports_halts() {
    let provider = ScriptedWorkflows::new(
        "start",
        vec![("AttachState", Script::Silent), ("StopState", Script::Finish)],
    );

    let (outcome, _, log) = run("start", provider).await;

    let WorkflowOutcome::Halted { state, reason } = outcome else {
        panic!("expected a halted outcome, got {outcome:?}");
    };
    assert_eq!(state, "AttachState");
    assert!(reason.contains("without reporting"), "{reason}");
    assert_eq!(log, starts(&["AttachState"]));
}
