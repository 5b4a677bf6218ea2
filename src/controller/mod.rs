// ABOUTME: Drives a workflow's states to completion, recovering from Docker errors.
// ABOUTME: Terminal errors run cleanup once and end the run with a failed outcome.

mod observer;
mod transition;

pub use observer::{Notification, Observer};
pub use transition::{Transition, WorkflowOutcome};

use crate::data::{StateConfiguration, StateData};
use crate::state::{Phase, State, StateError};
use crate::types::EventType;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Recoveries a single state may trigger before its workflow is abandoned.
pub const MAX_RECOVERIES: u32 = 3;

/// Source of the states a controller runs.
pub trait StateProvider<S> {
    /// The ordered states of `workflow`, or `None` for an unknown name.
    fn configuration(&self, workflow: &str) -> Result<Option<StateConfiguration<S>>, StateError>;

    /// A state remediating `event`.
    fn recovery(&self, event: EventType) -> Result<S, StateError>;

    /// A state reverting on-disk changes after a failure.
    fn cleanup(&self) -> Result<S, StateError>;
}

/// How a single state ended, from the controller's point of view. Docker
/// errors are recovered while the state runs, so they never end a phase.
#[derive(Debug)]
enum PhaseEnd {
    Finished,
    Failed(EventType),
    Halted(String),
}

impl PhaseEnd {
    fn settled(event: EventType) -> Self {
        match event {
            EventType::Finish => PhaseEnd::Finished,
            event => PhaseEnd::Failed(event),
        }
    }
}

pub struct StateController<S = Phase, P = StateData> {
    workflow: String,
    provider: P,
    curr_state_num: usize,
    max_state_num: usize,
    recoveries: u32,
    _state: std::marker::PhantomData<fn() -> S>,
}

impl<S: State, P: StateProvider<S>> StateController<S, P> {
    pub fn new(workflow: impl Into<String>, provider: P) -> Self {
        Self {
            workflow: workflow.into(),
            provider,
            curr_state_num: 0,
            max_state_num: 0,
            recoveries: 0,
            _state: std::marker::PhantomData,
        }
    }

    pub fn curr_state_num(&self) -> usize {
        self.curr_state_num
    }

    pub fn max_state_num(&self) -> usize {
        self.max_state_num
    }

    /// Decide what follows `event` for the current state.
    pub fn update(&mut self, event: EventType) -> Transition {
        match event {
            EventType::Finish => match self.advance() {
                Some(next) => Transition::Start(next),
                None => Transition::Complete,
            },
            EventType::DockerError => {
                if self.count_recovery() {
                    Transition::Recover
                } else {
                    Transition::Abort(EventType::UnknownError)
                }
            }
            EventType::UnknownError | EventType::UnresolvableError => Transition::Abort(event),
        }
    }

    /// Move past the current state. `None` once every state has finished.
    fn advance(&mut self) -> Option<usize> {
        self.curr_state_num += 1;
        self.recoveries = 0;
        if self.curr_state_num >= self.max_state_num {
            self.curr_state_num = self.max_state_num;
            None
        } else {
            Some(self.curr_state_num)
        }
    }

    /// Count a Docker error against the current state. `false` once the
    /// recovery budget is spent.
    fn count_recovery(&mut self) -> bool {
        self.recoveries += 1;
        self.recoveries <= MAX_RECOVERIES
    }

    pub async fn start_state_machine(&mut self) -> WorkflowOutcome {
        let configuration = match self.provider.configuration(&self.workflow) {
            Ok(Some(configuration)) => configuration,
            Ok(None) => {
                error!("Failed to load state configuration for '{}'", self.workflow);
                return WorkflowOutcome::ConfigurationMissing {
                    workflow: self.workflow.clone(),
                };
            }
            Err(e) => {
                error!("Failed to build the states of '{}': {}", self.workflow, e);
                return WorkflowOutcome::Halted {
                    state: "StateController",
                    reason: e.to_string(),
                };
            }
        };

        info!(
            "Starting the '{}' state machine",
            configuration.state_machine_name
        );
        let mut states: Vec<S> = configuration.states.into();
        self.curr_state_num = 0;
        self.max_state_num = states.len();
        self.recoveries = 0;

        loop {
            let Some(state) = states.get_mut(self.curr_state_num) else {
                return WorkflowOutcome::Completed;
            };
            let name = state.name();

            match self.run_state(state).await {
                PhaseEnd::Finished => match self.advance() {
                    Some(next) => debug!("{} finished, moving to state {}", name, next),
                    None => {
                        info!("Workflow '{}' completed", self.workflow);
                        return WorkflowOutcome::Completed;
                    }
                },
                PhaseEnd::Failed(event) => {
                    error!("{} raised {}, cleaning up", name, event);
                    self.clean_up().await;
                    return WorkflowOutcome::Failed { state: name, event };
                }
                PhaseEnd::Halted(reason) => {
                    error!("{} stopped: {}", name, reason);
                    return WorkflowOutcome::Halted { state: name, reason };
                }
            }
        }
    }

    /// Start `state` and wait for the event it reports. Docker errors are
    /// recovered in place while the state waits.
    async fn run_state(&mut self, state: &mut S) -> PhaseEnd {
        let name = state.name();
        let (observer, mut rx) = Observer::channel();
        state.subscribe(observer);
        debug!("Starting {}", name);

        let mut reported = None;
        let result = {
            let start = state.on_start();
            tokio::pin!(start);
            loop {
                tokio::select! {
                    result = &mut start => break result,
                    Some(notification) = rx.recv() => {
                        match (self.handle(name, notification).await, &reported) {
                            (Some(end), None) => reported = Some(end),
                            (Some(end), Some(_)) => debug!("{} also reported {:?}", name, end),
                            (None, _) => {}
                        }
                    }
                }
            }
        };

        if let Err(e) = result {
            match e {
                StateError::NotImplemented(_) => {
                    warn!("{}, continuing", e);
                    reported = reported.or(Some(PhaseEnd::Finished));
                }
                e if e.is_validation() => return PhaseEnd::Halted(e.to_string()),
                e => {
                    error!("{} failed: {}", name, e);
                    return PhaseEnd::Failed(EventType::UnknownError);
                }
            }
        }
        if let Some(end) = reported {
            return end;
        }

        // Work spawned by the state may still report. Once every sender is
        // gone without an event, the state is considered stuck.
        state.subscribe(Observer::disconnected());
        while let Some(notification) = rx.recv().await {
            if let Some(end) = self.handle(name, notification).await {
                return end;
            }
        }
        PhaseEnd::Halted(format!("{name} finished without reporting an outcome"))
    }

    /// Docker errors are recovered and acknowledged here. Every other event
    /// settles the phase.
    async fn handle(&mut self, name: &'static str, notification: Notification) -> Option<PhaseEnd> {
        let event = notification.event;
        if event != EventType::DockerError {
            return Some(PhaseEnd::settled(event));
        }

        let escalated = if self.count_recovery() {
            self.recover(name).await;
            None
        } else {
            error!("{} kept failing after {} recoveries", name, MAX_RECOVERIES);
            Some(PhaseEnd::Failed(EventType::UnknownError))
        };
        notification.acknowledge();
        escalated
    }

    async fn recover(&self, interrupted: &'static str) {
        match self.provider.recovery(EventType::DockerError) {
            Ok(recovery) => run_fallback(recovery).await,
            Err(e) => error!("Cannot start recovery: {}", e),
        }
        info!("Resuming {}", interrupted);
    }

    async fn clean_up(&self) {
        match self.provider.cleanup() {
            Ok(cleanup) => run_fallback(cleanup).await,
            Err(e) => error!("Cannot start clean up: {}", e),
        }
    }
}

/// Run a recovery or cleanup state to completion. Its events are logged only.
async fn run_fallback<S: State>(mut state: S) {
    let name = state.name();
    let (observer, mut rx) = Observer::channel();
    state.subscribe(observer);
    if let Err(e) = state.on_start().await {
        error!("{} failed: {}", name, e);
    }
    drain(name, &mut rx);
}

fn drain(name: &'static str, rx: &mut mpsc::UnboundedReceiver<Notification>) {
    while let Ok(notification) = rx.try_recv() {
        debug!("{} reported {}", name, notification.event);
        notification.acknowledge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Idle;

    #[async_trait]
    impl State for Idle {
        fn name(&self) -> &'static str {
            "Idle"
        }

        fn subscribe(&mut self, _observer: Observer) {}

        async fn on_start(&mut self) -> Result<(), StateError> {
            Ok(())
        }
    }

    struct NoStates;

    impl StateProvider<Idle> for NoStates {
        fn configuration(
            &self,
            _workflow: &str,
        ) -> Result<Option<StateConfiguration<Idle>>, StateError> {
            Ok(None)
        }

        fn recovery(&self, _event: EventType) -> Result<Idle, StateError> {
            Ok(Idle)
        }

        fn cleanup(&self) -> Result<Idle, StateError> {
            Ok(Idle)
        }
    }

    fn controller(states: usize) -> StateController<Idle, NoStates> {
        let mut controller = StateController::new("start", NoStates);
        controller.max_state_num = states;
        controller
    }

    #[test]
    fn finish_advances_one_state_at_a_time() {
        let mut controller = controller(6);
        assert_eq!(controller.update(EventType::Finish), Transition::Start(1));
        assert_eq!(controller.update(EventType::Finish), Transition::Start(2));
        assert_eq!(controller.curr_state_num(), 2);
    }

    #[test]
    fn finishing_the_last_state_completes() {
        let mut controller = controller(2);
        controller.update(EventType::Finish);
        assert_eq!(controller.update(EventType::Finish), Transition::Complete);
        assert_eq!(controller.curr_state_num(), 2);
        assert_eq!(controller.update(EventType::Finish), Transition::Complete);
        assert_eq!(controller.curr_state_num(), 2);
    }

    #[test]
    fn docker_errors_escalate_after_the_recovery_budget() {
        let mut controller = controller(3);
        for _ in 0..MAX_RECOVERIES {
            assert_eq!(controller.update(EventType::DockerError), Transition::Recover);
        }
        assert_eq!(
            controller.update(EventType::DockerError),
            Transition::Abort(EventType::UnknownError)
        );
        assert_eq!(controller.curr_state_num(), 0);
    }

    #[test]
    fn finishing_resets_the_recovery_budget() {
        let mut controller = controller(3);
        for _ in 0..MAX_RECOVERIES {
            controller.update(EventType::DockerError);
        }
        controller.update(EventType::Finish);
        assert_eq!(controller.update(EventType::DockerError), Transition::Recover);
    }

    #[test]
    fn terminal_errors_abort() {
        let mut controller = controller(3);
        assert_eq!(
            controller.update(EventType::UnresolvableError),
            Transition::Abort(EventType::UnresolvableError)
        );
        assert_eq!(
            controller.update(EventType::UnknownError),
            Transition::Abort(EventType::UnknownError)
        );
    }

    #[test]
    fn reported_events_settle_a_phase() {
        assert!(matches!(PhaseEnd::settled(EventType::Finish), PhaseEnd::Finished));
        assert!(matches!(
            PhaseEnd::settled(EventType::UnresolvableError),
            PhaseEnd::Failed(EventType::UnresolvableError)
        ));
    }

    #[tokio::test]
    async fn unknown_workflow_is_a_missing_configuration() {
        let mut controller: StateController<Idle, NoStates> = StateController::new("deploy", NoStates);
        let outcome = controller.start_state_machine().await;
        assert_eq!(
            outcome,
            WorkflowOutcome::ConfigurationMissing {
                workflow: "deploy".into()
            }
        );
        assert_eq!(outcome.exit_code(), 1);
    }
}
