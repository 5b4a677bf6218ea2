// ABOUTME: Maps workflow names to the ordered states that make them up.
// ABOUTME: Also builds the recovery and cleanup states the controller falls back on.

use crate::controller::StateProvider;
use crate::services::{CLI_SERVICE, ServiceLocator};
use crate::state::{
    AccountCreationState, AttachState, CleanUpState, DebugState, InitState, NetworkPrepState,
    Phase, RecoveryState, ResourceCreationState, StartState, StateError, StopState,
};
use crate::types::{EventType, Workflow};
use nonempty::NonEmpty;
use std::sync::Arc;

/// A named, non-empty sequence of states. Order is execution order.
pub struct StateConfiguration<S = Phase> {
    pub state_machine_name: String,
    pub states: NonEmpty<S>,
}

pub struct StateData {
    locator: Arc<ServiceLocator>,
}

impl StateData {
    pub fn new(locator: Arc<ServiceLocator>) -> Self {
        Self { locator }
    }

    /// Fresh states for `name`, or `None` when no workflow has that name.
    pub fn get_selected_state_configuration(
        &self,
        name: &str,
    ) -> Result<Option<StateConfiguration>, StateError> {
        let Ok(workflow) = name.parse::<Workflow>() else {
            return Ok(None);
        };
        let locator = self.locator.as_ref();

        let states = match workflow {
            Workflow::Start => {
                let mut states = NonEmpty::new(Phase::from(InitState::new(locator)?));
                self.push_startup(&mut states)?;
                states
            }
            Workflow::Restart => {
                let mut states = NonEmpty::new(Phase::from(CleanUpState::new(locator)?));
                states.push(StopState::new(locator)?.into());
                states.push(InitState::new(locator)?.into());
                self.push_startup(&mut states)?;
                states
            }
            Workflow::Stop => NonEmpty::new(Phase::from(StopState::new(locator)?)),
            Workflow::AccountCreation => {
                NonEmpty::new(Phase::from(AccountCreationState::new(locator)?))
            }
            Workflow::Debug => NonEmpty::new(Phase::from(DebugState::new(locator)?)),
        };

        Ok(Some(StateConfiguration {
            state_machine_name: workflow.name().to_string(),
            states,
        }))
    }

    /// Everything after Init in a startup workflow.
    fn push_startup(&self, states: &mut NonEmpty<Phase>) -> Result<(), StateError> {
        let locator = self.locator.as_ref();
        states.push(StartState::new(locator)?.into());
        states.push(NetworkPrepState::new(locator)?.into());
        states.push(AccountCreationState::new(locator)?.into());
        if locator.get(CLI_SERVICE)?.options().create_initial_resources {
            states.push(ResourceCreationState::new(locator)?.into());
        }
        states.push(CleanUpState::new(locator)?.into());
        states.push(AttachState::new(locator)?.into());
        Ok(())
    }
}

impl StateProvider<Phase> for StateData {
    fn configuration(&self, workflow: &str) -> Result<Option<StateConfiguration>, StateError> {
        self.get_selected_state_configuration(workflow)
    }

    fn recovery(&self, event: EventType) -> Result<Phase, StateError> {
        Ok(RecoveryState::new(&self.locator, event)?.into())
    }

    fn cleanup(&self) -> Result<Phase, StateError> {
        Ok(CleanUpState::new(&self.locator)?.into())
    }
}
