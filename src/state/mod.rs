// ABOUTME: The phases a workflow is made of and the contract they share.
// ABOUTME: Phase is the closed set of states the controller sequences.

mod account_creation;
mod attach;
mod cleanup;
mod debug;
mod init;
mod mirror_config;
mod network_prep;
mod recovery;
mod resource_creation;
mod start;
mod stop;
mod work_dir;

pub use account_creation::AccountCreationState;
pub use attach::AttachState;
pub use cleanup::CleanUpState;
pub use debug::{DebugError, DebugState, RecordFile, select_record_file};
pub use init::{InitState, NECESSARY_PORTS, OPTIONAL_PORTS, read_env_file};
pub use network_prep::NetworkPrepState;
pub use recovery::RecoveryState;
pub use resource_creation::ResourceCreationState;
pub use start::StartState;
pub use stop::StopState;
pub use work_dir::WorkDir;

use crate::controller::Observer;
use crate::services::LocatorError;
use crate::types::InvalidTimestamp;
use async_trait::async_trait;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("{0} was started before an observer subscribed")]
    NotSubscribed(&'static str),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    InvalidTimestamp(#[from] InvalidTimestamp),

    #[error(transparent)]
    Debug(#[from] DebugError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Config(#[from] crate::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StateError {
    /// Bad user input: the phase stops without a cleanup pass.
    pub fn is_validation(&self) -> bool {
        matches!(self, StateError::InvalidTimestamp(_) | StateError::Debug(_))
    }
}

/// One phase of a workflow. A phase reports its outcome through the observer
/// it was subscribed with; errors returned from `on_start` are failures of the
/// phase's own bookkeeping.
#[async_trait]
pub trait State: Send {
    fn name(&self) -> &'static str;

    /// Replace the observer that receives this phase's events.
    fn subscribe(&mut self, observer: Observer);

    async fn on_start(&mut self) -> Result<(), StateError>;
}

/// The single observer slot every state carries.
#[derive(Debug, Default)]
pub(crate) struct Subscription {
    observer: Option<Observer>,
}

impl Subscription {
    pub(crate) fn set(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    pub(crate) fn observer(&self, state: &'static str) -> Result<&Observer, StateError> {
        self.observer.as_ref().ok_or(StateError::NotSubscribed(state))
    }
}

pub enum Phase {
    Init(InitState),
    Start(StartState),
    NetworkPrep(NetworkPrepState),
    AccountCreation(AccountCreationState),
    ResourceCreation(ResourceCreationState),
    Attach(AttachState),
    CleanUp(CleanUpState),
    Recovery(RecoveryState),
    Stop(StopState),
    Debug(DebugState),
}

impl Phase {
    fn inner(&mut self) -> &mut dyn State {
        match self {
            Phase::Init(s) => s,
            Phase::Start(s) => s,
            Phase::NetworkPrep(s) => s,
            Phase::AccountCreation(s) => s,
            Phase::ResourceCreation(s) => s,
            Phase::Attach(s) => s,
            Phase::CleanUp(s) => s,
            Phase::Recovery(s) => s,
            Phase::Stop(s) => s,
            Phase::Debug(s) => s,
        }
    }
}

#[async_trait]
impl State for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Init(s) => s.name(),
            Phase::Start(s) => s.name(),
            Phase::NetworkPrep(s) => s.name(),
            Phase::AccountCreation(s) => s.name(),
            Phase::ResourceCreation(s) => s.name(),
            Phase::Attach(s) => s.name(),
            Phase::CleanUp(s) => s.name(),
            Phase::Recovery(s) => s.name(),
            Phase::Stop(s) => s.name(),
            Phase::Debug(s) => s.name(),
        }
    }

    fn subscribe(&mut self, observer: Observer) {
        self.inner().subscribe(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        self.inner().on_start().await
    }
}

impl From<InitState> for Phase {
    fn from(state: InitState) -> Self {
        Phase::Init(state)
    }
}

impl From<StartState> for Phase {
    fn from(state: StartState) -> Self {
        Phase::Start(state)
    }
}

impl From<NetworkPrepState> for Phase {
    fn from(state: NetworkPrepState) -> Self {
        Phase::NetworkPrep(state)
    }
}

impl From<AccountCreationState> for Phase {
    fn from(state: AccountCreationState) -> Self {
        Phase::AccountCreation(state)
    }
}

impl From<ResourceCreationState> for Phase {
    fn from(state: ResourceCreationState) -> Self {
        Phase::ResourceCreation(state)
    }
}

impl From<AttachState> for Phase {
    fn from(state: AttachState) -> Self {
        Phase::Attach(state)
    }
}

impl From<CleanUpState> for Phase {
    fn from(state: CleanUpState) -> Self {
        Phase::CleanUp(state)
    }
}

impl From<RecoveryState> for Phase {
    fn from(state: RecoveryState) -> Self {
        Phase::Recovery(state)
    }
}

impl From<StopState> for Phase {
    fn from(state: StopState) -> Self {
        Phase::Stop(state)
    }
}

impl From<DebugState> for Phase {
    fn from(state: DebugState) -> Self {
        Phase::Debug(state)
    }
}
