// ABOUTME: Domain types shared across states and services.
// ABOUTME: Events, network selection, ledger ids and consensus timestamps.

mod account;
mod event;
mod id;
mod network;
mod timestamp;
mod workflow;

pub use account::{AccountId, AccountIdError, KeyKind};
pub use event::EventType;
pub use id::{ContainerId, Id, NetworkId, TokenId};
pub use network::{NetworkType, VerboseLevel};
pub use timestamp::{ConsensusTimestamp, InvalidTimestamp};
pub use workflow::{UnknownWorkflow, Workflow};
