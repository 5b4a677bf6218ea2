// ABOUTME: Capability traits over the Docker Engine API.
// ABOUTME: RuntimeInfo, ContainerOps, NetworkOps, ExecOps and LogOps.

mod container;
mod exec;
mod logs;
mod network;
mod runtime_info;
pub(crate) mod sealed;
mod shared_types;

pub use container::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
pub use exec::{ExecError, ExecOps};
pub use logs::{LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamBox};
pub use network::{NetworkError, NetworkOps, NetworkSummary};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;
