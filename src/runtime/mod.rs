// ABOUTME: Docker access: the Engine API through bollard and the compose CLI.
// ABOUTME: Socket detection, capability traits and their implementations.

mod bollard_runtime;
pub mod compose;
mod detection;
mod error;
mod network_remover;
pub mod traits;
mod types;

pub use bollard_runtime::BollardRuntime;
pub use compose::{CommandOutput, Compose};
pub use detection::{DetectionError, detect_local};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use network_remover::{NETWORK_PREFIX, SafeNetworkRemover};
pub use traits::*;
pub use types::SocketInfo;
