// ABOUTME: Docker daemon socket location.
// ABOUTME: Produced by detection, consumed by BollardRuntime::connect.

/// Where the Docker daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketInfo {
    pub socket_path: String,
}
