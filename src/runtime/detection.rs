// ABOUTME: Locates the Docker daemon socket on the local system.
// ABOUTME: DOCKER_SOCKET wins, then the system socket, then per-user sockets.

use super::types::SocketInfo;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no Docker socket found (checked DOCKER_SOCKET, {DOCKER_SOCKET} and per-user sockets)")]
    NoRuntimeFound,
}

const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect the Docker socket.
///
/// Detection order:
/// 1. `$DOCKER_SOCKET`, used as-is even if it does not exist yet
/// 2. `/var/run/docker.sock`
/// 3. Rootless Docker (`$XDG_RUNTIME_DIR/docker.sock`)
/// 4. Docker Desktop (`~/.docker/run/docker.sock`)
pub fn detect_local() -> Result<SocketInfo, DetectionError> {
    if let Ok(socket) = std::env::var("DOCKER_SOCKET")
        && !socket.is_empty()
    {
        return Ok(SocketInfo {
            socket_path: socket,
        });
    }

    let mut candidates = vec![DOCKER_SOCKET.to_string()];
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        candidates.push(format!("{}/docker.sock", runtime_dir));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".docker/run/docker.sock").to_string_lossy().into_owned());
    }

    candidates
        .into_iter()
        .find(|path| Path::new(path).exists())
        .map(|socket_path| SocketInfo { socket_path })
        .ok_or(DetectionError::NoRuntimeFound)
}
