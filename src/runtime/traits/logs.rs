// ABOUTME: Container log streaming for the runtime.
// ABOUTME: NetworkPrep scans existing output; Attach follows new output.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A live log stream. Dropping it closes the underlying connection.
pub type LogStreamBox = Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>;

#[async_trait]
pub trait LogOps: Sealed + Send + Sync {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, LogError>;
}

/// Both output streams are always requested.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Keep the stream open for new output.
    pub follow: bool,
    /// Lines to replay from the end; `None` replays everything.
    pub tail: Option<u64>,
}

impl LogOptions {
    pub fn follow_all() -> Self {
        Self {
            follow: true,
            tail: None,
        }
    }

    /// Only output produced from now on.
    pub fn follow_new() -> Self {
        Self {
            follow: true,
            tail: Some(0),
        }
    }
}

/// One chunk of log output, usually a single line.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub content: String,
    pub stream: LogStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),
}
