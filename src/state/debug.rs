// ABOUTME: Finds the record-stream file for a consensus timestamp and runs the node's parser on it.
// ABOUTME: A malformed timestamp or a missing record file ends the workflow without Finish.

use super::work_dir::WorkDir;
use super::{State, StateError, Subscription};
use crate::controller::Observer;
use crate::services::{
    CLI_SERVICE, CliService, DOCKER_SERVICE, DockerOps, LocatorError, ServiceLocator,
};
use crate::types::{ConsensusTimestamp, EventType, InvalidTimestamp};
use crate::utils::fs::{empty_dir, ensure_dir};
use async_trait::async_trait;
use chrono::DateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

const STREAM_EXTENSION_VAR: &str = "STREAM_EXTENSION";
const DEFAULT_STREAM_EXTENSION: &str = "rcd";
const SIGNATURE_EXTENSION: &str = "rcd_sig";
const CONSENSUS_NODE: &str = "network-node";
const PARSER: [&str; 2] = ["bash", "/opt/hgcapp/recordParser/parse.sh"];
const KEEP_IN_TEMP: [&str; 1] = [".gitignore"];

#[derive(Debug, Error)]
pub enum DebugError {
    #[error(
        "This record file doesn't not exist, check if timestamp is correct and local-node was started in debug mode using --enable-debug option"
    )]
    RecordFileNotFound,
}

/// A record-stream file and the time embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFile {
    pub path: PathBuf,
    pub millis: i64,
    stem: String,
}

impl RecordFile {
    /// `2024-02-04T21_14_51.338308003Z.rcd` carries the time
    /// `2024-02-04T21:14:51.338308003Z`.
    fn parse(path: PathBuf, extension: &str) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(&format!(".{extension}"))?;
        let date = DateTime::parse_from_rfc3339(&stem.replace('_', ":")).ok()?;
        Some(Self {
            millis: date.timestamp_millis(),
            stem: stem.to_string(),
            path,
        })
    }

    /// The signature sits next to the record, named after the record's stem
    /// whatever the stream extension is.
    pub fn signature(&self) -> PathBuf {
        self.path.with_file_name(format!("{}.{SIGNATURE_EXTENSION}", self.stem))
    }
}

/// The first record file, in name order, at or after `target_ms`.
pub fn select_record_file(
    dir: &Path,
    extension: &str,
    target_ms: i64,
) -> io::Result<Option<RecordFile>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| RecordFile::parse(path, extension))
        .find(|record| record.millis >= target_ms))
}

pub struct DebugState {
    cli: Arc<CliService>,
    docker: Arc<dyn DockerOps>,
    work_dir: WorkDir,
    subscription: Subscription,
}

impl DebugState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let cli = locator.get(CLI_SERVICE)?;
        let state = Self {
            work_dir: WorkDir::new(&cli.options().work_dir),
            docker: locator.get(DOCKER_SERVICE)?,
            cli,
            subscription: Subscription::default(),
        };
        trace!("Debug State Initialized!");
        Ok(state)
    }

    fn copy_record(&self, target_ms: i64) -> Result<RecordFile, StateError> {
        let extension = std::env::var(STREAM_EXTENSION_VAR)
            .unwrap_or_else(|_| DEFAULT_STREAM_EXTENSION.to_string());
        let record = select_record_file(&self.work_dir.record_streams(), &extension, target_ms)
            .map_err(|e| {
                debug!("Reading record streams failed: {}", e);
                DebugError::RecordFileNotFound
            })?
            .ok_or(DebugError::RecordFileNotFound)?;

        let temp = self.work_dir.record_parser_temp();
        ensure_dir(&temp)?;
        for source in [record.path.clone(), record.signature()] {
            if let Some(name) = source.file_name() {
                trace!("Copying {} to the parser directory", source.display());
                fs::copy(&source, temp.join(name))?;
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl State for DebugState {
    fn name(&self) -> &'static str {
        "DebugState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        info!("Starting Debug State...");

        let timestamp: ConsensusTimestamp = self
            .cli
            .options()
            .timestamp
            .as_deref()
            .ok_or(InvalidTimestamp)?
            .parse()?;
        let record = self.copy_record(timestamp.as_millis())?;
        info!("Parsing record file {}", record.path.display());

        match self.docker.exec(CONSENSUS_NODE, &PARSER).await {
            Ok(result) if result.success() => info!("{}", result.stdout_lossy().trim_end()),
            Ok(result) => warn!("Record parser failed: {}", result.stderr_lossy().trim_end()),
            Err(e) => warn!("Cannot run the record parser: {}", e),
        }

        empty_dir(&self.work_dir.record_parser_temp(), &KEEP_IN_TEMP)?;
        observer.update(EventType::Finish).await;
        Ok(())
    }
}
