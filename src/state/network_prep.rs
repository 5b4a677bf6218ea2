// ABOUTME: Prepares a freshly started network before accounts are seeded.
// ABOUTME: Imports fee schedules into the mirror DB and waits for the monitor's topic.

use super::{State, StateError, Subscription};
use crate::controller::Observer;
use crate::runtime::LogOptions;
use crate::services::{
    CLIENT_SERVICE, ClientError, DOCKER_SERVICE, DockerError, DockerOps, LedgerClient,
    LocatorError, ServiceLocator,
};
use crate::types::EventType;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

const FEES_FILE: u64 = 111;
const EXCHANGE_RATES_FILE: u64 = 112;
/// Transaction type of a file update in the mirror schema.
const FILE_UPDATE: u32 = 17;

const MIRROR_DB: &str = "mirror-node-db";
const MIRROR_MONITOR: &str = "mirror-node-monitor";
pub(crate) const TOPIC_CREATED: &str = "Created TOPIC entity";

#[derive(Debug, thiserror::Error)]
enum PrepError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Docker(#[from] DockerError),

    #[error("log stream of {0} ended before the topic was created")]
    StreamEnded(&'static str),
}

pub struct NetworkPrepState {
    docker: Arc<dyn DockerOps>,
    client: Arc<dyn LedgerClient>,
    subscription: Subscription,
}

impl NetworkPrepState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let state = Self {
            docker: locator.get(DOCKER_SERVICE)?,
            client: locator.get(CLIENT_SERVICE)?,
            subscription: Subscription::default(),
        };
        trace!("Network Preparation State Initialized!");
        Ok(state)
    }

    async fn import_fees(&self) -> Result<(), PrepError> {
        trace!("Starting Fees import...");
        let timestamp = chrono::Utc::now().timestamp_millis();
        let files = [(FEES_FILE, "000000"), (EXCHANGE_RATES_FILE, "000001")];
        for (file, suffix) in files {
            let contents = self.client.file_contents(file).await?;
            let sql = file_data_insert(&contents, &format!("{timestamp}{suffix}"), file);
            let psql = ["psql", "mirror_node", "-U", "mirror_node", "-c", sql.as_str()];
            let result = self.docker.exec(MIRROR_DB, &psql).await?;
            if !result.success() {
                warn!("Importing file 0.0.{} failed: {}", file, result.stderr_lossy().trim());
            }
        }
        info!("Imported fees successfully");
        Ok(())
    }

    /// The monitor creates a topic on start-up. Seeding accounts before that
    /// shifts every following account number by one.
    async fn wait_for_topic_creation(&self) -> Result<(), PrepError> {
        trace!("Waiting for topic creation...");
        let mut logs = self
            .docker
            .container_logs(MIRROR_MONITOR, &LogOptions::follow_all())
            .await?;
        while let Some(line) = logs.next().await {
            match line {
                Ok(line) if line.content.contains(TOPIC_CREATED) => {
                    drop(logs);
                    info!("Topic was created!");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping unreadable log chunk: {}", e),
            }
        }
        Err(PrepError::StreamEnded(MIRROR_MONITOR))
    }
}

#[async_trait]
impl State for NetworkPrepState {
    fn name(&self) -> &'static str {
        "NetworkPrepState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        info!("Starting Network Preparation State...");

        match self.import_fees().await {
            Ok(()) => {}
            Err(PrepError::Client(e)) if e.is_unavailable() => {
                warn!("Skipping fee import: {}", e);
            }
            Err(e) => {
                error!("{}", e);
                observer.update(EventType::UnknownError).await;
                return Ok(());
            }
        }

        if let Err(e) = self.wait_for_topic_creation().await {
            error!("{}", e);
            observer.update(EventType::UnknownError).await;
            return Ok(());
        }

        observer.update(EventType::Finish).await;
        Ok(())
    }
}

fn file_data_insert(contents: &[u8], consensus_timestamp: &str, file: u64) -> String {
    format!(
        "INSERT INTO public.file_data(file_data, consensus_timestamp, entity_id, transaction_type) \
         VALUES (decode('{}', 'hex'), {}, {}, {});",
        hex::encode(contents),
        consensus_timestamp,
        file,
        FILE_UPDATE
    )
}
