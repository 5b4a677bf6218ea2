// ABOUTME: Test support utilities.
// ABOUTME: Recording fakes for the Docker, connection and ledger services plus a locator builder.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use hedera_local::config::{InitialToken, Settings};
use hedera_local::controller::Observer;
use hedera_local::runtime::{
    CommandOutput, ContainerSummary, ExecResult, LogLine, LogOptions, LogStream, LogStreamBox,
};
use hedera_local::services::{
    AccountRequest, Bootstrapper, ClientError, CliOptions, CliService, ConnectionError,
    ConnectionOps, CreatedAccount, DockerError, DockerOps, LedgerClient, ServiceLocator,
};
use hedera_local::state::{State, StateError};
use hedera_local::types::{AccountId, EventType, NetworkId, TokenId, Workflow};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("hedera_local=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Records every call and answers from configurable scripts.
#[derive(Default)]
pub struct FakeDocker {
    pub calls: Mutex<Vec<String>>,
    /// Exit codes for successive compose-up calls; empty means success.
    pub compose_exits: Mutex<VecDeque<i32>>,
    pub logs: Mutex<HashMap<String, Vec<String>>>,
    pub unavailable: bool,
}

impl FakeDocker {
    pub fn with_compose_exits(exits: &[i32]) -> Self {
        Self {
            compose_exits: Mutex::new(exits.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn with_logs(self, container: &str, lines: &[&str]) -> Self {
        self.logs.lock().insert(
            container.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

#[async_trait]
impl DockerOps for FakeDocker {
    async fn check_docker(&self) -> bool {
        self.record("check_docker");
        !self.unavailable
    }

    async fn is_correct_compose_version(&self) -> bool {
        true
    }

    async fn ports_in_use(&self, _ports: &[u16]) -> Vec<u16> {
        Vec::new()
    }

    async fn compose_up(
        &self,
        files: &[PathBuf],
        _env: &[(String, String)],
    ) -> Result<CommandOutput, DockerError> {
        self.record(format!("compose_up {}", files.len()));
        let exit_code = self.compose_exits.lock().pop_front().unwrap_or(0);
        Ok(CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: if exit_code == 0 { String::new() } else { "conflict".into() },
        })
    }

    async fn compose_stop(&self) -> Result<(), DockerError> {
        self.record("compose_stop");
        Ok(())
    }

    async fn remove_networks(&self) -> Result<Vec<NetworkId>, DockerError> {
        self.record("remove_networks");
        Ok(Vec::new())
    }

    async fn container(&self, name: &str) -> Result<ContainerSummary, DockerError> {
        Err(DockerError::ContainerNotFound(name.to_string()))
    }

    async fn container_logs(
        &self,
        name: &str,
        _opts: &LogOptions,
    ) -> Result<LogStreamBox, DockerError> {
        self.record(format!("logs {name}"));
        let lines = self.logs.lock().get(name).cloned().unwrap_or_default();
        Ok(stream::iter(lines.into_iter().map(|content| {
            Ok(LogLine {
                content,
                stream: LogStream::Stdout,
            })
        }))
        .boxed())
    }

    async fn exec(&self, name: &str, cmd: &[&str]) -> Result<ExecResult, DockerError> {
        self.record(format!("exec {name} {}", cmd.join(" ")));
        Ok(ExecResult {
            exit_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

/// Ports listed in `closed` never open.
#[derive(Default)]
pub struct FakeConnection {
    pub closed: Vec<u16>,
}

#[async_trait]
impl ConnectionOps for FakeConnection {
    async fn wait_for_firing_up(&self, ports: &[u16]) -> Result<(), ConnectionError> {
        match ports.iter().find(|p| self.closed.contains(p)) {
            Some(&port) => Err(ConnectionError { port }),
            None => Ok(()),
        }
    }

    async fn check_connection(&self, port: u16) -> bool {
        !self.closed.contains(&port)
    }
}

/// Hands out account numbers per key kind in call order.
#[derive(Default)]
pub struct FakeLedger {
    next: Mutex<HashMap<hedera_local::types::KeyKind, u64>>,
    pub created: Mutex<Vec<String>>,
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn create_account(&self, request: &AccountRequest) -> Result<CreatedAccount, ClientError> {
        let mut next = self.next.lock();
        let num = next
            .entry(request.kind)
            .or_insert_with(|| request.kind.first_account_num());
        let account_id = AccountId::new(*num);
        *num += 1;
        self.created.lock().push(request.private_key.clone());
        Ok(CreatedAccount {
            account_id,
            evm_address: None,
        })
    }

    async fn create_token(&self, token: &InitialToken) -> Result<TokenId, ClientError> {
        Ok(TokenId::new(format!("0.0.{}", 2000 + token.symbol.len())))
    }

    async fn associate_tokens(
        &self,
        _account: &AccountId,
        _private_key: &str,
        _tokens: &[TokenId],
    ) -> Result<(), ClientError> {
        Ok(())
    }

    async fn file_contents(&self, _num: u64) -> Result<Vec<u8>, ClientError> {
        Ok(vec![0x0a, 0x0b])
    }
}

pub struct Services {
    pub docker: Arc<FakeDocker>,
    pub connection: Arc<FakeConnection>,
    pub ledger: Arc<FakeLedger>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            docker: Arc::new(FakeDocker::default()),
            connection: Arc::new(FakeConnection::default()),
            ledger: Arc::new(FakeLedger::default()),
        }
    }
}

impl Services {
    pub fn locator(&self, workflow: Workflow, options: CliOptions) -> Arc<ServiceLocator> {
        let docker: Arc<dyn DockerOps> = self.docker.clone();
        let connection: Arc<dyn ConnectionOps> = self.connection.clone();
        let client: Arc<dyn LedgerClient> = self.ledger.clone();
        let locator = Bootstrapper::assemble(
            CliService::from_options(workflow, options),
            Settings::default(),
            docker,
            connection,
            client,
        )
        .unwrap();
        Arc::new(locator)
    }
}

/// Run `state` to the end of `on_start`, acknowledging every event it raises.
pub async fn run_state<S: State>(state: &mut S) -> (Result<(), StateError>, Vec<EventType>) {
    let (observer, mut rx) = Observer::channel();
    state.subscribe(observer);
    let mut events = Vec::new();
    let result = {
        let start = state.on_start();
        tokio::pin!(start);
        loop {
            tokio::select! {
                result = &mut start => break result,
                Some(notification) = rx.recv() => {
                    events.push(notification.event);
                    notification.acknowledge();
                }
            }
        }
    };
    while let Ok(notification) = rx.try_recv() {
        events.push(notification.event);
        notification.acknowledge();
    }
    (result, events)
}
