// ABOUTME: Seeds the funded ECDSA, alias ECDSA and ED25519 accounts.
// ABOUTME: Start-up runs use the pre-seeded keys so account ids are reproducible.

use super::{State, StateError, Subscription};
use crate::accounts::{AccountGenerator, GenerationMode, log_table};
use crate::controller::Observer;
use crate::services::{
    CLI_SERVICE, CLIENT_SERVICE, CliService, LedgerClient, LocatorError, ServiceLocator,
};
use crate::types::{EventType, KeyKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, trace, warn};

pub struct AccountCreationState {
    cli: Arc<CliService>,
    client: Arc<dyn LedgerClient>,
    subscription: Subscription,
}

impl AccountCreationState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let state = Self {
            cli: locator.get(CLI_SERVICE)?,
            client: locator.get(CLIENT_SERVICE)?,
            subscription: Subscription::default(),
        };
        trace!("Account Creation State Initialized!");
        Ok(state)
    }
}

#[async_trait]
impl State for AccountCreationState {
    fn name(&self) -> &'static str {
        "AccountCreationState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        let options = self.cli.options();
        let mode = GenerationMode::from_async(options.asynchronous);
        info!(
            "Starting Account Creation state in {} mode...",
            match mode {
                GenerationMode::Concurrent => "asynchronous",
                GenerationMode::Sequential => "synchronous",
            }
        );

        let generator = AccountGenerator::new(
            self.client.as_ref(),
            mode,
            options.accounts as usize,
            options.balance,
        )
        .with_seed_keys(options.startup);

        match generator.generate_all().await {
            Ok(groups) => {
                for (kind, accounts) in KeyKind::ALL.into_iter().zip(&groups) {
                    log_table(kind, accounts);
                }
            }
            Err(e) if e.is_unavailable() => warn!("Skipping account creation: {}", e),
            Err(e) => {
                error!("{}", e);
                observer.update(EventType::UnknownError).await;
                return Ok(());
            }
        }

        observer.update(EventType::Finish).await;
        Ok(())
    }
}
