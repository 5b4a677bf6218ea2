// ABOUTME: Creates the initial accounts and tokens and associates them.
// ABOUTME: In asynchronous mode the work runs in the background and Finish arrives when it is done.

use super::{State, StateError, Subscription};
use crate::config::InitialResources;
use crate::controller::Observer;
use crate::diagnostics::{Diagnostics, Warning, WarningKind};
use crate::services::{
    AccountRequest, CLI_SERVICE, CLIENT_SERVICE, ClientError, CliService, LedgerClient,
    LocatorError, ServiceLocator,
};
use crate::types::{AccountId, EventType, KeyKind, TokenId};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, trace, warn};

pub struct ResourceCreationState {
    cli: Arc<CliService>,
    client: Arc<dyn LedgerClient>,
    subscription: Subscription,
}

impl ResourceCreationState {
    pub fn new(locator: &ServiceLocator) -> Result<Self, LocatorError> {
        let state = Self {
            cli: locator.get(CLI_SERVICE)?,
            client: locator.get(CLIENT_SERVICE)?,
            subscription: Subscription::default(),
        };
        trace!("Resource Creation State Initialized!");
        Ok(state)
    }
}

#[async_trait]
impl State for ResourceCreationState {
    fn name(&self) -> &'static str {
        "ResourceCreationState"
    }

    fn subscribe(&mut self, observer: Observer) {
        self.subscription.set(observer);
    }

    async fn on_start(&mut self) -> Result<(), StateError> {
        let observer = self.subscription.observer(self.name())?.clone();
        let asynchronous = self.cli.options().asynchronous;
        info!(
            "Starting Resource Creation State in {} mode",
            if asynchronous { "asynchronous" } else { "synchronous" }
        );

        let resources = InitialResources::load()?;
        let client = Arc::clone(&self.client);
        let work = async move {
            let diagnostics = create_resources(client.as_ref(), &resources).await;
            if diagnostics.has_warnings() {
                info!(
                    "Resource creation finished with {} warning(s): {} unknown token(s), {} skipped",
                    diagnostics.warnings().len(),
                    diagnostics.count(WarningKind::UnknownToken),
                    diagnostics.count(WarningKind::Skipped)
                );
            }
            observer.update(EventType::Finish).await;
        };

        if asynchronous {
            tokio::spawn(work);
        } else {
            work.await;
        }
        Ok(())
    }
}

/// Create accounts, then tokens, then the associations between them.
/// Individual failures are collected rather than aborting the run.
pub async fn create_resources(
    client: &dyn LedgerClient,
    resources: &InitialResources,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();

    let accounts = match create_accounts(client, resources).await {
        Ok(accounts) => accounts,
        Err(e) if e.is_unavailable() => {
            warn!("Skipping resource creation: {}", e);
            return diagnostics;
        }
        Err(e) => {
            diagnostics.warn(Warning::skipped(format!("Creating accounts failed: {e}")));
            return diagnostics;
        }
    };

    info!("Creating tokens");
    let mut tokens: HashMap<&str, TokenId> = HashMap::new();
    let created = join_all(resources.tokens.iter().map(|t| client.create_token(t))).await;
    for (token, result) in resources.tokens.iter().zip(created) {
        match result {
            Ok(id) => {
                info!(
                    "Successfully created {:?} token '{}' with ID {}",
                    token.token_type, token.symbol, id
                );
                tokens.insert(token.symbol.as_str(), id);
            }
            Err(e) => diagnostics.warn(Warning::skipped(format!(
                "Creating token {} failed: {e}",
                token.symbol
            ))),
        }
    }

    info!("Associating accounts with tokens");
    let mut associations = Vec::new();
    for (account, account_id) in resources.accounts.iter().zip(&accounts) {
        let mut token_ids = Vec::new();
        for symbol in &account.associated_tokens {
            match tokens.get(symbol.as_str()) {
                Some(id) => token_ids.push(id.clone()),
                None => diagnostics.warn(Warning::unknown_token(symbol)),
            }
        }
        if !token_ids.is_empty() {
            associations.push((*account_id, account.private_key.as_str(), token_ids));
        }
    }

    let results = join_all(associations.iter().map(|(id, key, token_ids)| {
        client.associate_tokens(id, key, token_ids)
    }))
    .await;
    for ((id, _, token_ids), result) in associations.iter().zip(results) {
        match result {
            Ok(()) => info!(
                "Associated account {} with token IDs: {}",
                id,
                token_ids.iter().map(TokenId::as_str).collect::<Vec<_>>().join(", ")
            ),
            Err(e) => diagnostics.warn(Warning::skipped(format!(
                "Associating account {id} failed: {e}"
            ))),
        }
    }

    diagnostics
}

async fn create_accounts(
    client: &dyn LedgerClient,
    resources: &InitialResources,
) -> Result<Vec<AccountId>, ClientError> {
    info!("Creating accounts");
    let requests: Vec<AccountRequest> = resources
        .accounts
        .iter()
        .map(|account| AccountRequest {
            kind: KeyKind::AliasEcdsa,
            private_key: account.private_key.clone(),
            balance: account.balance,
        })
        .collect();

    let created = join_all(requests.iter().map(|r| client.create_account(r))).await;
    let mut ids = Vec::with_capacity(created.len());
    for result in created {
        let account = result?;
        info!(
            "Successfully created account with: account-id = {} evm-address = {}",
            account.account_id,
            account.evm_address.as_deref().unwrap_or("-")
        );
        ids.push(account.account_id);
    }
    Ok(ids)
}
