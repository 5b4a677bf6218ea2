// ABOUTME: Generates the funded test accounts for each key flavour.
// ABOUTME: One routine serves both sequential and concurrent generation.

pub mod keys;

use crate::services::{AccountRequest, ClientError, LedgerClient};
use crate::types::{AccountId, KeyKind};
use futures::future::join_all;

/// How account creation calls are issued.
///
/// `Sequential` awaits each call before the next, so the seed keys line up
/// with account numbers assigned in order. `Concurrent` issues every call at
/// once and gives no such guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Sequential,
    Concurrent,
}

impl GenerationMode {
    pub fn from_async(asynchronous: bool) -> Self {
        if asynchronous {
            GenerationMode::Concurrent
        } else {
            GenerationMode::Sequential
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAccount {
    pub kind: KeyKind,
    pub account_id: AccountId,
    pub evm_address: Option<String>,
    pub private_key: String,
    pub balance: u64,
}

pub struct AccountGenerator<'a> {
    client: &'a dyn LedgerClient,
    mode: GenerationMode,
    count: usize,
    balance: u64,
    use_seeds: bool,
}

impl<'a> AccountGenerator<'a> {
    pub fn new(
        client: &'a dyn LedgerClient,
        mode: GenerationMode,
        count: usize,
        balance: u64,
    ) -> Self {
        Self {
            client,
            mode,
            count,
            balance,
            use_seeds: false,
        }
    }

    /// Start from the pre-seeded key lists.
    pub fn with_seed_keys(mut self, use_seeds: bool) -> Self {
        self.use_seeds = use_seeds;
        self
    }

    /// Accounts of every flavour, grouped in `KeyKind::ALL` order.
    pub async fn generate_all(&self) -> Result<Vec<Vec<GeneratedAccount>>, ClientError> {
        match self.mode {
            GenerationMode::Sequential => {
                let mut groups = Vec::with_capacity(KeyKind::ALL.len());
                for kind in KeyKind::ALL {
                    groups.push(self.generate(kind).await?);
                }
                Ok(groups)
            }
            GenerationMode::Concurrent => join_all(KeyKind::ALL.map(|kind| self.generate(kind)))
                .await
                .into_iter()
                .collect(),
        }
    }

    pub async fn generate(&self, kind: KeyKind) -> Result<Vec<GeneratedAccount>, ClientError> {
        let requests: Vec<AccountRequest> = keys::keys_for(kind, self.count, self.use_seeds)
            .into_iter()
            .map(|private_key| AccountRequest {
                kind,
                private_key,
                balance: self.balance,
            })
            .collect();

        let created = match self.mode {
            GenerationMode::Sequential => {
                let mut created = Vec::with_capacity(requests.len());
                for request in &requests {
                    created.push(self.client.create_account(request).await?);
                }
                created
            }
            GenerationMode::Concurrent => {
                join_all(requests.iter().map(|r| self.client.create_account(r)))
                    .await
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(requests
            .into_iter()
            .zip(created)
            .map(|(request, account)| GeneratedAccount {
                kind,
                account_id: account.account_id,
                evm_address: account.evm_address,
                private_key: request.private_key,
                balance: request.balance,
            })
            .collect())
    }
}

/// Log one flavour's accounts as a table.
pub fn log_table(kind: KeyKind, accounts: &[GeneratedAccount]) {
    if accounts.is_empty() {
        return;
    }
    for line in table_lines(kind, accounts) {
        tracing::info!("{}", line);
    }
}

pub fn table_lines(kind: KeyKind, accounts: &[GeneratedAccount]) -> Vec<String> {
    let (divider, title, header) = match kind {
        KeyKind::AliasEcdsa => (
            "|--------------------------------------------------------------------------------------------------------------------------------------|".to_string(),
            "|------------------------------------------------| Accounts list (Alias ECDSA keys) |--------------------------------------------------|".to_string(),
            "|    id    |               public address               |                             private key                            | balance |",
        ),
        KeyKind::Ecdsa | KeyKind::Ed25519 => (
            "|-----------------------------------------------------------------------------------------|".to_string(),
            format!(
                "|-----------------------------| Accounts list ({} keys) |----------------------------|",
                kind.label()
            ),
            "|    id    |                            private key                            |  balance |",
        ),
    };

    let mut lines = vec![
        divider.clone(),
        title,
        divider.clone(),
        header.to_string(),
        divider,
    ];
    lines.extend(accounts.iter().map(|account| match &account.evm_address {
        Some(address) => format!(
            "| {} - {} - {} - {} ℏ |",
            account.account_id, address, account.private_key, account.balance
        ),
        None => format!(
            "| {} - {} - {} |",
            account.account_id, account.private_key, account.balance
        ),
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitialToken;
    use crate::services::CreatedAccount;
    use crate::types::TokenId;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Assigns account numbers per flavour in call order.
    #[derive(Default)]
    struct CountingLedger {
        next: Mutex<HashMap<KeyKind, u64>>,
    }

    #[async_trait]
    impl LedgerClient for CountingLedger {
        async fn create_account(
            &self,
            request: &AccountRequest,
        ) -> Result<CreatedAccount, ClientError> {
            let mut next = self.next.lock();
            let num = next
                .entry(request.kind)
                .or_insert_with(|| request.kind.first_account_num());
            let account_id = AccountId::new(*num);
            *num += 1;
            Ok(CreatedAccount {
                account_id,
                evm_address: (request.kind == KeyKind::AliasEcdsa)
                    .then(|| format!("0x{:040x}", account_id.num)),
            })
        }

        async fn create_token(&self, _token: &InitialToken) -> Result<TokenId, ClientError> {
            Err(ClientError::Transaction("unsupported".into()))
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
            Ok(Vec::new())
        }
    }

    #[test]
    fn mode_follows_the_async_flag() {
        assert_eq!(GenerationMode::from_async(true), GenerationMode::Concurrent);
        assert_eq!(GenerationMode::from_async(false), GenerationMode::Sequential);
    }

    #[tokio::test]
    async fn sequential_generation_maps_seed_keys_to_ascending_ids() {
        let ledger = CountingLedger::default();
        let generator =
            AccountGenerator::new(&ledger, GenerationMode::Sequential, 10, 100).with_seed_keys(true);

        let groups = generator.generate_all().await.unwrap();

        assert_eq!(groups.len(), 3);
        for (kind, accounts) in KeyKind::ALL.into_iter().zip(&groups) {
            let seeds = keys::seeded(kind);
            for (i, account) in accounts.iter().enumerate() {
                assert_eq!(account.account_id.num, kind.first_account_num() + i as u64);
                assert_eq!(account.private_key, seeds[i]);
                assert_eq!(account.balance, 100);
            }
        }
    }

    #[tokio::test]
    async fn concurrent_generation_creates_every_account() {
        let ledger = CountingLedger::default();
        let generator = AccountGenerator::new(&ledger, GenerationMode::Concurrent, 4, 1);

        let groups = generator.generate_all().await.unwrap();

        let total: usize = groups.iter().map(Vec::len).sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn alias_rows_include_the_address() {
        let account = GeneratedAccount {
            kind: KeyKind::AliasEcdsa,
            account_id: AccountId::new(1012),
            evm_address: Some("0xabc".into()),
            private_key: "0x01".into(),
            balance: 10000,
        };
        let lines = table_lines(KeyKind::AliasEcdsa, &[account]);
        assert!(lines[1].contains("Accounts list (Alias ECDSA keys)"));
        assert_eq!(lines[5], "| 0.0.1012 - 0xabc - 0x01 - 10000 ℏ |");
    }
}
