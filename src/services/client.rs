// ABOUTME: Ledger client used to seed accounts and tokens and read system files.
// ABOUTME: ClientService submits transactions to the local consensus node through the hedera SDK.

use crate::config::{InitialToken, NetworkConfiguration, TokenType};
use crate::types::{AccountId, KeyKind, TokenId};
use async_trait::async_trait;
use hedera::{
    AccountCreateTransaction, Client, FileContentsQuery, Hbar, PrivateKey,
    TokenAssociateTransaction, TokenCreateTransaction,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::OnceCell;

pub const OPERATOR_ID_VAR: &str = "RELAY_OPERATOR_ID_MAIN";
pub const OPERATOR_KEY_VAR: &str = "RELAY_OPERATOR_KEY_MAIN";

/// gRPC port of the consensus node.
pub const NODE_PORT: u16 = 50211;
pub const NODE_ACCOUNT: AccountId = AccountId::new(3);

/// How long the node may take to accept a connection before the ledger
/// counts as unavailable.
const REACH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Something went wrong, while trying to create the ledger client: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Something went wrong, while trying to create the ledger client: {0}")]
    Setup(String),

    #[error("ledger node {node} is not reachable")]
    Unavailable { node: String },

    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl ClientError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClientError::Unavailable { .. })
    }
}

#[derive(Debug, Clone)]
pub struct AccountRequest {
    pub kind: KeyKind,
    /// Hex-encoded private key.
    pub private_key: String,
    /// Initial balance in whole hbar.
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub account_id: AccountId,
    /// Present for alias accounts.
    pub evm_address: Option<String>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn create_account(&self, request: &AccountRequest) -> Result<CreatedAccount, ClientError>;

    /// Create `token` with the operator as treasury.
    async fn create_token(&self, token: &InitialToken) -> Result<TokenId, ClientError>;

    async fn associate_tokens(
        &self,
        account: &AccountId,
        private_key: &str,
        tokens: &[TokenId],
    ) -> Result<(), ClientError>;

    /// Contents of system file `0.0.<num>`.
    async fn file_contents(&self, num: u64) -> Result<Vec<u8>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct Operator {
    pub account_id: AccountId,
    pub private_key: String,
}

pub struct ClientService {
    host: String,
    port: u16,
    defaults: HashMap<String, String>,
    client: OnceCell<Client>,
}

impl ClientService {
    /// `defaults` is the network environment, consulted when a credential
    /// is not set in the process environment.
    pub fn new(host: impl Into<String>, network: &NetworkConfiguration) -> Self {
        let defaults = network
            .env
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect();
        Self {
            host: host.into(),
            port: NODE_PORT,
            defaults,
            client: OnceCell::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn node_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn operator(&self) -> Result<Operator, ClientError> {
        let account_id = self
            .credential(OPERATOR_ID_VAR)?
            .parse()
            .map_err(|e: crate::types::AccountIdError| ClientError::Setup(e.to_string()))?;
        let private_key = self.credential(OPERATOR_KEY_VAR)?;
        Ok(Operator {
            account_id,
            private_key,
        })
    }

    fn credential(&self, name: &'static str) -> Result<String, ClientError> {
        std::env::var(name)
            .ok()
            .or_else(|| self.defaults.get(name).cloned())
            .filter(|v| !v.is_empty())
            .ok_or(ClientError::MissingCredential(name))
    }

    /// The SDK client, built on first use. A failed attempt is retried on
    /// the next call.
    async fn client(&self) -> Result<&Client, ClientError> {
        self.client.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Client, ClientError> {
        let operator = self.operator()?;
        let operator_key = self.operator_key()?;

        let node = self.node_address();
        match tokio::time::timeout(REACH_TIMEOUT, TcpStream::connect(&node)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::debug!("Ledger node {} refused the connection: {}", node, e);
                return Err(ClientError::Unavailable { node });
            }
            Err(_) => return Err(ClientError::Unavailable { node }),
        }

        let network = HashMap::from([(node.clone(), sdk_account(NODE_ACCOUNT)?)]);
        let client = Client::for_network(network).map_err(|e| ClientError::Setup(e.to_string()))?;
        client.set_operator(sdk_account(operator.account_id)?, operator_key);
        tracing::debug!(
            "Ledger client for node {} ({}) as operator {}",
            node,
            NODE_ACCOUNT,
            operator.account_id
        );
        Ok(client)
    }

    fn operator_key(&self) -> Result<PrivateKey, ClientError> {
        self.operator()?
            .private_key
            .parse::<PrivateKey>()
            .map_err(|e| ClientError::Setup(format!("operator key: {e}")))
    }
}

fn sdk_account(id: AccountId) -> Result<hedera::AccountId, ClientError> {
    id.to_string()
        .parse::<hedera::AccountId>()
        .map_err(|e| ClientError::Setup(format!("account {id}: {e}")))
}

/// Decode a `0x`-prefixed hex secret as `kind`.
fn signing_key(kind: KeyKind, private_key: &str) -> Result<PrivateKey, ClientError> {
    let bytes = hex::decode(private_key.trim_start_matches("0x"))
        .map_err(|e| ClientError::Setup(format!("private key is not hex: {e}")))?;
    match kind {
        KeyKind::Ed25519 => PrivateKey::from_bytes_ed25519(&bytes),
        KeyKind::Ecdsa | KeyKind::AliasEcdsa => PrivateKey::from_bytes_ecdsa(&bytes),
    }
    .map_err(|e| ClientError::Setup(format!("private key: {e}")))
}

fn transaction_error(e: hedera::Error) -> ClientError {
    ClientError::Transaction(e.to_string())
}

#[async_trait]
impl LedgerClient for ClientService {
    async fn create_account(&self, request: &AccountRequest) -> Result<CreatedAccount, ClientError> {
        let client = self.client().await?;
        let key = signing_key(request.kind, &request.private_key)?;
        let public_key = key.public_key();
        let balance = i64::try_from(request.balance)
            .map_err(|_| ClientError::Setup(format!("balance {} is too large", request.balance)))?;

        let mut transaction = AccountCreateTransaction::new();
        transaction
            .key(public_key.clone())
            .initial_balance(Hbar::new(balance));
        let evm_address = match request.kind {
            KeyKind::AliasEcdsa => {
                let address = public_key.to_evm_address().ok_or_else(|| {
                    ClientError::Setup("key has no EVM address".to_string())
                })?;
                let shown = address.to_string();
                transaction.alias(address).sign(key);
                Some(if shown.starts_with("0x") {
                    shown
                } else {
                    format!("0x{shown}")
                })
            }
            KeyKind::Ecdsa | KeyKind::Ed25519 => None,
        };

        let receipt = transaction
            .execute(client)
            .await
            .map_err(transaction_error)?
            .get_receipt(client)
            .await
            .map_err(transaction_error)?;
        let account_id = receipt
            .account_id
            .ok_or_else(|| ClientError::Transaction("receipt has no account id".to_string()))?
            .to_string()
            .parse()
            .map_err(|e: crate::types::AccountIdError| ClientError::Transaction(e.to_string()))?;

        Ok(CreatedAccount {
            account_id,
            evm_address,
        })
    }

    async fn create_token(&self, token: &InitialToken) -> Result<TokenId, ClientError> {
        let client = self.client().await?;
        let operator = self.operator()?;
        let operator_key = self.operator_key()?.public_key();

        let mut transaction = TokenCreateTransaction::new();
        transaction
            .name(token.name.clone())
            .symbol(token.symbol.clone())
            .treasury_account_id(sdk_account(operator.account_id)?)
            .admin_key(operator_key.clone())
            .supply_key(operator_key);
        match token.token_type {
            TokenType::FungibleCommon => {
                transaction
                    .token_type(hedera::TokenType::FungibleCommon)
                    .decimals(token.decimals)
                    .initial_supply(token.initial_supply);
            }
            TokenType::NonFungibleUnique => {
                transaction.token_type(hedera::TokenType::NonFungibleUnique);
            }
        }

        let receipt = transaction
            .execute(client)
            .await
            .map_err(transaction_error)?
            .get_receipt(client)
            .await
            .map_err(transaction_error)?;
        receipt
            .token_id
            .map(|id| TokenId::new(id.to_string()))
            .ok_or_else(|| ClientError::Transaction("receipt has no token id".to_string()))
    }

    /// Initial-resource accounts hold ECDSA keys.
    async fn associate_tokens(
        &self,
        account: &AccountId,
        private_key: &str,
        tokens: &[TokenId],
    ) -> Result<(), ClientError> {
        let client = self.client().await?;
        let key = signing_key(KeyKind::Ecdsa, private_key)?;
        let token_ids = tokens
            .iter()
            .map(|id| {
                id.as_str()
                    .parse::<hedera::TokenId>()
                    .map_err(|e| ClientError::Setup(format!("token {id}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        TokenAssociateTransaction::new()
            .account_id(sdk_account(*account)?)
            .token_ids(token_ids)
            .sign(key)
            .execute(client)
            .await
            .map_err(transaction_error)?
            .get_receipt(client)
            .await
            .map_err(transaction_error)?;
        Ok(())
    }

    async fn file_contents(&self, num: u64) -> Result<Vec<u8>, ClientError> {
        let client = self.client().await?;
        let file_id = format!("0.0.{num}")
            .parse::<hedera::FileId>()
            .map_err(|e| ClientError::Setup(format!("file 0.0.{num}: {e}")))?;
        let response = FileContentsQuery::new()
            .file_id(file_id)
            .execute(client)
            .await
            .map_err(transaction_error)?;
        Ok(response.contents)
    }
}
