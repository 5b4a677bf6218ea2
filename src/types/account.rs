// ABOUTME: Ledger account identifiers and the key flavours used for seeded accounts.
// ABOUTME: AccountId parses and prints the shard.realm.num form.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key flavour of a generated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Ecdsa,
    /// ECDSA key whose account is addressed by the key's EVM alias.
    AliasEcdsa,
    Ed25519,
}

impl KeyKind {
    pub const ALL: [KeyKind; 3] = [KeyKind::Ecdsa, KeyKind::AliasEcdsa, KeyKind::Ed25519];

    /// First account number assigned to this kind when seeding in order.
    pub fn first_account_num(self) -> u64 {
        match self {
            KeyKind::Ecdsa => 1002,
            KeyKind::AliasEcdsa => 1012,
            KeyKind::Ed25519 => 1022,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeyKind::Ecdsa => "ECDSA",
            KeyKind::AliasEcdsa => "Alias ECDSA",
            KeyKind::Ed25519 => "ED25519",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid account id '{0}', expected shard.realm.num")]
pub struct AccountIdError(String);

/// `shard.realm.num` ledger entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl AccountId {
    pub const fn new(num: u64) -> Self {
        Self {
            shard: 0,
            realm: 0,
            num,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AccountIdError(s.to_string());
        let mut parts = s.split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .ok_or_else(invalid)
        };
        let id = AccountId {
            shard: next()?,
            realm: next()?,
            num: next()?,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entity_id() {
        let id: AccountId = "0.0.1002".parse().unwrap();
        assert_eq!(id, AccountId::new(1002));
        assert_eq!(id.to_string(), "0.0.1002");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("0.0".parse::<AccountId>().is_err());
        assert!("0.0.1.2".parse::<AccountId>().is_err());
        assert!("a.b.c".parse::<AccountId>().is_err());
    }
}
