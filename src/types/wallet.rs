/*!
   Types for the accounts that sign transactions during an upgrade run.
*/

use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

/**
   Newtype wrapper for a wallet ID as identified by the chain's keyring.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletId(pub String);

/**
   Newtype wrapper for the bech32 address of a wallet.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAddress(pub String);

/**
   A wallet known to the keyring of the nodes in the cluster. The proposer
   of an upgrade is identified by one of these.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// The key name used with `--from`.
    pub id: WalletId,

    pub address: WalletAddress,
}

impl Wallet {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: WalletId(id.into()),
            address: WalletAddress(address.into()),
        }
    }
}

impl Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
