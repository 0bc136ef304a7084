/*!
   Hooks run after a fungible token transfer packet has been received.

   Applications that want to react to incoming transfers register a
   [`TransferHooks`] implementation. Several of them are combined with
   [`MultiTransferHooks`], which runs them one after the other.
*/

use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

/// The bech32 address of the account that received a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer(pub String);

/**
   An amount of a denomination, as credited to the receiver of a transfer.
   The denomination of a received voucher carries its trace path, e.g.
   `transfer/channel-0/stake`.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

pub trait TransferHooks {
    /**
       Called once the voucher has been credited to `receiver`. An error
       fails the packet receipt.
    */
    fn after_recv_packet(&self, receiver: &Signer, voucher: &Coin) -> Result<(), Error>;

    /// Name identifying the hook in error reports.
    fn hook_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/**
   Runs the registered hooks in registration order, stopping at the first
   one that fails.
*/
#[derive(Default)]
pub struct MultiTransferHooks {
    hooks: Vec<Box<dyn TransferHooks + Send + Sync>>,
}

impl MultiTransferHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(mut self, hook: impl TransferHooks + Send + Sync + 'static) -> Self {
        self.push(hook);
        self
    }

    pub fn push(&mut self, hook: impl TransferHooks + Send + Sync + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl TransferHooks for MultiTransferHooks {
    fn after_recv_packet(&self, receiver: &Signer, voucher: &Coin) -> Result<(), Error> {
        for (index, hook) in self.hooks.iter().enumerate() {
            debug!(
                "running transfer hook #{} ({}) for {} received by {}",
                index,
                hook.hook_name(),
                voucher,
                receiver
            );

            if let Err(e) = hook.after_recv_packet(receiver, voucher) {
                warn!("transfer hook #{} ({}) failed: {}", index, hook.hook_name(), e);

                return Err(Error::hook_failed(
                    index,
                    hook.hook_name().to_string(),
                    eyre::Report::new(e),
                ));
            }
        }

        Ok(())
    }
}
