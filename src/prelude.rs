/*!
   Re-export of common constructs used when writing upgrade tests.
*/

pub use core::time::Duration;
pub use eyre::eyre;
pub use tracing::{debug, error, info, warn};

pub use crate::bootstrap::init::init_test;
pub use crate::chain::cluster::ProcessCluster;
pub use crate::chain::governance::CliGovernance;
pub use crate::chain::handle::{ChainHeight, ClusterHandle};
pub use crate::error::{handle_generic_error, Error, UpgradeError, WaitError};
pub use crate::framework::base::{run_basic_test, run_test, BasicTest, PrimitiveTest};
pub use crate::hooks::{Coin, MultiTransferHooks, Signer, TransferHooks};
pub use crate::types::config::{ClusterConfig, Config, NodeConfig, UpgradeConfig};
pub use crate::types::params::{UpgradeSuiteParams, DEFAULT_HALT_HEIGHT};
pub use crate::types::plan::{SoftwareUpgradeProposal, UpgradePlan};
pub use crate::types::wallet::Wallet;
pub use crate::upgrade::coordinator::{upgrade_chain, UpgradeCoordinator, UpgradeReport};
pub use crate::upgrade::state::{UpgradePhase, UpgradeState};
pub use crate::upgrade::suite::ChainUpgradeSuite;
pub use crate::util::assert::*;
pub use crate::util::wait::{BlockWaiter, WaitOutcome};
