/*!
   Upgrade scenarios run against [`MockCluster`](crate::mock::cluster::MockCluster).
*/

pub mod failure;

use core::time::Duration;

use crate::types::config::UpgradeConfig;
use crate::types::params::{UpgradeSuiteParams, DEFAULT_HALT_HEIGHT};
use crate::types::wallet::Wallet;

fn fast_config() -> UpgradeConfig {
    UpgradeConfig {
        halt_timeout: Duration::from_secs(5),
        resumption_timeout: Duration::from_secs(5),
        resumption_blocks: 10,
        poll_interval: Duration::from_millis(1),
    }
}

fn upgrade_params() -> UpgradeSuiteParams {
    UpgradeSuiteParams::new("v5", DEFAULT_HALT_HEIGHT, "v4.0.0", "v5.0.0")
}

fn proposer() -> Wallet {
    Wallet::new("validator", "cosmos1phaxpevm5wecex2jyaqty2a4v02qj7qmlmzk5a")
}
