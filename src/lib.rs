#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![doc = include_str!("../README.md")]
//!
//! ## Example
//!
//! An upgrade suite only supplies the parameters of the upgrade and the way
//! governance proposals pass on its chain. Here the governance is scripted
//! and the cluster is in-memory:
//!
//! ```rust
//! use ibc_chain_upgrade::mock::cluster::MockCluster;
//! use ibc_chain_upgrade::mock::suite::MockUpgradeSuite;
//! use ibc_chain_upgrade::prelude::*;
//!
//! let params = UpgradeSuiteParams::new("v5", 100, "v4.0.0", "v5.0.0");
//! let suite = MockUpgradeSuite::new(params);
//!
//! // Reaches the halt height, then produces blocks again once restarted.
//! let cluster = MockCluster::with_heights([50, 50, 50, 101, 101, 111, 111]);
//! let proposer = Wallet::new("validator", "cosmos1validator");
//!
//! let config = UpgradeConfig {
//!     poll_interval: Duration::from_millis(1),
//!     ..UpgradeConfig::default()
//! };
//!
//! let report = upgrade_chain(&config, &suite, &cluster, &proposer).unwrap();
//!
//! assert_eq!(report.halt_wait.target, 51);
//! assert_eq!(report.final_height, 111);
//! ```

pub mod bootstrap;
pub mod chain;
pub mod error;
pub mod framework;
pub mod hooks;
pub mod mock;
pub mod prelude;
pub mod types;
pub mod upgrade;
pub mod util;

#[cfg(test)]
mod tests;
