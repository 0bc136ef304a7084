/*!
   Configuration of upgrade runs and of the clusters they operate on.
*/

use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::Error;

pub mod default {
    use super::*;

    pub fn halt_timeout() -> Duration {
        Duration::from_secs(120)
    }

    pub fn resumption_timeout() -> Duration {
        Duration::from_secs(120)
    }

    pub fn resumption_blocks() -> u64 {
        10
    }

    pub fn poll_interval() -> Duration {
        Duration::from_millis(500)
    }

    pub fn keyring_backend() -> String {
        "test".to_string()
    }

    pub fn fees() -> String {
        "1200stake".to_string()
    }

    pub fn deposit() -> String {
        "10000000stake".to_string()
    }

    pub fn proposal_attempts() -> u16 {
        90
    }
}

/**
   The top-level configuration file.
*/
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub upgrade: UpgradeConfig,

    pub cluster: Option<ClusterConfig>,
}

/**
   Timing parameters of an upgrade run.
*/
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeConfig {
    /// Deadline for the chain to reach the halt height once the proposal passed
    #[serde(default = "default::halt_timeout", with = "humantime_serde")]
    pub halt_timeout: Duration,

    /// Deadline for the upgraded cluster to produce `resumption_blocks` blocks
    #[serde(default = "default::resumption_timeout", with = "humantime_serde")]
    pub resumption_timeout: Duration,

    #[serde(default = "default::resumption_blocks")]
    pub resumption_blocks: u64,

    /// Interval between two height queries while waiting for blocks
    #[serde(default = "default::poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            halt_timeout: default::halt_timeout(),
            resumption_timeout: default::resumption_timeout(),
            resumption_blocks: default::resumption_blocks(),
            poll_interval: default::poll_interval(),
        }
    }
}

/**
   A cluster of nodes running as local processes, see
   [`ProcessCluster`](crate::chain::cluster::ProcessCluster).
*/
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    pub chain_id: String,

    /// The version the nodes are running when the cluster is created
    pub current_version: String,

    /// Extra arguments passed to `start` after `--home` and `--rpc.laddr`
    #[serde(default)]
    pub start_args: Vec<String>,

    #[serde(default = "default::keyring_backend")]
    pub keyring_backend: String,

    #[serde(default = "default::fees")]
    pub fees: String,

    #[serde(default = "default::deposit")]
    pub deposit: String,

    /// Number of one-second polls before a proposal that has not concluded is abandoned
    #[serde(default = "default::proposal_attempts")]
    pub proposal_attempts: u16,

    // Tables go last so the config serializes back to valid TOML.
    /// The binary to run for each chain version
    pub binaries: BTreeMap<String, String>,

    pub nodes: Vec<NodeConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub moniker: String,
    pub home_path: String,
    pub rpc_port: u16,

    /// Keyring name of the validator key this node votes with
    pub validator_key: String,
}

impl NodeConfig {
    pub fn rpc_listen_address(&self) -> String {
        format!("tcp://localhost:{}", self.rpc_port)
    }
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config_toml = fs::read_to_string(&path)?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(Error::config_decode)?;

    Ok(config)
}

/// Serialize the given `Config` as TOML to the given config file.
pub fn store(config: &Config, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut file = if path.as_ref().exists() {
        fs::OpenOptions::new().write(true).truncate(true).open(path)
    } else {
        File::create(path)
    }?;

    store_writer(config, &mut file)
}

pub(crate) fn store_writer(config: &Config, mut writer: impl Write) -> Result<(), Error> {
    let toml_config = toml::to_string_pretty(&config).map_err(Error::config_encode)?;

    writeln!(writer, "{toml_config}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_full_config() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/upgrade_config.toml"
        );

        let config = load(path).expect("could not parse config");

        assert_eq!(config.upgrade.halt_timeout, Duration::from_secs(180));
        assert_eq!(config.upgrade.resumption_blocks, 10);
        assert_eq!(config.upgrade.poll_interval, Duration::from_millis(250));

        let cluster = config.cluster.expect("cluster section");
        assert_eq!(cluster.chain_id, "ibc-0");
        assert_eq!(cluster.nodes.len(), 2);
        assert_eq!(cluster.binaries["v5.0.0"], "simd-v5");
        assert_eq!(cluster.fees, "1200stake");
        assert_eq!(cluster.nodes[1].rpc_listen_address(), "tcp://localhost:26757");
    }

    #[test]
    fn missing_upgrade_section_uses_defaults() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/minimal_config.toml"
        );

        let config = load(path).expect("could not parse config");

        assert_eq!(config.upgrade, UpgradeConfig::default());
        assert!(config.cluster.is_none());
    }

    #[test]
    fn reject_unknown_fields() {
        let result = toml::from_str::<Config>("[upgrade]\nhalt_height = 100\n");
        assert!(result.is_err());
    }

    #[test]
    fn serialize_and_parse_back() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/upgrade_config.toml"
        );

        let config = load(path).expect("could not parse config");

        let mut buffer = Vec::new();
        store_writer(&config, &mut buffer).unwrap();

        let parsed = toml::from_str::<Config>(core::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
