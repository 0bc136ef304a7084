/*!
   A [`ClusterHandle`] over full nodes running as local child processes.
*/

use std::process::{Command, Stdio};
use std::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chain::cli::status::query_latest_height;
use crate::chain::handle::{ChainHeight, ClusterHandle};
use crate::error::{handle_exec_error, handle_generic_error, Error};
use crate::types::config::{ClusterConfig, NodeConfig};
use crate::types::process::ChildProcess;
use crate::util::file::pipe_to_file;

/**
   A full node of a [`ProcessCluster`], together with the child process
   running it if it is started.
*/
pub struct ClusterNode {
    pub config: NodeConfig,

    process: RwLock<Option<ChildProcess>>,
}

/**
   A cluster of full nodes of one chain, each running as a child process of
   the test, with one binary per chain version.

   Nodes must already be initialized in their home directories. The version
   swap only changes which binary the next start uses, so the nodes keep
   their data directories across the upgrade.
*/
pub struct ProcessCluster {
    pub config: ClusterConfig,

    pub nodes: Vec<ClusterNode>,

    current_version: RwLock<String>,
}

impl ProcessCluster {
    pub fn new(config: ClusterConfig) -> Result<Self, Error> {
        if config.nodes.is_empty() {
            return Err(Error::invalid_params(format!(
                "cluster {} has no nodes",
                config.chain_id
            )));
        }

        if !config.binaries.contains_key(&config.current_version) {
            return Err(Error::unknown_version(config.current_version.clone()));
        }

        let nodes = config
            .nodes
            .iter()
            .map(|node| ClusterNode {
                config: node.clone(),
                process: RwLock::new(None),
            })
            .collect();

        Ok(Self {
            current_version: RwLock::new(config.current_version.clone()),
            config,
            nodes,
        })
    }

    pub fn current_version(&self) -> Result<String, Error> {
        let version = self.current_version.read().map_err(|_| poisoned())?;
        Ok(version.clone())
    }

    /**
       The binary of the version the nodes currently run.
    */
    pub fn command_path(&self) -> Result<String, Error> {
        let version = self.current_version()?;
        self.binary_for(&version).map(str::to_string)
    }

    fn binary_for(&self, version: &str) -> Result<&str, Error> {
        self.config
            .binaries
            .get(version)
            .map(String::as_str)
            .ok_or_else(|| Error::unknown_version(version.to_string()))
    }

    pub fn is_running(&self) -> Result<bool, Error> {
        for node in self.nodes.iter() {
            if !node.is_running()? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl ClusterNode {
    pub fn is_running(&self) -> Result<bool, Error> {
        let mut process = self.process.write().map_err(|_| poisoned())?;

        match process.as_mut() {
            Some(child) => Ok(!child.has_exited()?),
            None => Ok(false),
        }
    }

    fn start(&self, command_path: &str, start_args: &[String]) -> Result<(), Error> {
        let mut process = self.process.write().map_err(|_| poisoned())?;

        if process.is_some() {
            return Err(Error::generic(eyre::eyre!(
                "node {} is already started",
                self.config.moniker
            )));
        }

        let rpc_listen_address = self.config.rpc_listen_address();

        let mut args = vec![
            "start",
            "--home",
            &self.config.home_path,
            "--rpc.laddr",
            &rpc_listen_address,
        ];
        args.extend(start_args.iter().map(String::as_str));

        debug!(
            "starting node {}: {} {}",
            self.config.moniker,
            command_path,
            itertools::join(&args, " ")
        );

        let mut child = Command::new(command_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(handle_exec_error(command_path))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| eyre::eyre!("expected stdout to be present in child process"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| eyre::eyre!("expected stderr to be present in child process"))?;

        let child = ChildProcess::new(child);

        pipe_to_file(stdout, &format!("{}/stdout.log", self.config.home_path))?;
        pipe_to_file(stderr, &format!("{}/stderr.log", self.config.home_path))?;

        *process = Some(child);

        Ok(())
    }

    fn stop(&self) -> Result<(), Error> {
        let mut process = self.process.write().map_err(|_| poisoned())?;

        match process.take() {
            Some(mut child) => child.kill(),
            None => Err(Error::node_not_running(self.config.moniker.clone())),
        }
    }
}

impl ChainHeight for ProcessCluster {
    /**
       Query the nodes in order and return the height reported by the first
       one that answers.
    */
    fn query_height(&self) -> Result<u64, Error> {
        let command_path = self.command_path()?;

        for node in self.nodes.iter() {
            match query_latest_height(
                &self.config.chain_id,
                &command_path,
                &node.config.rpc_listen_address(),
            ) {
                Ok(height) => return Ok(height),
                Err(e) => {
                    debug!(
                        "failed to query height from node {}: {}",
                        node.config.moniker, e
                    );
                }
            }
        }

        Err(Error::no_reachable_node(self.config.chain_id.clone()))
    }
}

impl ClusterHandle for ProcessCluster {
    fn chain_id(&self) -> &str {
        &self.config.chain_id
    }

    /**
       Every node is stopped even if stopping one of them fails, so that no
       process of the old version survives; the failures are then reported
       together.
    */
    fn stop_all_nodes(&self) -> Result<(), Error> {
        let mut failed = Vec::new();

        for node in self.nodes.iter() {
            if let Err(e) = node.stop() {
                warn!("failed to stop node {}: {}", node.config.moniker, e);
                failed.push(node.config.moniker.clone());
            }
        }

        if !failed.is_empty() {
            return Err(Error::node_lifecycle("stop".to_string(), failed.join(", ")));
        }

        info!("stopped all {} nodes of chain {}", self.nodes.len(), self.chain_id());

        Ok(())
    }

    /**
       Nodes already started are stopped again if any node fails to start,
       leaving the cluster fully stopped.
    */
    fn start_all_nodes(&self) -> Result<(), Error> {
        let command_path = self.command_path()?;

        for (i, node) in self.nodes.iter().enumerate() {
            if let Err(e) = node.start(&command_path, &self.config.start_args) {
                warn!("failed to start node {}: {}", node.config.moniker, e);

                for started in self.nodes[..i].iter() {
                    if let Err(e) = started.stop() {
                        warn!(
                            "failed to stop node {} after aborted start: {}",
                            started.config.moniker, e
                        );
                    }
                }

                return Err(Error::node_lifecycle(
                    "start".to_string(),
                    node.config.moniker.clone(),
                ));
            }
        }

        info!(
            "started all {} nodes of chain {} with {}",
            self.nodes.len(),
            self.chain_id(),
            command_path
        );

        Ok(())
    }

    fn swap_version(&self, version: &str) -> Result<(), Error> {
        for node in self.nodes.iter() {
            if node.is_running()? {
                return Err(Error::generic(eyre::eyre!(
                    "cannot swap version of chain {} while node {} is running",
                    self.chain_id(),
                    node.config.moniker
                )));
            }
        }

        self.binary_for(version)?;

        let mut current_version = self.current_version.write().map_err(|_| poisoned())?;

        info!(
            "swapping chain {} from version {} to {}",
            self.chain_id(),
            current_version,
            version
        );

        *current_version = version.to_string();

        Ok(())
    }
}

fn poisoned() -> Error {
    handle_generic_error(eyre::eyre!("cluster lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn cluster_config() -> ClusterConfig {
        let mut binaries = BTreeMap::new();
        binaries.insert("v4.0.0".to_string(), "simd-v4".to_string());
        binaries.insert("v5.0.0".to_string(), "simd-v5".to_string());

        ClusterConfig {
            chain_id: "ibc-0".to_string(),
            current_version: "v4.0.0".to_string(),
            start_args: Vec::new(),
            keyring_backend: "test".to_string(),
            fees: "1200stake".to_string(),
            deposit: "10000000stake".to_string(),
            proposal_attempts: 10,
            binaries,
            nodes: vec![NodeConfig {
                moniker: "validator-0".to_string(),
                home_path: "data/ibc-0/validator-0".to_string(),
                rpc_port: 26657,
                validator_key: "validator".to_string(),
            }],
        }
    }

    #[test]
    fn swap_selects_binary_of_target_version() {
        let cluster = ProcessCluster::new(cluster_config()).unwrap();
        assert_eq!(cluster.command_path().unwrap(), "simd-v4");

        cluster.swap_version("v5.0.0").unwrap();

        assert_eq!(cluster.current_version().unwrap(), "v5.0.0");
        assert_eq!(cluster.command_path().unwrap(), "simd-v5");
    }

    #[test]
    fn swap_to_unknown_version_fails() {
        let cluster = ProcessCluster::new(cluster_config()).unwrap();

        assert!(cluster.swap_version("v6.0.0").is_err());
        assert_eq!(cluster.current_version().unwrap(), "v4.0.0");
    }

    #[test]
    fn stopping_a_stopped_cluster_fails() {
        let cluster = ProcessCluster::new(cluster_config()).unwrap();

        assert!(!cluster.is_running().unwrap());
        assert!(cluster.stop_all_nodes().is_err());
    }

    #[test]
    fn reject_cluster_without_nodes_or_binary() {
        let mut config = cluster_config();
        config.nodes.clear();
        assert!(ProcessCluster::new(config).is_err());

        let mut config = cluster_config();
        config.current_version = "v3.0.0".to_string();
        assert!(ProcessCluster::new(config).is_err());
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::fs;
        use std::path::{Path, PathBuf};
        use std::sync::OnceLock;
        use test_log::test;

        /**
           A stand-in for a chain binary that ignores its arguments and
           keeps running until killed.

           Written once, before any test spawns it, so that no child
           inherits an open handle to the file while it is being written.
        */
        fn node_binary() -> &'static Path {
            static BINARY: OnceLock<PathBuf> = OnceLock::new();

            BINARY.get_or_init(|| {
                use std::os::unix::fs::PermissionsExt;

                let dir = test_dir("bin");
                let path = dir.join("simd");

                fs::write(&path, "#!/bin/sh\nexec sleep 60\n").unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

                path
            })
        }

        fn test_dir(name: &str) -> PathBuf {
            let dir = std::env::temp_dir().join(format!(
                "ibc-chain-upgrade-{}-{}",
                std::process::id(),
                name
            ));

            fs::create_dir_all(&dir).unwrap();
            dir
        }

        fn node(moniker: &str, home: &Path, rpc_port: u16) -> NodeConfig {
            NodeConfig {
                moniker: moniker.to_string(),
                home_path: home.display().to_string(),
                rpc_port,
                validator_key: moniker.to_string(),
            }
        }

        fn process_cluster(name: &str, node_homes: &[PathBuf]) -> ProcessCluster {
            let binary = node_binary().display().to_string();

            let mut config = cluster_config();
            config.binaries.insert("v4.0.0".to_string(), binary.clone());
            config.binaries.insert("v5.0.0".to_string(), binary);
            config.start_args = vec!["--log_level".to_string(), "info".to_string()];
            config.nodes = node_homes
                .iter()
                .enumerate()
                .map(|(i, home)| node(&format!("{name}-{i}"), home, 26657 + i as u16))
                .collect();

            ProcessCluster::new(config).unwrap()
        }

        #[test]
        fn start_and_stop_nodes() {
            let homes = vec![test_dir("lifecycle-0"), test_dir("lifecycle-1")];
            let cluster = process_cluster("lifecycle", &homes);

            cluster.start_all_nodes().unwrap();
            assert!(cluster.is_running().unwrap());
            assert!(homes[0].join("stdout.log").exists());

            cluster.stop_all_nodes().unwrap();
            assert!(!cluster.is_running().unwrap());

            // Nodes are no longer running, so stopping them again fails.
            assert!(cluster.stop_all_nodes().is_err());
        }

        #[test]
        fn swap_refused_while_nodes_run() {
            let homes = vec![test_dir("swap-0")];
            let cluster = process_cluster("swap", &homes);

            cluster.start_all_nodes().unwrap();

            assert!(cluster.swap_version("v5.0.0").is_err());
            assert_eq!(cluster.current_version().unwrap(), "v4.0.0");

            cluster.stop_all_nodes().unwrap();
            cluster.swap_version("v5.0.0").unwrap();
            assert_eq!(cluster.current_version().unwrap(), "v5.0.0");
        }

        #[test]
        fn failed_start_stops_started_nodes() {
            let missing_home = std::env::temp_dir()
                .join(format!("ibc-chain-upgrade-{}-missing", std::process::id()))
                .join("validator-1");

            let homes = vec![test_dir("rollback-0"), missing_home];
            let cluster = process_cluster("rollback", &homes);

            assert!(cluster.start_all_nodes().is_err());

            assert!(!cluster.nodes[0].is_running().unwrap());
            assert!(!cluster.nodes[1].is_running().unwrap());

            // The first node was stopped by the rollback, not left behind.
            assert!(cluster.stop_all_nodes().is_err());
        }

        #[test]
        fn missing_binary_fails_start() {
            let homes = vec![test_dir("missing-bin-0"), test_dir("missing-bin-1")];

            let mut cluster = process_cluster("missing-bin", &homes);
            cluster.config.binaries.insert(
                "v5.0.0".to_string(),
                "/nonexistent/simd-v5".to_string(),
            );

            cluster.swap_version("v5.0.0").unwrap();

            assert!(cluster.start_all_nodes().is_err());
            assert!(!cluster.nodes[0].is_running().unwrap());
        }
    }
}
