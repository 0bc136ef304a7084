/*!
   Drive a software upgrade proposal to passage on a [`ProcessCluster`]
   through the chain binary's command line.
*/

use core::time::Duration;
use tracing::info;

use crate::chain::cli::upgrade::{
    query_proposal_status, query_upgrade_proposal_id, submit_upgrade_proposal, vote_proposal,
    GovCommand, ProposalStatus,
};
use crate::chain::cluster::{ClusterNode, ProcessCluster};
use crate::error::Error;
use crate::types::params::UpgradeSuiteParams;
use crate::types::plan::SoftwareUpgradeProposal;
use crate::types::wallet::Wallet;
use crate::upgrade::suite::ChainUpgradeSuite;
use crate::util::retry::assert_eventually_succeed;

const PROPOSAL_POLL_INTERVAL: Duration = Duration::from_secs(1);

/**
   An upgrade suite for a [`ProcessCluster`] that passes the upgrade
   proposal with [`execute_gov_proposal`].
*/
#[derive(Debug, Clone)]
pub struct CliGovernance {
    pub params: UpgradeSuiteParams,
}

impl CliGovernance {
    pub fn new(params: UpgradeSuiteParams) -> Self {
        Self { params }
    }
}

impl ChainUpgradeSuite<ProcessCluster> for CliGovernance {
    fn name(&self) -> &str {
        &self.params.name
    }

    fn halt_height(&self) -> u64 {
        self.params.halt_height
    }

    fn current_version(&self) -> &str {
        &self.params.current_version
    }

    fn upgrade_version(&self) -> &str {
        &self.params.target_version
    }

    fn execute_gov_proposal(
        &self,
        chain: &ProcessCluster,
        proposer: &Wallet,
        proposal: SoftwareUpgradeProposal,
    ) -> Result<(), Error> {
        execute_gov_proposal(chain, proposer, proposal)
    }
}

/**
   Submit the proposal signed by `proposer`, vote yes with the validator key
   of every node, and block until the proposal has passed.

   A proposal that concludes with any status other than passed is reported
   as [`Error::proposal_rejected`]. The proposer must hold enough funds to
   pay the configured deposit.
*/
pub fn execute_gov_proposal(
    cluster: &ProcessCluster,
    proposer: &Wallet,
    proposal: SoftwareUpgradeProposal,
) -> Result<(), Error> {
    let command_path = cluster.command_path()?;
    let config = &cluster.config;

    let first_node = cluster
        .nodes
        .first()
        .ok_or_else(|| Error::no_reachable_node(config.chain_id.clone()))?;

    let cmd = gov_command(cluster, first_node, &command_path);

    submit_upgrade_proposal(
        &cmd,
        &proposer.id.0,
        &proposal,
        &config.deposit,
        &config.fees,
    )?;

    let proposal_id = assert_eventually_succeed(
        "find submitted upgrade proposal",
        config.proposal_attempts,
        PROPOSAL_POLL_INTERVAL,
        || query_upgrade_proposal_id(&cmd, &proposal.plan.name),
    )?;

    info!(
        "submitted upgrade proposal {} for plan `{}` at height {}",
        proposal_id, proposal.plan.name, proposal.plan.height
    );

    for node in cluster.nodes.iter() {
        let cmd = gov_command(cluster, node, &command_path);
        vote_proposal(&cmd, &node.config.validator_key, &proposal_id, &config.fees)?;
    }

    let status = assert_eventually_succeed(
        "wait for upgrade proposal to conclude",
        config.proposal_attempts,
        PROPOSAL_POLL_INTERVAL,
        || {
            let status = query_proposal_status(&cmd, &proposal_id)?;

            if status.is_concluded() {
                Ok(status)
            } else {
                Err(Error::generic(eyre::eyre!(
                    "proposal {proposal_id} is still in {status}"
                )))
            }
        },
    )?;

    if status != ProposalStatus::Passed {
        return Err(Error::proposal_rejected(proposal_id, status.to_string()));
    }

    info!("upgrade proposal {} passed", proposal_id);

    Ok(())
}

fn gov_command<'a>(
    cluster: &'a ProcessCluster,
    node: &'a ClusterNode,
    command_path: &'a str,
) -> GovCommand<'a> {
    GovCommand {
        chain_id: &cluster.config.chain_id,
        command_path,
        home_path: &node.config.home_path,
        rpc_listen_address: node.config.rpc_listen_address(),
        keyring_backend: &cluster.config.keyring_backend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_reports_its_params() {
        let params = UpgradeSuiteParams::new("v5", 100, "v4.0.0", "v5.0.0");
        let suite = CliGovernance::new(params.clone());

        let from_suite = <CliGovernance as ChainUpgradeSuite<ProcessCluster>>::params(&suite);

        assert_eq!(from_suite, params);
    }
}
