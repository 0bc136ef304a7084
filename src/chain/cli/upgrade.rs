/*!
   Methods for submitting, voting on and querying software upgrade proposals.
*/

use core::fmt::{self, Display};
use core::str::FromStr;
use eyre::eyre;
use serde_json::Value;
use tracing::warn;

use crate::chain::exec::simple_exec;
use crate::error::{handle_generic_error, Error};
use crate::types::plan::SoftwareUpgradeProposal;

/**
   Arguments shared by every governance command sent to a node.
*/
pub struct GovCommand<'a> {
    pub chain_id: &'a str,
    pub command_path: &'a str,
    pub home_path: &'a str,
    pub rpc_listen_address: String,
    pub keyring_backend: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStatus {
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    Failed,
}

impl ProposalStatus {
    pub fn is_concluded(&self) -> bool {
        !matches!(
            self,
            ProposalStatus::DepositPeriod | ProposalStatus::VotingPeriod
        )
    }
}

impl FromStr for ProposalStatus {
    type Err = Error;

    fn from_str(status: &str) -> Result<Self, Error> {
        match status {
            "PROPOSAL_STATUS_DEPOSIT_PERIOD" => Ok(ProposalStatus::DepositPeriod),
            "PROPOSAL_STATUS_VOTING_PERIOD" => Ok(ProposalStatus::VotingPeriod),
            "PROPOSAL_STATUS_PASSED" => Ok(ProposalStatus::Passed),
            "PROPOSAL_STATUS_REJECTED" => Ok(ProposalStatus::Rejected),
            "PROPOSAL_STATUS_FAILED" => Ok(ProposalStatus::Failed),
            _ => Err(Error::generic(eyre!("unknown proposal status `{status}`"))),
        }
    }
}

impl Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ProposalStatus::DepositPeriod => "PROPOSAL_STATUS_DEPOSIT_PERIOD",
            ProposalStatus::VotingPeriod => "PROPOSAL_STATUS_VOTING_PERIOD",
            ProposalStatus::Passed => "PROPOSAL_STATUS_PASSED",
            ProposalStatus::Rejected => "PROPOSAL_STATUS_REJECTED",
            ProposalStatus::Failed => "PROPOSAL_STATUS_FAILED",
        };

        write!(f, "{status}")
    }
}

pub fn submit_upgrade_proposal(
    cmd: &GovCommand<'_>,
    signer: &str,
    proposal: &SoftwareUpgradeProposal,
    deposit: &str,
    fees: &str,
) -> Result<(), Error> {
    let upgrade_height = proposal.plan.height.to_string();

    let output = simple_exec(
        cmd.chain_id,
        cmd.command_path,
        &[
            "--node",
            &cmd.rpc_listen_address,
            "tx",
            "gov",
            "submit-proposal",
            "software-upgrade",
            &proposal.plan.name,
            "--upgrade-height",
            &upgrade_height,
            "--upgrade-info",
            &proposal.plan.info,
            "--title",
            &proposal.title,
            "--description",
            &proposal.description,
            "--deposit",
            deposit,
            "--chain-id",
            cmd.chain_id,
            "--home",
            cmd.home_path,
            "--keyring-backend",
            cmd.keyring_backend,
            "--from",
            signer,
            "--fees",
            fees,
            "--output",
            "json",
            "--yes",
        ],
    )?;

    check_tx_code(&output.stdout, "submit software upgrade proposal")
}

pub fn vote_proposal(
    cmd: &GovCommand<'_>,
    voter: &str,
    proposal_id: &str,
    fees: &str,
) -> Result<(), Error> {
    let output = simple_exec(
        cmd.chain_id,
        cmd.command_path,
        &[
            "--node",
            &cmd.rpc_listen_address,
            "tx",
            "gov",
            "vote",
            proposal_id,
            "yes",
            "--chain-id",
            cmd.chain_id,
            "--home",
            cmd.home_path,
            "--keyring-backend",
            cmd.keyring_backend,
            "--from",
            voter,
            "--fees",
            fees,
            "--output",
            "json",
            "--yes",
        ],
    )?;

    check_tx_code(&output.stdout, "vote on proposal")
}

/**
   Find the ID of the most recent proposal carrying an upgrade plan with
   the given name.
*/
pub fn query_upgrade_proposal_id(cmd: &GovCommand<'_>, plan_name: &str) -> Result<String, Error> {
    let output = simple_exec(
        cmd.chain_id,
        cmd.command_path,
        &[
            "--node",
            &cmd.rpc_listen_address,
            "query",
            "gov",
            "proposals",
            "--output",
            "json",
        ],
    )?;

    find_upgrade_proposal_id(&output.stdout, plan_name)
}

pub fn query_proposal_status(
    cmd: &GovCommand<'_>,
    proposal_id: &str,
) -> Result<ProposalStatus, Error> {
    let output = simple_exec(
        cmd.chain_id,
        cmd.command_path,
        &[
            "--node",
            &cmd.rpc_listen_address,
            "query",
            "gov",
            "proposal",
            proposal_id,
            "--output",
            "json",
        ],
    )?;

    parse_proposal_status(&output.stdout)
}

fn check_tx_code(stdout: &str, desc: &str) -> Result<(), Error> {
    let json_output: Value = serde_json::from_str(stdout).map_err(handle_generic_error)?;

    let code = json_output
        .get("code")
        .ok_or_else(|| eyre!("expected `code` field in output"))?
        .as_u64()
        .ok_or_else(|| eyre!("expected `code` to be a u64"))?;

    if code != 0 {
        let raw_log = json_output
            .get("raw_log")
            .and_then(Value::as_str)
            .unwrap_or_default();

        warn!("failed to {desc} due to `{raw_log}`");

        return Err(Error::generic(eyre!(
            "transaction to {desc} failed with code {code}: {raw_log}"
        )));
    }

    Ok(())
}

pub fn find_upgrade_proposal_id(proposals: &str, plan_name: &str) -> Result<String, Error> {
    let json: Value = serde_json::from_str(proposals).map_err(handle_generic_error)?;

    let proposals = json
        .get("proposals")
        .and_then(Value::as_array)
        .ok_or_else(|| eyre!("expected `proposals` array in output"))?;

    proposals
        .iter()
        .rev()
        .find(|proposal| upgrade_plan_name(proposal) == Some(plan_name))
        .and_then(|proposal| proposal.get("proposal_id").or_else(|| proposal.get("id")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::generic(eyre!(
                "no software upgrade proposal found for plan `{plan_name}`"
            ))
        })
}

// Legacy proposals keep the plan under `content`, gov v1 under `messages[*]`.
fn upgrade_plan_name(proposal: &Value) -> Option<&str> {
    let from_content = proposal.get("content").and_then(|c| c.get("plan"));

    let from_messages = || {
        proposal
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.iter().find_map(|m| m.get("plan")))
    };

    from_content
        .or_else(from_messages)
        .and_then(|plan| plan.get("name"))
        .and_then(Value::as_str)
}

pub fn parse_proposal_status(proposal: &str) -> Result<ProposalStatus, Error> {
    let json: Value = serde_json::from_str(proposal).map_err(handle_generic_error)?;

    // Newer SDKs wrap the proposal in a `proposal` object.
    let proposal = json.get("proposal").unwrap_or(&json);

    proposal
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| eyre!("expected `status` field in proposal"))?
        .parse()
}
