/*!
   A [`ChainUpgradeSuite`] with a scripted governance outcome.
*/

use eyre::eyre;
use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::chain::handle::ClusterHandle;
use crate::error::Error;
use crate::types::params::UpgradeSuiteParams;
use crate::types::plan::SoftwareUpgradeProposal;
use crate::types::wallet::Wallet;
use crate::upgrade::suite::ChainUpgradeSuite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOutcome {
    Passed,
    Rejected,
    SubmissionFailed,
}

pub struct MockUpgradeSuite {
    pub params: UpgradeSuiteParams,
    pub outcome: ProposalOutcome,
    submitted: Mutex<Vec<(String, SoftwareUpgradeProposal)>>,
}

impl MockUpgradeSuite {
    pub fn new(params: UpgradeSuiteParams) -> Self {
        Self {
            params,
            outcome: ProposalOutcome::Passed,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_outcome(mut self, outcome: ProposalOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// The proposals submitted so far, with the key name of their proposer.
    pub fn submitted(&self) -> Vec<(String, SoftwareUpgradeProposal)> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<Chain: ClusterHandle> ChainUpgradeSuite<Chain> for MockUpgradeSuite {
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
        chain: &Chain,
        proposer: &Wallet,
        proposal: SoftwareUpgradeProposal,
    ) -> Result<(), Error> {
        if self.outcome == ProposalOutcome::SubmissionFailed {
            return Err(Error::generic(eyre!(
                "failed to broadcast proposal to chain {}",
                chain.chain_id()
            )));
        }

        info!(
            "proposal `{}` submitted by {} on chain {}",
            proposal.title,
            proposal_signer(proposer),
            chain.chain_id()
        );

        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((proposer.id.0.clone(), proposal));

        match self.outcome {
            ProposalOutcome::Rejected => Err(Error::proposal_rejected(
                "1".to_string(),
                "PROPOSAL_STATUS_REJECTED".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn proposal_signer(proposer: &Wallet) -> String {
    format!("{} ({})", proposer.id, proposer.address)
}
