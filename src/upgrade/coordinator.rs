/*!
   The upgrade procedure: pass an upgrade plan through governance, wait for
   the chain to halt, swap the node software and check that the chain
   resumes producing blocks.
*/

use tracing::{error, info};

use crate::chain::handle::ClusterHandle;
use crate::error::{handle_generic_error, Error, UpgradeError, WaitError, WaitErrorDetail};
use crate::types::config::UpgradeConfig;
use crate::types::plan::SoftwareUpgradeProposal;
use crate::types::wallet::Wallet;
use crate::upgrade::state::{UpgradePhase, UpgradeState};
use crate::upgrade::suite::ChainUpgradeSuite;
use crate::util::wait::{BlockWaiter, WaitOutcome};

/**
   Summary of a successful upgrade run.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReport {
    pub plan_name: String,
    pub halt_height: u64,

    /// Chain height before the proposal was submitted
    pub initial_height: u64,

    pub halt_wait: WaitOutcome,
    pub resumption_wait: WaitOutcome,
    pub final_height: u64,
}

/**
   Drives a cluster through one upgrade.

   A run is strictly sequential and never retries: every failure is
   terminal and returned to the caller, who may start a new run. Nothing
   is rolled back, so a run that failed after the nodes were stopped
   leaves them stopped.
*/
pub struct UpgradeCoordinator {
    config: UpgradeConfig,
    state: UpgradeState,
}

impl UpgradeCoordinator {
    pub fn new(config: UpgradeConfig) -> Self {
        Self {
            config,
            state: UpgradeState::Init,
        }
    }

    pub fn state(&self) -> &UpgradeState {
        &self.state
    }

    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    /**
       Upgrade `chain` to the suite's upgrade version, with the upgrade
       proposal signed by `proposer`.

       A coordinator runs once; further calls fail without touching the
       chain. Build a new coordinator to retry.
    */
    pub fn run<Chain, Suite>(
        &mut self,
        suite: &Suite,
        chain: &Chain,
        proposer: &Wallet,
    ) -> Result<UpgradeReport, UpgradeError>
    where
        Chain: ClusterHandle,
        Suite: ChainUpgradeSuite<Chain>,
    {
        if self.state.is_terminal() {
            return Err(UpgradeError::invalid_suite_params(Error::invalid_params(
                format!("coordinator already ran and is {}", self.state),
            )));
        }

        let result = self.drive(suite, chain, proposer);

        if let Err(e) = &result {
            error!(
                "upgrade of chain {} failed during {}: {}",
                chain.chain_id(),
                e.phase(),
                e
            );

            self.state = UpgradeState::Failed {
                phase: e.phase(),
                reason: e.to_string(),
            };
        }

        result
    }

    fn drive<Chain, Suite>(
        &mut self,
        suite: &Suite,
        chain: &Chain,
        proposer: &Wallet,
    ) -> Result<UpgradeReport, UpgradeError>
    where
        Chain: ClusterHandle,
        Suite: ChainUpgradeSuite<Chain>,
    {
        let params = suite.params();
        params.validate().map_err(UpgradeError::invalid_suite_params)?;

        let halt_height = params.halt_height;

        let initial_height = query_height(chain, UpgradePhase::Validation)?;
        ensure_below_halt(
            UpgradePhase::Validation,
            &params.name,
            halt_height,
            initial_height,
        )?;

        let proposal = SoftwareUpgradeProposal::new(&params);

        info!(
            "submitting upgrade plan `{}` for chain {} at halt height {} (current height {})",
            params.name,
            chain.chain_id(),
            halt_height,
            initial_height
        );

        suite
            .execute_gov_proposal(chain, proposer, proposal)
            .map_err(|e| UpgradeError::proposal(params.name.clone(), e))?;

        self.transition(UpgradeState::ProposalSubmitted);

        let height = query_height(chain, UpgradePhase::AwaitHalt)?;

        // The proposal may have taken long enough to pass that the chain
        // went past the halt height without halting.
        ensure_below_halt(UpgradePhase::AwaitHalt, &params.name, halt_height, height)?;

        let halt_blocks = halt_height - height + 1;

        self.transition(UpgradeState::AwaitingHalt {
            target_blocks: halt_blocks,
        });

        let halt_wait = BlockWaiter::for_halt(&self.config)
            .wait_for_blocks(chain, halt_blocks)
            .map_err(|e| wait_error(UpgradePhase::AwaitHalt, e))?;

        self.transition(UpgradeState::Halted);

        chain
            .stop_all_nodes()
            .map_err(|e| UpgradeError::cluster_lifecycle(UpgradePhase::StopNodes, e))?;

        chain
            .swap_version(&params.target_version)
            .map_err(|e| UpgradeError::cluster_lifecycle(UpgradePhase::SwapVersion, e))?;

        chain
            .start_all_nodes()
            .map_err(|e| UpgradeError::cluster_lifecycle(UpgradePhase::StartNodes, e))?;

        self.transition(UpgradeState::VersionSwapped);

        let resumption_blocks = self.config.resumption_blocks;

        self.transition(UpgradeState::AwaitingResumption {
            target_blocks: resumption_blocks,
        });

        let resumption_wait = BlockWaiter::for_resumption(&self.config)
            .wait_for_blocks(chain, resumption_blocks)
            .map_err(|e| wait_error(UpgradePhase::AwaitResumption, e))?;

        let final_height = query_height(chain, UpgradePhase::Verification)?;

        if final_height <= halt_height {
            return Err(UpgradeError::verification(final_height, halt_height));
        }

        self.transition(UpgradeState::Verified {
            height: final_height,
        });

        Ok(UpgradeReport {
            plan_name: params.name,
            halt_height,
            initial_height,
            halt_wait,
            resumption_wait,
            final_height,
        })
    }

    fn transition(&mut self, next: UpgradeState) {
        info!("upgrade state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/**
   Run a single upgrade with a fresh [`UpgradeCoordinator`].
*/
pub fn upgrade_chain<Chain, Suite>(
    config: &UpgradeConfig,
    suite: &Suite,
    chain: &Chain,
    proposer: &Wallet,
) -> Result<UpgradeReport, UpgradeError>
where
    Chain: ClusterHandle,
    Suite: ChainUpgradeSuite<Chain>,
{
    UpgradeCoordinator::new(config.clone()).run(suite, chain, proposer)
}

fn query_height<Chain: ClusterHandle>(
    chain: &Chain,
    phase: UpgradePhase,
) -> Result<u64, UpgradeError> {
    chain
        .query_height()
        .map_err(|e| UpgradeError::height_query(phase, e))
}

/**
   A wait that never managed to read the chain height is a height query
   failure, not a liveness timeout.
*/
fn wait_error(phase: UpgradePhase, e: WaitError) -> UpgradeError {
    let no_height = matches!(e.detail(), WaitErrorDetail::Query(_));

    if no_height {
        UpgradeError::height_query(phase, handle_generic_error(e))
    } else {
        UpgradeError::liveness_timeout(phase, e)
    }
}

fn ensure_below_halt(
    phase: UpgradePhase,
    plan: &str,
    halt_height: u64,
    height: u64,
) -> Result<(), UpgradeError> {
    if height >= halt_height {
        return Err(UpgradeError::configuration(
            phase,
            plan.to_string(),
            halt_height,
            height,
        ));
    }

    Ok(())
}
