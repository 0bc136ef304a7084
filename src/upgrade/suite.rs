/*!
   The capability interface that parameterizes an upgrade run.
*/

use crate::chain::handle::ClusterHandle;
use crate::error::Error;
use crate::types::params::UpgradeSuiteParams;
use crate::types::plan::SoftwareUpgradeProposal;
use crate::types::wallet::Wallet;

/**
   An upgrade scenario, from one chain version to another.

   The same [`UpgradeCoordinator`](crate::upgrade::coordinator::UpgradeCoordinator)
   drives every scenario; a scenario only supplies its parameters and the
   way governance proposals are passed on its chain.
*/
pub trait ChainUpgradeSuite<Chain: ClusterHandle> {
    /// The upgrade plan name.
    fn name(&self) -> &str;

    /// The height at which the chain halts for the upgrade.
    fn halt_height(&self) -> u64;

    /// The version the chain runs before the upgrade.
    fn current_version(&self) -> &str;

    /// The version the chain runs after the upgrade.
    fn upgrade_version(&self) -> &str;

    /**
       Submit the proposal signed by `proposer` and have every validator
       vote yes on it. Returns once the proposal has passed; a proposal that
       fails to pass, for any reason, is an error.
    */
    fn execute_gov_proposal(
        &self,
        chain: &Chain,
        proposer: &Wallet,
        proposal: SoftwareUpgradeProposal,
    ) -> Result<(), Error>;

    fn params(&self) -> UpgradeSuiteParams {
        UpgradeSuiteParams::new(
            self.name(),
            self.halt_height(),
            self.current_version(),
            self.upgrade_version(),
        )
    }
}
