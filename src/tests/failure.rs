//! Upgrade runs where the chain does not behave as the upgrade plan expects.

use core::time::Duration;
use test_log::test;

use super::{fast_config, proposer, upgrade_params};
use crate::error::{Error, UpgradeError, UpgradeErrorDetail, WaitErrorDetail};
use crate::framework::base::{run_test, PrimitiveTest};
use crate::mock::cluster::{ClusterCall, MockCluster};
use crate::mock::suite::MockUpgradeSuite;
use crate::upgrade::coordinator::UpgradeCoordinator;
use crate::upgrade::state::{UpgradePhase, UpgradeState};
use crate::util::assert::{assert_eq, assert_upgrade_failed_in};

const HALTING: [u64; 4] = [50, 50, 50, 101];

#[test]
fn test_chain_does_not_halt() -> Result<(), Error> {
    run_test(&HaltTimeoutTest)
}

#[test]
fn test_chain_does_not_resume() -> Result<(), Error> {
    run_test(&ResumptionTimeoutTest)
}

#[test]
fn test_chain_unreachable_after_restart() -> Result<(), Error> {
    run_test(&UnreachableAfterRestartTest)
}

#[test]
fn test_height_not_above_halt_height() -> Result<(), Error> {
    run_test(&VerificationFailureTest)
}

pub struct HaltTimeoutTest;

impl PrimitiveTest for HaltTimeoutTest {
    fn run(&self) -> Result<(), Error> {
        let suite = MockUpgradeSuite::new(upgrade_params());

        // Blocks stop at 80, short of the halt height.
        let cluster = MockCluster::with_heights([50, 50, 50, 60, 70, 80]);

        let mut config = fast_config();
        config.halt_timeout = Duration::from_millis(50);

        let mut coordinator = UpgradeCoordinator::new(config);
        let result = coordinator.run(&suite, &cluster, &proposer());

        let e = assert_upgrade_failed_in(result, UpgradePhase::AwaitHalt)?;

        assert_message(&e, "chain did not halt at halt height")?;

        match e.detail() {
            UpgradeErrorDetail::LivenessTimeout(e) => match &e.source {
                WaitErrorDetail::Timeout(e) => {
                    assert_eq("target blocks", &e.target, &51)?;
                    assert_eq("observed blocks", &e.observed, &30)?;
                }
                e => return Err(Error::assertion(format!("unexpected wait error {e:?}"))),
            },
            e => return Err(Error::assertion(format!("unexpected error {e:?}"))),
        }

        assert_eq("lifecycle calls", &cluster.calls(), &Vec::new())?;
        assert_eq("cluster running", &cluster.is_running(), &true)?;

        match coordinator.state() {
            UpgradeState::Failed { phase, .. } => {
                assert_eq("failed phase", phase, &UpgradePhase::AwaitHalt)
            }
            state => Err(Error::assertion(format!("unexpected state {state}"))),
        }
    }
}

pub struct ResumptionTimeoutTest;

impl PrimitiveTest for ResumptionTimeoutTest {
    fn run(&self) -> Result<(), Error> {
        let suite = MockUpgradeSuite::new(upgrade_params());

        // The upgraded nodes come back but never produce a block.
        let cluster = MockCluster::with_heights([50, 50, 50, 101]);

        let mut config = fast_config();
        config.resumption_timeout = Duration::from_millis(50);

        let mut coordinator = UpgradeCoordinator::new(config);
        let result = coordinator.run(&suite, &cluster, &proposer());

        let e = assert_upgrade_failed_in(result, UpgradePhase::AwaitResumption)?;

        assert_message(&e, "chain did not produce blocks after upgrade")?;

        assert_eq(
            "lifecycle calls",
            &cluster.calls(),
            &vec![
                ClusterCall::StopAllNodes,
                ClusterCall::SwapVersion("v5.0.0".to_string()),
                ClusterCall::StartAllNodes,
            ],
        )?;

        Ok(())
    }
}

pub struct UnreachableAfterRestartTest;

impl PrimitiveTest for UnreachableAfterRestartTest {
    fn run(&self) -> Result<(), Error> {
        let suite = MockUpgradeSuite::new(upgrade_params());
        let cluster = MockCluster::with_heights(HALTING).booting(usize::MAX);

        let mut config = fast_config();
        config.resumption_timeout = Duration::from_millis(30);

        let mut coordinator = UpgradeCoordinator::new(config);
        let result = coordinator.run(&suite, &cluster, &proposer());

        let e = assert_upgrade_failed_in(result, UpgradePhase::AwaitResumption)?;

        if !matches!(e.detail(), UpgradeErrorDetail::HeightQuery(_)) {
            return Err(Error::assertion(format!(
                "expect height query error, got {e}"
            )));
        }

        assert_eq("cluster running", &cluster.is_running(), &true)?;

        Ok(())
    }
}

pub struct VerificationFailureTest;

impl PrimitiveTest for VerificationFailureTest {
    fn run(&self) -> Result<(), Error> {
        let suite = MockUpgradeSuite::new(upgrade_params());

        // The restarted nodes report heights from before the halt.
        let cluster = MockCluster::with_heights([50, 50, 50, 101, 90, 100, 100]);

        let mut coordinator = UpgradeCoordinator::new(fast_config());
        let result = coordinator.run(&suite, &cluster, &proposer());

        let e = assert_upgrade_failed_in(result, UpgradePhase::Verification)?;

        match e.detail() {
            UpgradeErrorDetail::Verification(e) => {
                assert_eq("final height", &e.height, &100)?;
                assert_eq("halt height", &e.halt_height, &100)?;
            }
            e => return Err(Error::assertion(format!("unexpected error {e:?}"))),
        }

        assert_eq("swapped version", &cluster.version(), &"v5.0.0".to_string())?;

        Ok(())
    }
}

fn assert_message(e: &UpgradeError, message: &str) -> Result<(), Error> {
    if e.to_string().contains(message) {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "expect error `{e}` to mention `{message}`"
        )))
    }
}
