/*!
   States and phases of a single upgrade run.
*/

use core::fmt::{self, Display};

/**
   The step of an upgrade run an operation, or an error, belongs to.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradePhase {
    Validation,
    Submission,
    AwaitHalt,
    StopNodes,
    SwapVersion,
    StartNodes,
    AwaitResumption,
    Verification,
}

impl Display for UpgradePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpgradePhase::Validation => "validation",
            UpgradePhase::Submission => "proposal submission",
            UpgradePhase::AwaitHalt => "halt wait",
            UpgradePhase::StopNodes => "node stop",
            UpgradePhase::SwapVersion => "version swap",
            UpgradePhase::StartNodes => "node start",
            UpgradePhase::AwaitResumption => "resumption wait",
            UpgradePhase::Verification => "verification",
        };

        write!(f, "{name}")
    }
}

/**
   The state machine driven by
   [`UpgradeCoordinator`](crate::upgrade::coordinator::UpgradeCoordinator).

   Runs only move forward. A failure in any state moves the run to
   [`UpgradeState::Failed`], which is terminal just like
   [`UpgradeState::Verified`].
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeState {
    Init,
    ProposalSubmitted,
    AwaitingHalt { target_blocks: u64 },
    Halted,
    VersionSwapped,
    AwaitingResumption { target_blocks: u64 },
    Verified { height: u64 },
    Failed { phase: UpgradePhase, reason: String },
}

impl UpgradeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpgradeState::Verified { .. } | UpgradeState::Failed { .. })
    }
}

impl Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeState::Init => write!(f, "init"),
            UpgradeState::ProposalSubmitted => write!(f, "proposal submitted"),
            UpgradeState::AwaitingHalt { target_blocks } => {
                write!(f, "awaiting halt ({target_blocks} blocks)")
            }
            UpgradeState::Halted => write!(f, "halted"),
            UpgradeState::VersionSwapped => write!(f, "version swapped"),
            UpgradeState::AwaitingResumption { target_blocks } => {
                write!(f, "awaiting resumption ({target_blocks} blocks)")
            }
            UpgradeState::Verified { height } => write!(f, "verified at height {height}"),
            UpgradeState::Failed { phase, reason } => {
                write!(f, "failed during {phase}: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_verified_and_failed_are_terminal() {
        assert!(!UpgradeState::Init.is_terminal());
        assert!(!UpgradeState::AwaitingHalt { target_blocks: 51 }.is_terminal());
        assert!(UpgradeState::Verified { height: 111 }.is_terminal());
        assert!(UpgradeState::Failed {
            phase: UpgradePhase::StopNodes,
            reason: "failed to stop node(s)".to_string(),
        }
        .is_terminal());
    }
}
