//! Error types used by the upgrade coordinator and its collaborators.

use core::time::Duration;
use eyre::Report;
use flex_error::{define_error, TraceError};
use std::io::{Error as IoError, ErrorKind};

use crate::upgrade::state::UpgradePhase;

define_error! {
    Error {
        Generic
            [ TraceError<Report> ]
            | _ | { "generic error" },

        Assertion
            { message: String }
            | e | { format_args!("assertion failure: {}", e.message) },

        Io
            [ TraceError<IoError> ]
            | _ | { "io error"},

        CommandNotFound
            { command: String }
            [ TraceError<IoError> ]
            | e | { format_args!("failed to execute command: {}. make sure it is available in $PATH", e.command) },

        ConfigDecode
            [ TraceError<toml::de::Error> ]
            | _ | { "invalid configuration" },

        ConfigEncode
            [ TraceError<toml::ser::Error> ]
            | _ | { "failed to encode configuration" },

        InvalidParams
            { reason: String }
            | e | { format_args!("invalid upgrade parameters: {}", e.reason) },

        UnknownVersion
            { version: String }
            | e | { format_args!("no binary is configured for chain version {}", e.version) },

        NodeNotRunning
            { moniker: String }
            | e | { format_args!("node {} is not running", e.moniker) },

        NodeLifecycle
            {
                action: String,
                monikers: String,
            }
            | e | { format_args!("failed to {} node(s): {}", e.action, e.monikers) },

        NoReachableNode
            { chain_id: String }
            | e | { format_args!("none of the nodes of chain {} answered the status query", e.chain_id) },

        ProposalRejected
            {
                proposal_id: String,
                status: String,
            }
            | e | {
                format_args!("governance proposal {} concluded with status {}",
                    e.proposal_id, e.status)
            },

        HookFailed
            {
                index: usize,
                hook: String,
            }
            [ TraceError<Report> ]
            | e | { format_args!("transfer hook #{} ({}) failed", e.index, e.hook) },

        Retry
            {
                task_name: String,
                attempts: u16,
            }
            | e | {
                format_args!("expected task to eventually succeed, but failed after {} attempts: {}",
                    e.attempts, e.task_name)
            },
    }
}

define_error! {
    WaitError {
        Timeout
            {
                target: u64,
                observed: u64,
                elapsed: Duration,
            }
            | e | {
                format_args!("timed out after {:?} waiting for {} blocks, observed {}",
                    e.elapsed, e.target, e.observed)
            },

        Query
            [ Error ]
            | _ | { "failed to query the chain height before the deadline" },
    }
}

define_error! {
    UpgradeError {
        InvalidSuiteParams
            [ Error ]
            | _ | { "upgrade suite parameters were rejected" },

        Configuration
            {
                phase: UpgradePhase,
                plan: String,
                halt_height: u64,
                current_height: u64,
            }
            | e | {
                format_args!("halt height {} of plan `{}` is not above the current chain height {}",
                    e.halt_height, e.plan, e.current_height)
            },

        Proposal
            { plan: String }
            [ Error ]
            | e | { format_args!("software upgrade proposal for plan `{}` did not pass", e.plan) },

        HeightQuery
            { phase: UpgradePhase }
            [ Error ]
            | e | { format_args!("error fetching height during {}", e.phase) },

        ClusterLifecycle
            { phase: UpgradePhase }
            [ Error ]
            | e | { format_args!("cluster operation failed during {}", e.phase) },

        LivenessTimeout
            { phase: UpgradePhase }
            [ WaitError ]
            | e | {
                match e.phase {
                    UpgradePhase::AwaitHalt => "chain did not halt at halt height",
                    _ => "chain did not produce blocks after upgrade",
                }
            },

        Verification
            {
                height: u64,
                halt_height: u64,
            }
            | e | {
                format_args!("height did not increment enough after upgrade: {} is not above halt height {}",
                    e.height, e.halt_height)
            },
    }
}

impl UpgradeError {
    /// The phase of the upgrade run in which this error was raised.
    pub fn phase(&self) -> UpgradePhase {
        match self.detail() {
            UpgradeErrorDetail::InvalidSuiteParams(_) => UpgradePhase::Validation,
            UpgradeErrorDetail::Configuration(e) => e.phase,
            UpgradeErrorDetail::Proposal(_) => UpgradePhase::Submission,
            UpgradeErrorDetail::HeightQuery(e) => e.phase,
            UpgradeErrorDetail::ClusterLifecycle(e) => e.phase,
            UpgradeErrorDetail::LivenessTimeout(e) => e.phase,
            UpgradeErrorDetail::Verification(_) => UpgradePhase::Verification,
        }
    }
}

impl From<Report> for Error {
    fn from(e: Report) -> Self {
        Error::generic(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::io(e)
    }
}

pub fn handle_generic_error(e: impl Into<Report>) -> Error {
    Error::generic(e.into())
}

pub fn handle_exec_error(command: &str) -> impl FnOnce(IoError) -> Error + '_ {
    |e| match e.kind() {
        ErrorKind::NotFound => Error::command_not_found(command.to_string(), e),
        _ => Error::io(e),
    }
}
