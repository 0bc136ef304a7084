/*!
   Static parameters of an upgrade run.
*/

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/**
   The halt height used when a suite does not pick its own.
*/
pub const DEFAULT_HALT_HEIGHT: u64 = 100;

/**
   The parameters a [`ChainUpgradeSuite`](crate::upgrade::suite::ChainUpgradeSuite)
   supplies for a single upgrade run.

   The halt height must be above the chain height at the time the proposal
   passes, otherwise the chain never halts for the plan. The coordinator
   checks this against the live chain; [`validate`](Self::validate) only
   checks what can be known without one.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeSuiteParams {
    pub name: String,
    pub halt_height: u64,
    pub current_version: String,
    pub target_version: String,
}

impl UpgradeSuiteParams {
    pub fn new(
        name: impl Into<String>,
        halt_height: u64,
        current_version: impl Into<String>,
        target_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            halt_height,
            current_version: current_version.into(),
            target_version: target_version.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_params("upgrade name is empty".to_string()));
        }

        if self.halt_height == 0 {
            return Err(Error::invalid_params("halt height is zero".to_string()));
        }

        if self.current_version.is_empty() || self.target_version.is_empty() {
            return Err(Error::invalid_params(
                "current and target versions must both be set".to_string(),
            ));
        }

        if self.current_version == self.target_version {
            return Err(Error::invalid_params(format!(
                "target version {} is the version already running",
                self.target_version
            )));
        }

        // Image tags are not required to be semver; only compare when both are.
        if let (Some(current), Some(target)) = (
            parse_version(&self.current_version),
            parse_version(&self.target_version),
        ) {
            if target <= current {
                return Err(Error::invalid_params(format!(
                    "target version {} is not newer than current version {}",
                    self.target_version, self.current_version
                )));
            }
        }

        Ok(())
    }
}

fn parse_version(tag: &str) -> Option<Version> {
    Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_newer_semver_target() {
        let params = UpgradeSuiteParams::new("normal upgrade", 100, "v4.0.0", "v5.0.0");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn accepts_non_semver_tags() {
        let params = UpgradeSuiteParams::new("normal upgrade", 100, "main", "pr-1234");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_downgrade() {
        let params = UpgradeSuiteParams::new("normal upgrade", 100, "v5.0.0", "v4.1.0");
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_same_version() {
        let params = UpgradeSuiteParams::new("normal upgrade", 100, "v5.0.0", "v5.0.0");
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(UpgradeSuiteParams::new("", 100, "v4.0.0", "v5.0.0")
            .validate()
            .is_err());
        assert!(UpgradeSuiteParams::new("plan", 0, "v4.0.0", "v5.0.0")
            .validate()
            .is_err());
        assert!(UpgradeSuiteParams::new("plan", 100, "", "v5.0.0")
            .validate()
            .is_err());
    }
}
