/*!
   The software upgrade plan and the governance proposal that carries it.
*/

use serde::{Deserialize, Serialize};

use crate::types::params::UpgradeSuiteParams;

/**
   A software upgrade plan, as recorded by the chain's upgrade module once
   the governance proposal carrying it has passed.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePlan {
    /**
       The plan name. Upgraded binaries register their migration handler
       under this name.
    */
    pub name: String,

    /**
       The halt height. Nodes running the old binary stop producing
       blocks once they reach it.
    */
    pub height: u64,

    pub info: String,
}

impl UpgradePlan {
    pub fn from_params(params: &UpgradeSuiteParams) -> Self {
        Self {
            name: params.name.clone(),
            height: params.halt_height,
            info: format!(
                "upgrade version test from {} to {}",
                params.current_version, params.target_version
            ),
        }
    }
}

/**
   The governance content submitted to pass an [`UpgradePlan`].

   It is handed by value to the governance collaborator: once submitted, the
   chain itself is the source of truth for the plan.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareUpgradeProposal {
    pub title: String,
    pub description: String,
    pub plan: UpgradePlan,
}

impl SoftwareUpgradeProposal {
    pub fn new(params: &UpgradeSuiteParams) -> Self {
        Self {
            title: format!(
                "upgrade from {} to {}",
                params.current_version, params.target_version
            ),
            description: "chain software upgrade".to_string(),
            plan: UpgradePlan::from_params(params),
        }
    }
}
