/*!
   Assertions returning [`Error::assertion`] instead of panicking, for use
   inside test cases that return `Result`.
*/

use core::fmt::Debug;

use crate::chain::handle::ChainHeight;
use crate::error::{Error, UpgradeError};
use crate::upgrade::state::UpgradePhase;

pub fn assert_eq<T: Eq + Debug>(message: &str, left: &T, right: &T) -> Result<(), Error> {
    if left == right {
        Ok(())
    } else {
        Err(Error::assertion(format!(
            "expect left ({left:?}) to be equal to right ({right:?}): {message}"
        )))
    }
}

/**
   Assert that the chain currently reports a height strictly above
   `height`, returning the reported height.
*/
pub fn assert_height_above<Chain: ChainHeight + ?Sized>(
    chain: &Chain,
    height: u64,
) -> Result<u64, Error> {
    let current = chain.query_height()?;

    if current > height {
        Ok(current)
    } else {
        Err(Error::assertion(format!(
            "expect chain height {current} to be above {height}"
        )))
    }
}

/**
   Assert that an upgrade run failed during `phase`, returning the error
   for further inspection.
*/
pub fn assert_upgrade_failed_in<T: Debug>(
    result: Result<T, UpgradeError>,
    phase: UpgradePhase,
) -> Result<UpgradeError, Error> {
    match result {
        Ok(value) => Err(Error::assertion(format!(
            "expect upgrade to fail during {phase}, but it succeeded with {value:?}"
        ))),
        Err(e) if e.phase() == phase => Ok(e),
        Err(e) => Err(Error::assertion(format!(
            "expect upgrade to fail during {phase}, but it failed during {}: {e}",
            e.phase()
        ))),
    }
}
