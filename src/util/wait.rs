/*!
   Waiting for chains to produce blocks.
*/

use core::time::Duration;
use std::thread::sleep;
use std::time::Instant;
use tracing::{debug, trace};

use crate::chain::handle::ChainHeight;
use crate::error::WaitError;
use crate::types::config::UpgradeConfig;

/**
   The result of a wait that observed the requested number of blocks.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOutcome {
    pub start_height: u64,
    pub end_height: u64,
    pub target: u64,
    pub elapsed: Duration,
}

impl WaitOutcome {
    pub fn observed(&self) -> u64 {
        self.end_height.saturating_sub(self.start_height)
    }
}

/**
   Polls the height of a chain until it has advanced by a number of blocks,
   giving up once a deadline has elapsed.

   Block times vary, so a wait is bounded by time rather than by a number
   of polls. Between two polls the calling thread sleeps for the poll
   interval.
*/
#[derive(Debug, Clone)]
pub struct BlockWaiter {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl BlockWaiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn for_halt(config: &UpgradeConfig) -> Self {
        Self::new(config.halt_timeout, config.poll_interval)
    }

    pub fn for_resumption(config: &UpgradeConfig) -> Self {
        Self::new(config.resumption_timeout, config.poll_interval)
    }

    /**
       Wait until the chain is `blocks` blocks above the height it reports
       when the wait starts.

       Failed queries are retried until the deadline, including the one
       reading the start height: nodes refuse connections while they halt
       or restart. A wait that never read the start height fails with
       [`WaitError::query`].
    */
    pub fn wait_for_blocks<Chain: ChainHeight + ?Sized>(
        &self,
        chain: &Chain,
        blocks: u64,
    ) -> Result<WaitOutcome, WaitError> {
        let start = Instant::now();
        let start_height = self.query_start_height(chain, start)?;

        let mut waiting = Waiting::new(start_height, blocks);

        debug!(
            "waiting for {} blocks from height {} with a timeout of {:?}",
            blocks, start_height, self.timeout
        );

        loop {
            if waiting.is_done() {
                return Ok(waiting.outcome(start.elapsed()));
            }

            self.sleep_until_next_poll(start)
                .ok_or_else(|| waiting.timeout(start.elapsed()))?;

            waiting.poll(chain);
        }
    }

    /**
       Wait until every chain is `blocks` blocks above its own start height,
       all under a single deadline.
    */
    pub fn wait_for_blocks_on_chains(
        &self,
        chains: &[&dyn ChainHeight],
        blocks: u64,
    ) -> Result<Vec<WaitOutcome>, WaitError> {
        let start = Instant::now();

        let mut waits = chains
            .iter()
            .map(|chain| {
                self.query_start_height(*chain, start)
                    .map(|height| Waiting::new(height, blocks))
            })
            .collect::<Result<Vec<_>, _>>()?;

        loop {
            if waits.iter().all(Waiting::is_done) {
                let elapsed = start.elapsed();
                return Ok(waits.iter().map(|w| w.outcome(elapsed)).collect());
            }

            if self.sleep_until_next_poll(start).is_none() {
                // Report the chain that is furthest behind.
                let slowest = waits
                    .iter()
                    .filter(|w| !w.is_done())
                    .min_by_key(|w| w.observed());

                return Err(match slowest {
                    Some(w) => w.timeout(start.elapsed()),
                    None => WaitError::timeout(blocks, blocks, start.elapsed()),
                });
            }

            for (wait, chain) in waits.iter_mut().zip(chains.iter()) {
                if !wait.is_done() {
                    wait.poll(*chain);
                }
            }
        }
    }

    fn query_start_height<Chain: ChainHeight + ?Sized>(
        &self,
        chain: &Chain,
        start: Instant,
    ) -> Result<u64, WaitError> {
        loop {
            match chain.query_height() {
                Ok(height) => return Ok(height),
                Err(e) => {
                    debug!("failed to query start height, retrying: {}", e);

                    if self.sleep_until_next_poll(start).is_none() {
                        return Err(WaitError::query(e));
                    }
                }
            }
        }
    }

    /**
       Sleep for the poll interval, clamped to the time left before the
       deadline. Returns `None` if the deadline has already passed.
    */
    fn sleep_until_next_poll(&self, start: Instant) -> Option<()> {
        let remaining = self.timeout.checked_sub(start.elapsed())?;

        if remaining.is_zero() {
            return None;
        }

        sleep(self.poll_interval.min(remaining));

        Some(())
    }
}

struct Waiting {
    start_height: u64,
    last_height: u64,
    target: u64,
}

impl Waiting {
    fn new(start_height: u64, target: u64) -> Self {
        Self {
            start_height,
            last_height: start_height,
            target,
        }
    }

    fn observed(&self) -> u64 {
        self.last_height.saturating_sub(self.start_height)
    }

    fn is_done(&self) -> bool {
        self.observed() >= self.target
    }

    fn poll<Chain: ChainHeight + ?Sized>(&mut self, chain: &Chain) {
        match chain.query_height() {
            Ok(height) => {
                trace!(
                    "observed height {} ({}/{} blocks)",
                    height,
                    height.saturating_sub(self.start_height),
                    self.target
                );
                self.last_height = self.last_height.max(height);
            }
            Err(e) => {
                debug!("failed to query height while waiting for blocks: {}", e);
            }
        }
    }

    fn outcome(&self, elapsed: Duration) -> WaitOutcome {
        WaitOutcome {
            start_height: self.start_height,
            end_height: self.last_height,
            target: self.target,
            elapsed,
        }
    }

    fn timeout(&self, elapsed: Duration) -> WaitError {
        WaitError::timeout(self.target, self.observed(), elapsed)
    }
}
