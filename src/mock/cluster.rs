/*!
   A scripted, in-memory [`ClusterHandle`].
*/

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::chain::handle::{ChainHeight, ClusterHandle};
use crate::error::Error;

/**
   A lifecycle operation that was invoked on a [`MockCluster`].
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    StopAllNodes,
    SwapVersion(String),
    StartAllNodes,
}

enum HeightSource {
    /**
       Returns the scripted responses in order, then repeats the last one.
       `None` makes the query fail.
    */
    Script {
        responses: VecDeque<Option<u64>>,
        last: Option<u64>,
    },

    /// Produces one block per height query.
    Producing { next: u64 },
}

struct MockClusterState {
    heights: HeightSource,
    running: bool,
    version: String,
    calls: Vec<ClusterCall>,
    height_queries: usize,
    refused_queries: usize,
    boot_queries: usize,
    fail_stop: bool,
    fail_swap: bool,
    fail_start: bool,
}

/**
   A cluster whose reported heights are scripted by the test.

   Height queries fail while the cluster is stopped, like the RPC endpoint
   of a stopped node would. Lifecycle operations are recorded in the order
   they are invoked and can be made to fail.
*/
pub struct MockCluster {
    chain_id: String,
    state: Mutex<MockClusterState>,
}

impl MockCluster {
    /**
       A running cluster that reports `heights` to successive height
       queries and keeps reporting the last of them afterwards.
    */
    pub fn with_heights(heights: impl IntoIterator<Item = u64>) -> Self {
        Self::with_responses(heights.into_iter().map(Some))
    }

    /**
       Like [`with_heights`](Self::with_heights), with `None` standing for
       a query that fails. A script ending in `None` never answers again.
    */
    pub fn with_responses(responses: impl IntoIterator<Item = Option<u64>>) -> Self {
        let responses: VecDeque<Option<u64>> = responses.into_iter().collect();
        let last = responses.front().copied().unwrap_or(Some(0));

        Self::new(HeightSource::Script { responses, last })
    }

    /// A running cluster that produces a block every time it is queried.
    pub fn producing(start_height: u64) -> Self {
        Self::new(HeightSource::Producing { next: start_height })
    }

    fn new(heights: HeightSource) -> Self {
        Self {
            chain_id: "mock-0".to_string(),
            state: Mutex::new(MockClusterState {
                heights,
                running: true,
                version: String::new(),
                calls: Vec::new(),
                height_queries: 0,
                refused_queries: 0,
                boot_queries: 0,
                fail_stop: false,
                fail_swap: false,
                fail_start: false,
            }),
        }
    }

    pub fn with_chain_id(mut self, chain_id: &str) -> Self {
        self.chain_id = chain_id.to_string();
        self
    }

    /**
       After every start, refuse the next `queries` height queries without
       consuming the script, like nodes whose RPC endpoint is not up yet.
    */
    pub fn booting(self, queries: usize) -> Self {
        self.state().boot_queries = queries;
        self
    }

    pub fn failing_stop(self) -> Self {
        self.state().fail_stop = true;
        self
    }

    pub fn failing_swap(self) -> Self {
        self.state().fail_swap = true;
        self
    }

    pub fn failing_start(self) -> Self {
        self.state().fail_start = true;
        self
    }

    pub fn calls(&self) -> Vec<ClusterCall> {
        self.state().calls.clone()
    }

    pub fn height_queries(&self) -> usize {
        self.state().height_queries
    }

    /// The version last swapped in, empty if no swap happened.
    pub fn version(&self) -> String {
        self.state().version.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }

    fn state(&self) -> MutexGuard<'_, MockClusterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChainHeight for MockCluster {
    fn query_height(&self) -> Result<u64, Error> {
        let mut state = self.state();

        if !state.running {
            return Err(Error::node_not_running(self.chain_id.clone()));
        }

        state.height_queries += 1;

        if state.refused_queries > 0 {
            state.refused_queries -= 1;
            return Err(Error::no_reachable_node(self.chain_id.clone()));
        }

        let height = match &mut state.heights {
            HeightSource::Script { responses, last } => {
                if let Some(response) = responses.pop_front() {
                    *last = response;
                }
                *last
            }
            HeightSource::Producing { next } => {
                let height = *next;
                *next += 1;
                Some(height)
            }
        };

        height.ok_or_else(|| Error::no_reachable_node(self.chain_id.clone()))
    }
}

impl ClusterHandle for MockCluster {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn stop_all_nodes(&self) -> Result<(), Error> {
        let mut state = self.state();
        state.calls.push(ClusterCall::StopAllNodes);

        if state.fail_stop {
            return Err(Error::node_lifecycle(
                "stop".to_string(),
                format!("{}-validator-1", self.chain_id),
            ));
        }

        state.running = false;
        Ok(())
    }

    fn swap_version(&self, version: &str) -> Result<(), Error> {
        let mut state = self.state();
        state.calls.push(ClusterCall::SwapVersion(version.to_string()));

        if state.fail_swap {
            return Err(Error::unknown_version(version.to_string()));
        }

        state.version = version.to_string();
        Ok(())
    }

    fn start_all_nodes(&self) -> Result<(), Error> {
        let mut state = self.state();
        state.calls.push(ClusterCall::StartAllNodes);

        if state.fail_start {
            return Err(Error::node_lifecycle(
                "start".to_string(),
                format!("{}-validator-0", self.chain_id),
            ));
        }

        state.running = true;
        state.refused_queries = state.boot_queries;
        Ok(())
    }
}
