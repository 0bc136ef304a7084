/*!
   The interface through which an upgrade run observes and controls a
   running cluster of full nodes.
*/

use crate::error::Error;

/**
   Anything that reports the latest block height of a chain.

   This is all that [`BlockWaiter`](crate::util::wait::BlockWaiter) needs,
   so it can also wait on chains the upgrade run does not control.
*/
pub trait ChainHeight {
    fn query_height(&self) -> Result<u64, Error>;
}

/**
   Handle to all the nodes of a validator set.

   Every method blocks until the operation has completed on every node.
   Implementations must not report success for a partially applied
   operation: the coordinator never continues with a subset of the nodes.
*/
pub trait ClusterHandle: ChainHeight {
    fn chain_id(&self) -> &str;

    /// Stop every node process of the cluster.
    fn stop_all_nodes(&self) -> Result<(), Error>;

    /// Start every node process of the cluster with the current version.
    fn start_all_nodes(&self) -> Result<(), Error>;

    /**
       Replace the software the nodes run with the given version. Only
       called while every node is stopped; takes effect on the next
       [`start_all_nodes`](Self::start_all_nodes).
    */
    fn swap_version(&self, version: &str) -> Result<(), Error>;
}
