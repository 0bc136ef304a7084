/*!
   Handles to the chain clusters an upgrade run operates on.
*/

pub mod cli;
pub mod cluster;
pub mod exec;
pub mod governance;
pub mod handle;
