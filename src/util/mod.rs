/*!
   Utility functions shared across the crate.
*/

pub mod assert;
pub mod file;
pub mod retry;
pub mod wait;
