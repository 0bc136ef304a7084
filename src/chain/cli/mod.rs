/*!
   Wrappers around the command line interface of Cosmos SDK chain binaries.
*/

pub mod status;
pub mod upgrade;
