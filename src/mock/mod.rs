/*!
   In-memory implementations of the upgrade collaborators, for exercising
   upgrade runs without spawning any chain.
*/

pub mod cluster;
pub mod suite;
