/*!
   The upgrade coordinator and the interfaces it is parameterized by.
*/

pub mod coordinator;
pub mod state;
pub mod suite;
