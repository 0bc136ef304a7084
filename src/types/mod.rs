/*!
   Definitions of the data types used by upgrade runs.
*/

pub mod config;
pub mod params;
pub mod plan;
pub mod process;
pub mod wallet;
