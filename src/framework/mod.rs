/*!
   Framework for writing upgrade test cases.
*/

pub mod base;
