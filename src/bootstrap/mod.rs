/*!
   Setup performed once per test session, before any upgrade run.
*/

pub mod init;
