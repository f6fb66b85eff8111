//! nopy: run Python and pip inside a package.json project
//!
//! The three binaries (`nopy`, `npip`, `nopenv`) are thin entry points over
//! the modules exposed here.

pub mod bootstrap;
pub mod commands;
pub mod common;
