//! Application module

pub mod command;
pub mod options;
pub mod run;
pub mod state;
