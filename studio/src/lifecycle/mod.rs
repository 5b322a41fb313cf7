//! Tool lifecycle module

pub mod client;
pub mod controls;
pub mod create;
pub mod gate;
pub mod view;
