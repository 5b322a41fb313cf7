//! Authentication: the bearer credential and its store

pub mod credential;
pub mod store;
