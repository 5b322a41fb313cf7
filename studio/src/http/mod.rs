//! Backend REST client

pub mod auth;
pub mod client;
pub mod tools;
