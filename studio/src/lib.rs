//! Sheetify Studio client library
//!
//! Core modules for publishing, building and running Sheetify tools.

pub mod app;
pub mod authn;
pub mod bundle;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod lifecycle;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
pub mod workers;
