//! Request and response bodies of the Sheetify Studio REST API (`/v1`).

pub mod models;
