//! Domain models

pub mod tool;

pub use openapi_client::models::{Build, Run, ToolDetail, ToolId, ToolVersion, VersionId};
pub use tool::ToolDetailExt;
