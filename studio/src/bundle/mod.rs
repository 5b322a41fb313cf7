//! Bundle module

pub mod packager;

pub use packager::{package_from_file, package_from_source, Bundle, DEFAULT_REQUIREMENTS};
