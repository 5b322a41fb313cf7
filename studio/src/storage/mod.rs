//! Local storage: layout, settings and durable key/value entries

pub mod kv;
pub mod layout;
pub mod settings;
