// ========================================================
// File: celeste-core/src/lib.rs
// ========================================================
pub mod cache;
pub mod eventbus;
pub mod http;
pub mod platforms;
pub mod services;
pub mod settings;
pub mod tasks;
pub mod utils;

pub use celeste_common::Error;
