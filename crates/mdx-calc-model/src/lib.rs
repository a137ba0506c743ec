//! MDX catalog and configuration
//!
//! This crate provides:
//! - The `Cube` trait through which the engine reads metadata and cells
//! - Process-wide engine configuration
//! - An in-memory cube for tests and embedding

pub mod config;
pub mod cube;
pub mod memory;

pub use config::{ConfigError, MdxConfig};
pub use cube::*;
pub use memory::*;
