//! Adapters - concrete implementations of ports
//!
//! These implement the port traits defined in the ports module.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileRepository;
pub use memory::{Dataset, MemoryRepository};
