//! Storage layer: loading and saving the book.
//!
//! This module provides the persistence gateway consulted at startup and
//! shutdown, with a JSON file backend and an in-memory backend.

mod file_gateway;
mod gateway;

pub use file_gateway::FileGateway;
pub use gateway::{MemoryGateway, PersistenceGateway};
