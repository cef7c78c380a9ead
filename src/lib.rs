//! Dyntable runtime schema-mutation engine library

// Global type definitions
pub mod types;

// Import various modules
pub mod access;
pub mod catalog;
pub mod command;
pub mod config;
pub mod engine;
pub mod model;
pub mod registry;
pub mod rows;
pub mod storage;
pub mod table;

// Re-export the engine entry points for easier access
pub use engine::{EngineError, EngineResult, SchemaEngine};
