//! Warden DNS domain layer.
pub mod config;
pub mod errors;
pub mod source;
pub mod wire;

pub use config::{CliOverrides, Config};
pub use errors::DomainError;
pub use source::{BlockOutcome, DeleteOutcome, SortField, SourceRecord, UnblockOutcome};
