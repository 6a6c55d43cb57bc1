//! Strata Core: foundation shared by the Strata runtime and generated code
//!
//! This crate provides the language-agnostic pieces every container and
//! closure operation relies on:
//! - Position: the (line, column) echoed into error payloads
//! - RuntimeError / ErrorPayload: typed failures with source positions
//! - ErrorContext: per-task error state with a LIFO checkpoint stack
//! - Element: the {copy, free, equals, to-text} contract for container elements
//!
//! # Modules
//!
//! - `position`: source positions
//! - `error`: runtime error kinds and the error payload
//! - `context`: error context, checkpoints, signal/guard
//! - `element`: element contract and number-to-text rules
//! - `any`: type-erased tagged element values
//! - `index`: negative-index and slice-bound resolution

pub mod any;
pub mod context;
pub mod element;
pub mod error;
pub mod index;
pub mod position;

// Re-export key types and functions
pub use any::AnyValue;
pub use context::{CheckpointError, CheckpointId, CheckpointOutcome, ErrorContext};
pub use element::{Element, float_text};
pub use error::{EmptyAccess, ErrorPayload, RuntimeError};
pub use index::{resolve_index, resolve_slice};
pub use position::Position;
