//! Strata Runtime: support library linked into Strata generated code
//!
//! Key design principles:
//! - Array<T>: one generic dynamic array, instantiated per element type
//! - Closure<F>: named function pointer owning an optional capture
//! - ErrorContext (from strata-core): explicit per-task error state whose
//!   checkpoints catch failures signalled anywhere inside their extent
//! - Call frames: `#[repr(C)]` argument packs for callbacks compiled to C

pub mod array;
pub mod closures;
pub mod config;
pub mod error;
pub mod ffi;
pub mod frame;
pub mod logging;
pub mod text;
pub mod uncaught;

// Re-export key types and functions
pub use array::{Array, DEFAULT_JOIN_SEPARATOR};
pub use closures::{Closure, Comparator, Predicate, Visitor, expect_capture};
pub use config::{RuntimeConfig, runtime_config};
pub use ffi::CElement;
pub use frame::{ComparatorFrame, ForeignClosure, PredicateFrame, VisitorFrame};
pub use strata_core::{
    AnyValue, CheckpointId, CheckpointOutcome, Element, EmptyAccess, ErrorContext, ErrorPayload,
    Position, RuntimeError,
};

// Error context operations (exported for linking)
pub use error::{
    strata_err_clear_error as err_clear_error, strata_err_col as err_col,
    strata_err_ctx_free as err_ctx_free, strata_err_ctx_new as err_ctx_new,
    strata_err_establish as err_establish, strata_err_get_error as err_get_error,
    strata_err_has_error as err_has_error, strata_err_line as err_line,
    strata_err_release as err_release, strata_err_signal as err_signal,
    strata_err_take_error as err_take_error,
};

// Closure operations (exported for linking)
pub use ffi::{
    strata_fn_alloc as fn_alloc, strata_fn_copy as fn_copy, strata_fn_eq as fn_eq,
    strata_fn_free as fn_free, strata_fn_realloc as fn_realloc, strata_fn_str as fn_str,
};

// Startup and text
pub use logging::strata_runtime_init as runtime_init;
pub use text::strata_str_free as str_free;
