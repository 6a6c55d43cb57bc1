//! Error context across the C ABI
//!
//! Generated code owns one `ErrorContext` per task, created with
//! `strata_err_ctx_new` and passed by pointer into every operation that can
//! fail. Operations never unwind into C: a failure is recorded in the
//! context, the operation returns a zeroed value, and generated code checks
//! `strata_err_has_error` before continuing.
//!
//! # Usage
//!
//! ```ignore
//! let state = strata_err_ctx_new();
//! let id = strata_err_establish(state, 3, 1);
//! let x = strata_arr_int_first(state, 4, 5, arr);
//! if strata_err_has_error(state) {
//!     // jump to the release below
//! }
//! match strata_err_release(state, id) {
//!     1 => { /* caught: strata_err_get_error(state) */ }
//!     _ => {}
//! }
//! ```
//!
//! A failure recorded while no checkpoint is armed is fatal (see
//! `uncaught`).

use crate::text::{from_raw, to_cstring};
use crate::uncaught;
use std::cell::RefCell;
use std::ffi::{CString, c_char};
use std::ptr;
use strata_core::{
    CheckpointId, CheckpointOutcome, ErrorContext, ErrorPayload, Position, RuntimeError,
};

thread_local! {
    /// Cached C string for FFI access (pointer stays valid until the next get/take)
    static ERROR_CSTRING: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn cache_message(payload: Option<&ErrorPayload>) -> *const c_char {
    ERROR_CSTRING.with(|cs| match payload {
        Some(payload) => {
            let cstring = to_cstring(&payload.message);
            let ptr = cstring.as_ptr();
            *cs.borrow_mut() = Some(cstring);
            ptr
        }
        None => {
            *cs.borrow_mut() = None;
            ptr::null()
        }
    })
}

/// Resolve an operation result at the C boundary
///
/// On failure the error is recorded in `state` and `fallback` is returned,
/// provided a checkpoint is armed to receive it. Without one the failure is
/// fatal.
///
/// # Safety
/// `state` must be null or a live context with no outstanding references.
pub(crate) unsafe fn settle<R>(
    state: *mut ErrorContext,
    result: Result<R, RuntimeError>,
    fallback: R,
) -> R {
    match result {
        Ok(value) => value,
        Err(err) => {
            if state.is_null() {
                uncaught::fatal(&err.into_payload());
            }
            let ctx = unsafe { &mut *state };
            ctx.fail_with(&err);
            if ctx.is_armed() {
                fallback
            } else {
                uncaught::fatal(&err.into_payload())
            }
        }
    }
}

/// Create an error context (FFI-safe)
#[unsafe(no_mangle)]
pub extern "C" fn strata_err_ctx_new() -> *mut ErrorContext {
    Box::into_raw(Box::new(ErrorContext::new()))
}

/// Free an error context
///
/// # Safety
/// `state` must be null or come from `strata_err_ctx_new`, not yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_ctx_free(state: *mut ErrorContext) {
    if !state.is_null() {
        drop(unsafe { Box::from_raw(state) });
    }
}

/// Arm a checkpoint; returns its id for `strata_err_release`
///
/// # Safety
/// `state` must be a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_establish(
    state: *mut ErrorContext,
    line: u32,
    col: u32,
) -> u64 {
    assert!(!state.is_null(), "strata_err_establish: null context");
    let ctx = unsafe { &mut *state };
    ctx.establish(Position::new(line, col)).as_u64()
}

/// Release the innermost checkpoint
///
/// Returns 0 when the region completed, 1 when it caught a failure (the
/// payload stays readable via `strata_err_get_error`), and -1 when `id` is
/// not the innermost armed checkpoint.
///
/// # Safety
/// `state` must be a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_release(state: *mut ErrorContext, id: u64) -> i32 {
    assert!(!state.is_null(), "strata_err_release: null context");
    let ctx = unsafe { &mut *state };
    match ctx.release(CheckpointId::from_u64(id)) {
        Ok(CheckpointOutcome::Completed) => 0,
        Ok(CheckpointOutcome::Caught(_)) => 1,
        Err(e) => {
            tracing::warn!(checkpoint = id, "strata_err_release: {}", e);
            -1
        }
    }
}

/// Signal a failure with `message` at (line, col)
///
/// Generated code returns to its checkpoint after this call. With no
/// checkpoint armed the failure is fatal and this does not return.
///
/// # Safety
/// `state` must be a live context; `msg` null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_signal(
    state: *mut ErrorContext,
    line: u32,
    col: u32,
    msg: *const c_char,
) {
    let message = unsafe { from_raw(msg) }.into_owned();
    let err = RuntimeError::failure(Position::new(line, col), message);
    unsafe { settle(state, Err::<(), _>(err), ()) }
}

/// Whether a failure is pending (signalled, not yet caught)
///
/// # Safety
/// `state` must be null or a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_has_error(state: *const ErrorContext) -> bool {
    !state.is_null() && unsafe { &*state }.has_error()
}

/// Message of the most recent failure, or null
///
/// # WARNING: Pointer Lifetime
/// The returned pointer is only valid until the next call to `get_error`,
/// `take_error` or `clear_error` on this thread. Callers must copy the string
/// immediately if they need to retain it.
///
/// # Safety
/// `state` must be null or a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_get_error(state: *const ErrorContext) -> *const c_char {
    if state.is_null() {
        return ptr::null();
    }
    cache_message(unsafe { &*state }.last_error())
}

/// Take (and clear) the most recent failure's message, or null
///
/// Same pointer lifetime rules as `strata_err_get_error`.
///
/// # Safety
/// `state` must be null or a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_take_error(state: *mut ErrorContext) -> *const c_char {
    if state.is_null() {
        return ptr::null();
    }
    let payload = unsafe { &mut *state }.take_error();
    cache_message(payload.as_ref())
}

/// Clear the pending failure and its payload
///
/// # Safety
/// `state` must be null or a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_clear_error(state: *mut ErrorContext) {
    if !state.is_null() {
        unsafe { &mut *state }.clear_error();
    }
    ERROR_CSTRING.with(|cs| *cs.borrow_mut() = None);
}

/// Line of the most recent failure (0 when none)
///
/// # Safety
/// `state` must be null or a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_line(state: *const ErrorContext) -> u32 {
    if state.is_null() {
        return 0;
    }
    unsafe { &*state }
        .last_error()
        .map_or(0, |p| p.position.line)
}

/// Column of the most recent failure (0 when none)
///
/// # Safety
/// `state` must be null or a live context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_err_col(state: *const ErrorContext) -> u32 {
    if state.is_null() {
        return 0;
    }
    unsafe { &*state }.last_error().map_or(0, |p| p.position.col)
}
