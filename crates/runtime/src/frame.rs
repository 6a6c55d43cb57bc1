//! Foreign closures and call frames
//!
//! Callbacks compiled from Strata source are C functions. Each one is
//! packaged as a `ForeignClosure`: a name, an optional opaque context
//! pointer with its copy/free callbacks, and the function pointer itself.
//!
//! Arguments reach the callback through a `#[repr(C)]` frame built on the
//! stack for each invocation:
//!
//! ```text
//! PredicateFrame<T>   { state, line, col, n0 }          -> bool
//! VisitorFrame<T>     { state, line, col, n0, n1: i32 } -> void
//! ComparatorFrame<T>  { state, line, col, n0, n1 }      -> i32
//! ```
//!
//! `n0`/`n1` are the elements as `CElement::Arg`: the value itself for
//! scalars, a borrowed `*const c_char` for strings (valid during the call).
//! `state` is the caller's error context, `line`/`col` the position of the
//! operation that invoked the callback. A callback fails by calling
//! `strata_err_signal(state, ...)` and returning; the runtime notices the
//! new, still pending failure after the call and aborts the operation. A
//! failure the callback caught with its own checkpoint does not count.

use std::ffi::c_void;
use strata_core::{ErrorContext, ErrorPayload, Position, RuntimeError};

/// Duplicate a closure context (called once per copy)
pub type CopyCtxFn = unsafe extern "C" fn(ctx: *mut c_void) -> *mut c_void;
/// Release a closure context (called once per free)
pub type FreeCtxFn = unsafe extern "C" fn(ctx: *mut c_void);

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PredicateFrame<T> {
    pub state: *mut ErrorContext,
    pub line: u32,
    pub col: u32,
    pub n0: T,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VisitorFrame<T> {
    pub state: *mut ErrorContext,
    pub line: u32,
    pub col: u32,
    pub n0: T,
    pub n1: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ComparatorFrame<T> {
    pub state: *mut ErrorContext,
    pub line: u32,
    pub col: u32,
    pub n0: T,
    pub n1: T,
}

pub type PredicateFn<T> = unsafe extern "C" fn(ctx: *mut c_void, frame: *const PredicateFrame<T>) -> bool;
pub type VisitorFn<T> = unsafe extern "C" fn(ctx: *mut c_void, frame: *const VisitorFrame<T>);
pub type ComparatorFn<T> = unsafe extern "C" fn(ctx: *mut c_void, frame: *const ComparatorFrame<T>) -> i32;

/// A C callback with its owned context
///
/// Cloning calls `copy_cb` on the context; dropping calls `free_cb`. A
/// closure without a context copies and frees only its name.
pub struct ForeignClosure {
    name: String,
    ctx: *mut c_void,
    copy_cb: Option<CopyCtxFn>,
    free_cb: Option<FreeCtxFn>,
    func: *const c_void,
}

impl ForeignClosure {
    /// Wrap `func`, taking ownership of `ctx`
    ///
    /// Fails when `func` is null, or `ctx` is non-null without both
    /// callbacks. `ctx` is left untouched on failure.
    ///
    /// # Safety
    /// `func` must point to a function of the shape it will be called as;
    /// `ctx` must be valid for `copy_cb`/`free_cb`.
    pub unsafe fn new(
        name: impl Into<String>,
        ctx: *mut c_void,
        copy_cb: Option<CopyCtxFn>,
        free_cb: Option<FreeCtxFn>,
        func: *const c_void,
    ) -> Result<Self, RuntimeError> {
        let name = name.into();
        if func.is_null() {
            return Err(RuntimeError::failure(
                Position::unknown(),
                format!("closure '{}': null function pointer", name),
            ));
        }
        if !ctx.is_null() && (copy_cb.is_none() || free_cb.is_none()) {
            return Err(RuntimeError::failure(
                Position::unknown(),
                format!("closure '{}': context without copy/free callbacks", name),
            ));
        }
        Ok(ForeignClosure {
            name,
            ctx,
            copy_cb,
            free_cb,
            func,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_ctx(&self) -> bool {
        !self.ctx.is_null()
    }

    pub fn func(&self) -> *const c_void {
        self.func
    }

    /// Call as a predicate
    ///
    /// # Safety
    /// `func` must be a `PredicateFn<T>`; `state` null or a live context
    /// with no outstanding references.
    pub unsafe fn call_predicate<T: Copy>(
        &self,
        state: *mut ErrorContext,
        position: Position,
        n0: T,
    ) -> Result<bool, RuntimeError> {
        let frame = PredicateFrame {
            state,
            line: position.line,
            col: position.col,
            n0,
        };
        let before = unsafe { generation(state) };
        let func: PredicateFn<T> = unsafe { std::mem::transmute_copy(&self.func) };
        let keep = unsafe { func(self.ctx, &frame) };
        unsafe { signalled_since(state, before, position) }?;
        Ok(keep)
    }

    /// Call as a visitor
    ///
    /// # Safety
    /// `func` must be a `VisitorFn<T>`; `state` as for `call_predicate`.
    pub unsafe fn call_visitor<T: Copy>(
        &self,
        state: *mut ErrorContext,
        position: Position,
        n0: T,
        n1: i32,
    ) -> Result<(), RuntimeError> {
        let frame = VisitorFrame {
            state,
            line: position.line,
            col: position.col,
            n0,
            n1,
        };
        let before = unsafe { generation(state) };
        let func: VisitorFn<T> = unsafe { std::mem::transmute_copy(&self.func) };
        unsafe { func(self.ctx, &frame) };
        unsafe { signalled_since(state, before, position) }
    }

    /// Call as a comparator
    ///
    /// # Safety
    /// `func` must be a `ComparatorFn<T>`; `state` as for `call_predicate`.
    pub unsafe fn call_comparator<T: Copy>(
        &self,
        state: *mut ErrorContext,
        position: Position,
        n0: T,
        n1: T,
    ) -> Result<i32, RuntimeError> {
        let frame = ComparatorFrame {
            state,
            line: position.line,
            col: position.col,
            n0,
            n1,
        };
        let before = unsafe { generation(state) };
        let func: ComparatorFn<T> = unsafe { std::mem::transmute_copy(&self.func) };
        let order = unsafe { func(self.ctx, &frame) };
        unsafe { signalled_since(state, before, position) }?;
        Ok(order)
    }
}

unsafe fn generation(state: *const ErrorContext) -> u64 {
    if state.is_null() {
        0
    } else {
        unsafe { &*state }.generation()
    }
}

/// The failure a callback signalled, if any
///
/// A failure counts only if it is still pending: one the callback caught
/// with its own checkpoint, or cleared, is not the callback's failure.
unsafe fn signalled_since(
    state: *const ErrorContext,
    before: u64,
    position: Position,
) -> Result<(), RuntimeError> {
    if state.is_null() {
        return Ok(());
    }
    let ctx = unsafe { &*state };
    if !ctx.has_error() || ctx.generation() == before {
        return Ok(());
    }
    let payload = ctx
        .last_error()
        .cloned()
        .unwrap_or_else(|| ErrorPayload::new(position, "callback failed"));
    Err(RuntimeError::Failure(payload))
}

impl Clone for ForeignClosure {
    fn clone(&self) -> Self {
        let ctx = match (self.ctx.is_null(), self.copy_cb) {
            (false, Some(copy)) => unsafe { copy(self.ctx) },
            _ => std::ptr::null_mut(),
        };
        ForeignClosure {
            name: self.name.clone(),
            ctx,
            copy_cb: self.copy_cb,
            free_cb: self.free_cb,
            func: self.func,
        }
    }
}

impl Drop for ForeignClosure {
    fn drop(&mut self) {
        if let (false, Some(free)) = (self.ctx.is_null(), self.free_cb) {
            unsafe { free(self.ctx) };
        }
    }
}

/// Equal iff the function pointers are equal; contexts are not compared
impl PartialEq for ForeignClosure {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.func, other.func)
    }
}

impl std::fmt::Debug for ForeignClosure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignClosure")
            .field("name", &self.name)
            .field("func", &self.func)
            .field("has_ctx", &self.has_ctx())
            .finish()
    }
}
