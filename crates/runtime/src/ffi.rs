//! C ABI for arrays and closures
//!
//! Generated code links against one family of `strata_arr_<elem>_<op>`
//! symbols per element type:
//!
//! | elem   | Rust type | in (alloc/push/contains) | out (at/first/last/pop) |
//! |--------|-----------|--------------------------|-------------------------|
//! | `bool` | `bool`    | `bool`                   | `bool`                  |
//! | `int`  | `i32`     | `i32`                    | `i32`                   |
//! | `i64`  | `i64`     | `i64`                    | `i64`                   |
//! | `f64`  | `f64`     | `f64`                    | `f64`                   |
//! | `str`  | `String`  | `*const c_char`          | owned `*mut c_char`     |
//!
//! Arrays are opaque heap handles (`*mut Array<T>`) created by `alloc`,
//! `copy` and the operations that return new arrays, and released with
//! `free`. Operations that can fail take `(state, line, col)` first; on
//! failure they record the error in `state` and return a zeroed value (null
//! for handles and strings).
//!
//! Strings are copied in, so the caller keeps ownership of what it passed.
//! Strings handed out are the caller's, released with `strata_str_free`.
//! Callbacks over a `str` array receive a `*const c_char` valid only for the
//! duration of the call.
//!
//! Closures cross as `*const ForeignClosure` built by `strata_fn_alloc`.

use crate::array::Array;
use crate::error::settle;
use crate::frame::{CopyCtxFn, ForeignClosure, FreeCtxFn};
use crate::text::{from_raw, into_raw, to_cstring};
use crate::uncaught;
use std::ffi::{CString, c_char, c_void};
use std::ptr;
use strata_core::{Element, ErrorContext, Position};

// =============================================================================
// Element representation at the boundary
// =============================================================================

/// How an element type crosses the C ABI
pub trait CElement: Element {
    /// Element as passed in by generated code
    type In: Copy;
    /// Element as handed out to generated code
    type Out;
    /// Keeps an element's C view alive for one callback invocation
    type Lent;
    /// Element as it appears in a call frame
    type Arg: Copy;

    /// Copy a C-side element into an owned value
    ///
    /// # Safety
    /// `raw` must be valid for the element type (for strings: null or
    /// NUL-terminated).
    unsafe fn adopt(raw: Self::In) -> Self;
    fn hand_out(self) -> Self::Out;
    /// Returned on failure
    fn zero() -> Self::Out;
    fn lend(&self) -> Self::Lent;
    fn arg(lent: &Self::Lent) -> Self::Arg;
}

macro_rules! impl_c_element_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CElement for $ty {
                type In = $ty;
                type Out = $ty;
                type Lent = $ty;
                type Arg = $ty;

                unsafe fn adopt(raw: $ty) -> Self {
                    raw
                }
                fn hand_out(self) -> $ty {
                    self
                }
                fn zero() -> $ty {
                    <$ty>::default()
                }
                fn lend(&self) -> $ty {
                    *self
                }
                fn arg(lent: &$ty) -> $ty {
                    *lent
                }
            }
        )*
    };
}

impl_c_element_scalar!(bool, i32, i64, f64);

impl CElement for String {
    type In = *const c_char;
    type Out = *mut c_char;
    type Lent = CString;
    type Arg = *const c_char;

    unsafe fn adopt(raw: *const c_char) -> Self {
        unsafe { from_raw(raw) }.into_owned()
    }
    fn hand_out(self) -> *mut c_char {
        into_raw(&self)
    }
    fn zero() -> *mut c_char {
        ptr::null_mut()
    }
    fn lend(&self) -> CString {
        to_cstring(self)
    }
    fn arg(lent: &CString) -> *const c_char {
        lent.as_ptr()
    }
}

// =============================================================================
// Handle helpers
// =============================================================================

unsafe fn arr_ref<'a, T>(arr: *const Array<T>, op: &str) -> &'a Array<T> {
    assert!(!arr.is_null(), "{}: null array", op);
    unsafe { &*arr }
}

unsafe fn arr_mut<'a, T>(arr: *mut Array<T>, op: &str) -> &'a mut Array<T> {
    assert!(!arr.is_null(), "{}: null array", op);
    unsafe { &mut *arr }
}

unsafe fn fn_ref<'a>(closure: *const ForeignClosure, op: &str) -> &'a ForeignClosure {
    assert!(!closure.is_null(), "{}: null closure", op);
    unsafe { &*closure }
}

unsafe fn items<'a, T>(elements: *const T, count: usize) -> &'a [T] {
    if count == 0 || elements.is_null() {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(elements, count) }
    }
}

fn into_handle<T>(array: Array<T>) -> *mut Array<T> {
    Box::into_raw(Box::new(array))
}

fn flag(present: u8, value: i32) -> Option<i32> {
    (present != 0).then_some(value)
}

// =============================================================================
// Generic operations (one instantiation per exported element type)
// =============================================================================

pub(crate) unsafe fn alloc<T: CElement>(elements: *const T::In, count: usize) -> *mut Array<T> {
    let elements = unsafe { items(elements, count) };
    into_handle(elements.iter().map(|raw| unsafe { T::adopt(*raw) }).collect())
}

pub(crate) unsafe fn free<T>(arr: *mut Array<T>) {
    if !arr.is_null() {
        drop(unsafe { Box::from_raw(arr) });
    }
}

pub(crate) unsafe fn len<T>(arr: *const Array<T>) -> usize {
    unsafe { arr_ref(arr, "len") }.len()
}

pub(crate) unsafe fn at<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *const Array<T>,
    index: i32,
) -> T::Out {
    let result = unsafe { arr_ref(arr, "at") }
        .at(position, index)
        .map(|element| element.clone().hand_out());
    unsafe { settle(state, result, T::zero()) }
}

pub(crate) unsafe fn first<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *const Array<T>,
) -> T::Out {
    let result = unsafe { arr_ref(arr, "first") }
        .first(position)
        .map(|element| element.clone().hand_out());
    unsafe { settle(state, result, T::zero()) }
}

pub(crate) unsafe fn last<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *const Array<T>,
) -> T::Out {
    let result = unsafe { arr_ref(arr, "last") }
        .last(position)
        .map(|element| element.clone().hand_out());
    unsafe { settle(state, result, T::zero()) }
}

pub(crate) unsafe fn push<T: CElement>(arr: *mut Array<T>, elements: *const T::In, count: usize) {
    let arr = unsafe { arr_mut(arr, "push") };
    for raw in unsafe { items(elements, count) } {
        arr.push_owned(unsafe { T::adopt(*raw) });
    }
}

pub(crate) unsafe fn pop<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *mut Array<T>,
) -> T::Out {
    let result = unsafe { arr_mut(arr, "pop") }
        .pop(position)
        .map(T::hand_out);
    unsafe { settle(state, result, T::zero()) }
}

pub(crate) unsafe fn remove<T>(
    state: *mut ErrorContext,
    position: Position,
    arr: *mut Array<T>,
    index: i32,
) -> *mut Array<T> {
    let result = unsafe { arr_mut(arr, "remove") }
        .remove(position, index)
        .map(|_| arr);
    unsafe { settle(state, result, ptr::null_mut()) }
}

pub(crate) unsafe fn slice<T: Clone>(
    arr: *const Array<T>,
    has_start: u8,
    start: i32,
    has_end: u8,
    end: i32,
) -> *mut Array<T> {
    let arr = unsafe { arr_ref(arr, "slice") };
    into_handle(arr.slice(flag(has_start, start), flag(has_end, end)))
}

pub(crate) unsafe fn concat<T: Clone>(a: *const Array<T>, b: *const Array<T>) -> *mut Array<T> {
    let (a, b) = unsafe { (arr_ref(a, "concat"), arr_ref(b, "concat")) };
    into_handle(a.concat(b))
}

pub(crate) unsafe fn merge<T: Clone>(a: *mut Array<T>, b: *const Array<T>) -> *mut Array<T> {
    // Merging an array into itself appends a snapshot of its contents
    if ptr::eq(a, b) {
        let snapshot = unsafe { arr_ref(b, "merge") }.clone();
        unsafe { arr_mut(a, "merge") }.merge(&snapshot);
    } else {
        let other = unsafe { arr_ref(b, "merge") };
        unsafe { arr_mut(a, "merge") }.merge(other);
    }
    a
}

pub(crate) unsafe fn reverse<T: Clone>(arr: *const Array<T>) -> *mut Array<T> {
    into_handle(unsafe { arr_ref(arr, "reverse") }.reverse())
}

pub(crate) unsafe fn copy<T: Clone>(arr: *const Array<T>) -> *mut Array<T> {
    into_handle(unsafe { arr_ref(arr, "copy") }.clone())
}

pub(crate) unsafe fn realloc<T: Clone>(arr: *mut Array<T>, rhs: *const Array<T>) -> *mut Array<T> {
    if !ptr::eq(arr, rhs) {
        let rhs = unsafe { arr_ref(rhs, "realloc") };
        unsafe { arr_mut(arr, "realloc") }.realloc(rhs);
    }
    arr
}

pub(crate) unsafe fn contains<T: CElement>(arr: *const Array<T>, value: T::In) -> bool {
    let value = unsafe { T::adopt(value) };
    unsafe { arr_ref(arr, "contains") }.contains(&value)
}

pub(crate) unsafe fn eq<T: PartialEq>(a: *const Array<T>, b: *const Array<T>) -> bool {
    unsafe { arr_ref(a, "eq") == arr_ref(b, "eq") }
}

pub(crate) unsafe fn empty<T>(arr: *const Array<T>) -> bool {
    unsafe { arr_ref(arr, "empty") }.is_empty()
}

pub(crate) unsafe fn clear<T>(arr: *mut Array<T>) -> *mut Array<T> {
    unsafe { arr_mut(arr, "clear") }.clear();
    arr
}

pub(crate) unsafe fn filter<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *const Array<T>,
    predicate: *const ForeignClosure,
) -> *mut Array<T> {
    let arr = unsafe { arr_ref(arr, "filter") };
    let predicate = unsafe { fn_ref(predicate, "filter") };
    let result = arr
        .filter(position, |pos, n| {
            let n = n.lend();
            unsafe { predicate.call_predicate(state, pos, T::arg(&n)) }
        })
        .map(into_handle);
    unsafe { settle(state, result, ptr::null_mut()) }
}

pub(crate) unsafe fn for_each<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *const Array<T>,
    visitor: *const ForeignClosure,
) {
    let arr = unsafe { arr_ref(arr, "for_each") };
    let visitor = unsafe { fn_ref(visitor, "for_each") };
    let result = arr.for_each(position, |pos, n, i| {
        let n = n.lend();
        unsafe { visitor.call_visitor(state, pos, T::arg(&n), i) }
    });
    unsafe { settle(state, result, ()) }
}

pub(crate) unsafe fn sort<T: CElement>(
    state: *mut ErrorContext,
    position: Position,
    arr: *mut Array<T>,
    comparator: *const ForeignClosure,
) -> *mut Array<T> {
    let comparator = unsafe { fn_ref(comparator, "sort") };
    let result = unsafe { arr_mut(arr, "sort") }
        .sort(position, |pos, a, b| {
            let (a, b) = (a.lend(), b.lend());
            unsafe { comparator.call_comparator(state, pos, T::arg(&a), T::arg(&b)) }
        })
        .map(|_| arr);
    unsafe { settle(state, result, ptr::null_mut()) }
}

pub(crate) unsafe fn join<T: Element>(
    arr: *const Array<T>,
    has_separator: u8,
    separator: *const c_char,
) -> *mut c_char {
    let arr = unsafe { arr_ref(arr, "join") };
    let separator = (has_separator != 0).then(|| unsafe { from_raw(separator) });
    into_raw(&arr.join(separator.as_deref()))
}

pub(crate) unsafe fn render<T: Element>(arr: *const Array<T>) -> *mut c_char {
    into_raw(&unsafe { arr_ref(arr, "str") }.to_text())
}

// =============================================================================
// Exported symbols
// =============================================================================

macro_rules! export_array {
    (
        $elem:ty;
        alloc: $alloc:ident, free: $free:ident, len: $len:ident,
        at: $at:ident, first: $first:ident, last: $last:ident,
        push: $push:ident, pop: $pop:ident, remove: $remove:ident,
        slice: $slice:ident, concat: $concat:ident, merge: $merge:ident,
        reverse: $reverse:ident, copy: $copy:ident, realloc: $realloc:ident,
        contains: $contains:ident, eq: $eq:ident, empty: $empty:ident,
        clear: $clear:ident, filter: $filter:ident, for_each: $for_each:ident,
        sort: $sort:ident, join: $join:ident, str: $str:ident $(,)?
    ) => {
        /// New array holding copies of `count` elements
        ///
        /// # Safety
        /// `elements` must point to `count` readable elements (or be null
        /// with `count == 0`).
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $alloc(
            elements: *const <$elem as CElement>::In,
            count: usize,
        ) -> *mut Array<$elem> {
            unsafe { alloc(elements, count) }
        }

        /// # Safety
        /// `arr` must be null or a live handle, not used afterwards.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $free(arr: *mut Array<$elem>) {
            unsafe { free(arr) }
        }

        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $len(arr: *const Array<$elem>) -> usize {
            unsafe { len(arr) }
        }

        /// Element at `index` (negative counts from the end)
        ///
        /// # Safety
        /// `state` must be a live context, `arr` a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $at(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *const Array<$elem>,
            index: i32,
        ) -> <$elem as CElement>::Out {
            unsafe { at(state, Position::new(line, col), arr, index) }
        }

        /// # Safety
        /// `state` must be a live context, `arr` a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $first(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *const Array<$elem>,
        ) -> <$elem as CElement>::Out {
            unsafe { first(state, Position::new(line, col), arr) }
        }

        /// # Safety
        /// `state` must be a live context, `arr` a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $last(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *const Array<$elem>,
        ) -> <$elem as CElement>::Out {
            unsafe { last(state, Position::new(line, col), arr) }
        }

        /// Append copies of `count` elements
        ///
        /// # Safety
        /// `arr` must be a live handle; `elements` as for alloc.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $push(
            arr: *mut Array<$elem>,
            elements: *const <$elem as CElement>::In,
            count: usize,
        ) {
            unsafe { push(arr, elements, count) }
        }

        /// # Safety
        /// `state` must be a live context, `arr` a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $pop(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *mut Array<$elem>,
        ) -> <$elem as CElement>::Out {
            unsafe { pop(state, Position::new(line, col), arr) }
        }

        /// Remove the element at `index`; returns `arr` (null on failure)
        ///
        /// # Safety
        /// `state` must be a live context, `arr` a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $remove(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *mut Array<$elem>,
            index: i32,
        ) -> *mut Array<$elem> {
            unsafe { remove(state, Position::new(line, col), arr, index) }
        }

        /// New array of `[start, end)`; a zero flag means the bound is absent
        ///
        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $slice(
            arr: *const Array<$elem>,
            has_start: u8,
            start: i32,
            has_end: u8,
            end: i32,
        ) -> *mut Array<$elem> {
            unsafe { slice(arr, has_start, start, has_end, end) }
        }

        /// # Safety
        /// `a` and `b` must be live handles.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $concat(a: *const Array<$elem>, b: *const Array<$elem>) -> *mut Array<$elem> {
            unsafe { concat(a, b) }
        }

        /// Append copies of `b` to `a`; returns `a`
        ///
        /// # Safety
        /// `a` and `b` must be live handles.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $merge(a: *mut Array<$elem>, b: *const Array<$elem>) -> *mut Array<$elem> {
            unsafe { merge(a, b) }
        }

        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $reverse(arr: *const Array<$elem>) -> *mut Array<$elem> {
            unsafe { reverse(arr) }
        }

        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $copy(arr: *const Array<$elem>) -> *mut Array<$elem> {
            unsafe { copy(arr) }
        }

        /// Replace the contents of `arr` with copies of `rhs`; returns `arr`
        ///
        /// # Safety
        /// `arr` and `rhs` must be live handles.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $realloc(arr: *mut Array<$elem>, rhs: *const Array<$elem>) -> *mut Array<$elem> {
            unsafe { realloc(arr, rhs) }
        }

        /// # Safety
        /// `arr` must be a live handle; `value` as for alloc.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $contains(arr: *const Array<$elem>, value: <$elem as CElement>::In) -> bool {
            unsafe { contains(arr, value) }
        }

        /// # Safety
        /// `a` and `b` must be live handles.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $eq(a: *const Array<$elem>, b: *const Array<$elem>) -> bool {
            unsafe { eq(a, b) }
        }

        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $empty(arr: *const Array<$elem>) -> bool {
            unsafe { empty(arr) }
        }

        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $clear(arr: *mut Array<$elem>) -> *mut Array<$elem> {
            unsafe { clear(arr) }
        }

        /// New array of the elements `predicate` keeps (null on failure)
        ///
        /// # Safety
        /// `state` must be a live context, `arr` a live handle, `predicate`
        /// a closure over a predicate function for this element type.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $filter(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *const Array<$elem>,
            predicate: *const ForeignClosure,
        ) -> *mut Array<$elem> {
            unsafe { filter(state, Position::new(line, col), arr, predicate) }
        }

        /// # Safety
        /// `state` must be a live context, `arr` a live handle, `visitor`
        /// a closure over a visitor function for this element type.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $for_each(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *const Array<$elem>,
            visitor: *const ForeignClosure,
        ) {
            unsafe { for_each(state, Position::new(line, col), arr, visitor) }
        }

        /// Sort in place; returns `arr` (null on failure)
        ///
        /// # Safety
        /// `state` must be a live context, `arr` a live handle, `comparator`
        /// a closure over a comparator function for this element type.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $sort(
            state: *mut ErrorContext,
            line: u32,
            col: u32,
            arr: *mut Array<$elem>,
            comparator: *const ForeignClosure,
        ) -> *mut Array<$elem> {
            unsafe { sort(state, Position::new(line, col), arr, comparator) }
        }

        /// Owned string; free with `strata_str_free`
        ///
        /// # Safety
        /// `arr` must be a live handle; `separator` a NUL-terminated string
        /// when `has_separator` is non-zero.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $join(
            arr: *const Array<$elem>,
            has_separator: u8,
            separator: *const c_char,
        ) -> *mut c_char {
            unsafe { join(arr, has_separator, separator) }
        }

        /// Owned string; free with `strata_str_free`
        ///
        /// # Safety
        /// `arr` must be a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $str(arr: *const Array<$elem>) -> *mut c_char {
            unsafe { render(arr) }
        }
    };
}

export_array!(
    bool;
    alloc: strata_arr_bool_alloc, free: strata_arr_bool_free, len: strata_arr_bool_len,
    at: strata_arr_bool_at, first: strata_arr_bool_first, last: strata_arr_bool_last,
    push: strata_arr_bool_push, pop: strata_arr_bool_pop, remove: strata_arr_bool_remove,
    slice: strata_arr_bool_slice, concat: strata_arr_bool_concat, merge: strata_arr_bool_merge,
    reverse: strata_arr_bool_reverse, copy: strata_arr_bool_copy, realloc: strata_arr_bool_realloc,
    contains: strata_arr_bool_contains, eq: strata_arr_bool_eq, empty: strata_arr_bool_empty,
    clear: strata_arr_bool_clear, filter: strata_arr_bool_filter, for_each: strata_arr_bool_for_each,
    sort: strata_arr_bool_sort, join: strata_arr_bool_join, str: strata_arr_bool_str,
);

export_array!(
    i32;
    alloc: strata_arr_int_alloc, free: strata_arr_int_free, len: strata_arr_int_len,
    at: strata_arr_int_at, first: strata_arr_int_first, last: strata_arr_int_last,
    push: strata_arr_int_push, pop: strata_arr_int_pop, remove: strata_arr_int_remove,
    slice: strata_arr_int_slice, concat: strata_arr_int_concat, merge: strata_arr_int_merge,
    reverse: strata_arr_int_reverse, copy: strata_arr_int_copy, realloc: strata_arr_int_realloc,
    contains: strata_arr_int_contains, eq: strata_arr_int_eq, empty: strata_arr_int_empty,
    clear: strata_arr_int_clear, filter: strata_arr_int_filter, for_each: strata_arr_int_for_each,
    sort: strata_arr_int_sort, join: strata_arr_int_join, str: strata_arr_int_str,
);

export_array!(
    i64;
    alloc: strata_arr_i64_alloc, free: strata_arr_i64_free, len: strata_arr_i64_len,
    at: strata_arr_i64_at, first: strata_arr_i64_first, last: strata_arr_i64_last,
    push: strata_arr_i64_push, pop: strata_arr_i64_pop, remove: strata_arr_i64_remove,
    slice: strata_arr_i64_slice, concat: strata_arr_i64_concat, merge: strata_arr_i64_merge,
    reverse: strata_arr_i64_reverse, copy: strata_arr_i64_copy, realloc: strata_arr_i64_realloc,
    contains: strata_arr_i64_contains, eq: strata_arr_i64_eq, empty: strata_arr_i64_empty,
    clear: strata_arr_i64_clear, filter: strata_arr_i64_filter, for_each: strata_arr_i64_for_each,
    sort: strata_arr_i64_sort, join: strata_arr_i64_join, str: strata_arr_i64_str,
);

export_array!(
    f64;
    alloc: strata_arr_f64_alloc, free: strata_arr_f64_free, len: strata_arr_f64_len,
    at: strata_arr_f64_at, first: strata_arr_f64_first, last: strata_arr_f64_last,
    push: strata_arr_f64_push, pop: strata_arr_f64_pop, remove: strata_arr_f64_remove,
    slice: strata_arr_f64_slice, concat: strata_arr_f64_concat, merge: strata_arr_f64_merge,
    reverse: strata_arr_f64_reverse, copy: strata_arr_f64_copy, realloc: strata_arr_f64_realloc,
    contains: strata_arr_f64_contains, eq: strata_arr_f64_eq, empty: strata_arr_f64_empty,
    clear: strata_arr_f64_clear, filter: strata_arr_f64_filter, for_each: strata_arr_f64_for_each,
    sort: strata_arr_f64_sort, join: strata_arr_f64_join, str: strata_arr_f64_str,
);

export_array!(
    String;
    alloc: strata_arr_str_alloc, free: strata_arr_str_free, len: strata_arr_str_len,
    at: strata_arr_str_at, first: strata_arr_str_first, last: strata_arr_str_last,
    push: strata_arr_str_push, pop: strata_arr_str_pop, remove: strata_arr_str_remove,
    slice: strata_arr_str_slice, concat: strata_arr_str_concat, merge: strata_arr_str_merge,
    reverse: strata_arr_str_reverse, copy: strata_arr_str_copy, realloc: strata_arr_str_realloc,
    contains: strata_arr_str_contains, eq: strata_arr_str_eq, empty: strata_arr_str_empty,
    clear: strata_arr_str_clear, filter: strata_arr_str_filter, for_each: strata_arr_str_for_each,
    sort: strata_arr_str_sort, join: strata_arr_str_join, str: strata_arr_str_str,
);

// =============================================================================
// Closures
// =============================================================================

/// Package a C callback as a closure
///
/// `ctx` is owned by the closure from here on: it is duplicated with
/// `copy_cb` on every copy and released with `free_cb` on every free. Both
/// callbacks are required when `ctx` is non-null; a null `func` or a context
/// without callbacks is reported as an uncaught failure.
///
/// # Safety
/// `name` must be null or NUL-terminated; `func` must be a callback of the
/// shape the closure will be used as.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_fn_alloc(
    name: *const c_char,
    ctx: *mut c_void,
    copy_cb: Option<CopyCtxFn>,
    free_cb: Option<FreeCtxFn>,
    func: *const c_void,
) -> *mut ForeignClosure {
    let name = unsafe { from_raw(name) }.into_owned();
    match unsafe { ForeignClosure::new(name, ctx, copy_cb, free_cb, func) } {
        Ok(closure) => Box::into_raw(Box::new(closure)),
        Err(err) => uncaught::fatal(&err.into_payload()),
    }
}

/// # Safety
/// `closure` must be a live closure handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_fn_copy(closure: *const ForeignClosure) -> *mut ForeignClosure {
    Box::into_raw(Box::new(unsafe { fn_ref(closure, "strata_fn_copy") }.clone()))
}

/// Replace `closure` with a copy of `rhs`; returns `closure`
///
/// # Safety
/// Both must be live closure handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_fn_realloc(
    closure: *mut ForeignClosure,
    rhs: *const ForeignClosure,
) -> *mut ForeignClosure {
    assert!(!closure.is_null(), "strata_fn_realloc: null closure");
    if !ptr::eq(closure, rhs) {
        let copy = unsafe { fn_ref(rhs, "strata_fn_realloc") }.clone();
        unsafe { *closure = copy };
    }
    closure
}

/// # Safety
/// `closure` must be null or a live closure handle, not used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_fn_free(closure: *mut ForeignClosure) {
    if !closure.is_null() {
        drop(unsafe { Box::from_raw(closure) });
    }
}

/// Whether both closures wrap the same function
///
/// # Safety
/// Both must be live closure handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_fn_eq(a: *const ForeignClosure, b: *const ForeignClosure) -> bool {
    unsafe { fn_ref(a, "strata_fn_eq") == fn_ref(b, "strata_fn_eq") }
}

/// The closure's name as an owned string; free with `strata_str_free`
///
/// # Safety
/// `closure` must be a live closure handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_fn_str(closure: *const ForeignClosure) -> *mut c_char {
    into_raw(unsafe { fn_ref(closure, "strata_fn_str") }.name())
}
