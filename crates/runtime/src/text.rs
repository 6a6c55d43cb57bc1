//! Strings handed across the C ABI
//!
//! Text produced by the runtime (`join`, `str`, closure names) is returned
//! as an owned, NUL-terminated buffer. The caller releases it with
//! `strata_str_free`.

use std::ffi::{CStr, CString, c_char};

/// Convert to a C string, replacing interior NUL bytes with '?'
pub(crate) fn to_cstring(text: &str) -> CString {
    let safe: String = text
        .chars()
        .map(|c| if c == '\0' { '?' } else { c })
        .collect();
    CString::new(safe).unwrap_or_default()
}

/// Hand `text` to the caller as an owned C string
pub(crate) fn into_raw(text: &str) -> *mut c_char {
    to_cstring(text).into_raw()
}

/// Borrow a C string argument as UTF-8 (lossy); null reads as empty
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives 'a
pub(crate) unsafe fn from_raw<'a>(ptr: *const c_char) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        return std::borrow::Cow::Borrowed("");
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
}

/// Free a string returned by the runtime
///
/// # Safety
/// `ptr` must be null or a pointer returned by a runtime function that
/// documents its result as owned, not yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strata_str_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}
