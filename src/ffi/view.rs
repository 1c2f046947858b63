//! Bounds-checked views over native memory.
//!
//! Walking a native array means trusting two fields the native layer filled
//! in: a base pointer and an element count. This module is the only place
//! that trust is exercised; everything above it works on ordinary slices and
//! owned strings. Element stride comes from the `#[repr(C)]` declarations in
//! [`crate::ffi::types`], so there is no manual offset arithmetic anywhere.

use std::ffi::CStr;
use std::os::raw::{c_char, c_uint};
use std::slice;

/// View a native (pointer, count) pair as a slice.
///
/// A null pointer or zero count yields an empty slice rather than undefined
/// behavior, which is how the native layer represents empty arrays.
///
/// # Safety
///
/// If `ptr` is non-null it must point to at least `len` consecutive,
/// initialized values of `T`, valid for the lifetime `'a` and not mutated
/// through any other alias while the slice is live.
pub unsafe fn native_slice<'a, T>(ptr: *const T, len: c_uint) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, len as usize)
    }
}

/// Copy a native C string into an owned `String`.
///
/// Null yields an empty string; invalid UTF-8 is replaced rather than
/// rejected, matching how the managed bindings decode these fields.
///
/// # Safety
///
/// If `ptr` is non-null it must point to a NUL-terminated C string valid for
/// the duration of the call.
pub unsafe fn c_str_lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_native_slice_null_is_empty() {
        let slice: &[u32] = unsafe { native_slice(ptr::null(), 4) };
        assert!(slice.is_empty());
    }

    #[test]
    fn test_native_slice_zero_len_is_empty() {
        let values = [1u32, 2, 3];
        let slice: &[u32] = unsafe { native_slice(values.as_ptr(), 0) };
        assert!(slice.is_empty());
    }

    #[test]
    fn test_native_slice_views_all_elements() {
        let values = [10u64, 20, 30];
        let slice = unsafe { native_slice(values.as_ptr(), 3) };
        assert_eq!(slice, &[10, 20, 30]);
    }

    #[test]
    fn test_c_str_lossy_null_is_empty() {
        assert_eq!(unsafe { c_str_lossy(ptr::null()) }, "");
    }

    #[test]
    fn test_c_str_lossy_reads_until_nul() {
        let bytes = b"DataSetInfo\0trailing";
        let decoded = unsafe { c_str_lossy(bytes.as_ptr() as *const c_char) };
        assert_eq!(decoded, "DataSetInfo");
    }
}
