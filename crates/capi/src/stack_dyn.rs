//! `StackDyn`: node-chain stack over opaque `void *` payloads
//!
//! Created without hooks, the stack stores the caller's pointers (null
//! included) and never frees them. Created with a copy/destroy pair, every
//! push stores `copy(data)`, pop hands that copy to the caller, and clear or
//! destroy releases whatever is left with `destroy`.

use crate::error::finish;
use lifo_core::{CopyFn, DestroyFn, RefStack, StackError};
use std::ffi::{c_int, c_void};
use std::ptr;

/// Copy hook: returns an owned duplicate of `data`, or null on failure
pub type StackCopyData = Option<unsafe extern "C" fn(data: *const c_void) -> *mut c_void>;

/// Destroy hook: releases a payload produced by the copy hook
pub type StackDestroyData = Option<unsafe extern "C" fn(data: *mut c_void)>;

/// Opaque stack handle
pub struct StackDyn {
    stack: RefStack<*mut c_void>,
}

unsafe fn borrow_handle<'a>(stack: *mut StackDyn) -> Result<&'a mut StackDyn, StackError> {
    unsafe { stack.as_mut() }.ok_or(StackError::NullHandle)
}

/// Create a stack and store its handle in `*stack`
///
/// Pass both hooks for deep copies or neither for pointer aliasing; exactly
/// one is `STACK_INVALID_ARGS`.
///
/// # Safety
/// `stack` must be null or valid for writes. The hooks, if any, must be safe
/// to call with every pointer later pushed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_init(
    stack: *mut *mut StackDyn,
    copy: StackCopyData,
    destroy: StackDestroyData,
) -> c_int {
    if stack.is_null() {
        return finish(Err(StackError::NullHandle));
    }

    let copy = copy.map(|copy| -> CopyFn<*mut c_void> {
        Box::new(move |data: &*mut c_void| {
            let dup = unsafe { copy(*data) };
            (!dup.is_null()).then_some(dup)
        })
    });
    let destroy = destroy.map(|destroy| -> DestroyFn<*mut c_void> {
        Box::new(move |data: *mut c_void| unsafe { destroy(data) })
    });

    let inner = ffi_try!(RefStack::init(copy, destroy));
    let deep_copy = inner.is_deep_copy();
    let handle = Box::into_raw(Box::new(StackDyn { stack: inner }));
    tracing::debug!(?handle, deep_copy, "stack_dyn_init");
    unsafe {
        *stack = handle;
    }
    finish(Ok(()))
}

/// Clear the stack and free the handle
///
/// # Safety
/// `stack` must be null or a live handle from `stack_dyn_init`; it is dangling
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_destroy(stack: *mut StackDyn) -> c_int {
    if stack.is_null() {
        return finish(Err(StackError::NullHandle));
    }
    let handle = unsafe { Box::from_raw(stack) };
    handle.stack.destroy();
    finish(Ok(()))
}

/// Remove every element, destroying owned payloads
///
/// # Safety
/// `stack` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_clear(stack: *mut StackDyn) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    handle.stack.clear();
    finish(Ok(()))
}

/// Push `data` (copied in deep-copy mode, aliased otherwise)
///
/// # Safety
/// `stack` must be null or a live handle. In alias mode `data` must stay
/// valid for as long as it is on the stack.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_push(stack: *mut StackDyn, data: *const c_void) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    let data = data as *mut c_void;
    let data = (!data.is_null()).then_some(&data);
    finish(handle.stack.push(data))
}

/// Pop the top payload into `*out_data`; the caller now owns it
///
/// # Safety
/// `stack` must be null or a live handle; `out_data` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_pop(stack: *mut StackDyn, out_data: *mut *mut c_void) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    let out = ffi_try!(unsafe { out_data.as_mut() }.ok_or(StackError::NullOutput));
    let data = ffi_try!(handle.stack.pop());
    *out = data.unwrap_or(ptr::null_mut());
    finish(Ok(()))
}

/// Store the top payload in `*out_data` without removing it; the stack keeps
/// ownership
///
/// # Safety
/// `stack` must be null or a live handle; `out_data` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_peek(stack: *const StackDyn, out_data: *mut *mut c_void) -> c_int {
    let handle = ffi_try!(unsafe { stack.as_ref() }.ok_or(StackError::NullHandle));
    let out = ffi_try!(unsafe { out_data.as_mut() }.ok_or(StackError::NullOutput));
    let data = ffi_try!(handle.stack.peek());
    *out = data.copied().unwrap_or(ptr::null_mut());
    finish(Ok(()))
}

/// # Safety
/// `stack` must be null or a live handle; `out_empty` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_is_empty(stack: *const StackDyn, out_empty: *mut bool) -> c_int {
    let handle = ffi_try!(unsafe { stack.as_ref() }.ok_or(StackError::NullHandle));
    let out = ffi_try!(unsafe { out_empty.as_mut() }.ok_or(StackError::NullOutput));
    *out = handle.stack.is_empty();
    finish(Ok(()))
}

/// # Safety
/// `stack` must be null or a live handle; `out_size` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_dyn_size(stack: *const StackDyn, out_size: *mut usize) -> c_int {
    let handle = ffi_try!(unsafe { stack.as_ref() }.ok_or(StackError::NullHandle));
    let out = ffi_try!(unsafe { out_size.as_mut() }.ok_or(StackError::NullOutput));
    *out = handle.stack.size();
    finish(Ok(()))
}
