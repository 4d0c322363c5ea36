//! `StackPool`: fixed-capacity stack of `block_size`-byte elements
//!
//! Push copies `block_size` bytes from the caller's pointer into the pool and
//! pop/peek copy them back out; the pool never retains caller pointers.

use crate::error::finish;
use lifo_core::{PoolStack, StackError};
use std::ffi::{c_int, c_void};
use std::slice;

/// Opaque stack handle
pub struct StackPool {
    stack: PoolStack,
}

unsafe fn borrow_handle<'a>(stack: *const StackPool) -> Result<&'a StackPool, StackError> {
    unsafe { stack.as_ref() }.ok_or(StackError::NullHandle)
}

unsafe fn borrow_handle_mut<'a>(stack: *mut StackPool) -> Result<&'a mut StackPool, StackError> {
    unsafe { stack.as_mut() }.ok_or(StackError::NullHandle)
}

/// View a caller destination as one block
///
/// # Safety
/// `out` must be null or writable for `len` bytes.
unsafe fn destination<'a>(out: *mut c_void, len: usize) -> Result<&'a mut [u8], StackError> {
    if out.is_null() {
        return Err(StackError::NullOutput);
    }
    Ok(unsafe { slice::from_raw_parts_mut(out as *mut u8, len) })
}

/// Allocate a pool of `capacity` blocks of `block_size` bytes into `*stack`
///
/// # Safety
/// `stack` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_init(
    stack: *mut *mut StackPool,
    capacity: usize,
    block_size: usize,
) -> c_int {
    if stack.is_null() {
        return finish(Err(StackError::NullHandle));
    }
    let inner = ffi_try!(PoolStack::init(capacity, block_size));
    let handle = Box::into_raw(Box::new(StackPool { stack: inner }));
    tracing::debug!(?handle, capacity, block_size, "stack_pool_init");
    unsafe {
        *stack = handle;
    }
    finish(Ok(()))
}

/// Reset the pool to empty without touching its contents
///
/// # Safety
/// `stack` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_clear(stack: *mut StackPool) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle_mut(stack) });
    handle.stack.clear();
    finish(Ok(()))
}

/// Free the pool buffer and the handle
///
/// # Safety
/// `stack` must be null or a live handle from `stack_pool_init`; it is
/// dangling afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_destroy(stack: *mut StackPool) -> c_int {
    if stack.is_null() {
        return finish(Err(StackError::NullHandle));
    }
    let handle = unsafe { Box::from_raw(stack) };
    handle.stack.destroy();
    finish(Ok(()))
}

/// Copy one block from `data` onto the stack
///
/// # Safety
/// `stack` must be null or a live handle; `data` null or readable for
/// `block_size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_push(stack: *mut StackPool, data: *const c_void) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle_mut(stack) });
    let block = (!data.is_null())
        .then(|| unsafe { slice::from_raw_parts(data as *const u8, handle.stack.block_size()) });
    finish(handle.stack.push(block))
}

/// Copy the top block into `out_data` and remove it
///
/// # Safety
/// `stack` must be null or a live handle; `out_data` null or writable for
/// `block_size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_pop(stack: *mut StackPool, out_data: *mut c_void) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle_mut(stack) });
    let out = ffi_try!(unsafe { destination(out_data, handle.stack.block_size()) });
    finish(handle.stack.pop(Some(out)))
}

/// Copy the top block into `out_data` without removing it
///
/// # Safety
/// `stack` must be null or a live handle; `out_data` null or writable for
/// `block_size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_peek(stack: *const StackPool, out_data: *mut c_void) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    let out = ffi_try!(unsafe { destination(out_data, handle.stack.block_size()) });
    finish(handle.stack.peek(Some(out)))
}

/// # Safety
/// `stack` must be null or a live handle; `out_empty` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_is_empty(stack: *const StackPool, out_empty: *mut bool) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    let out = ffi_try!(unsafe { out_empty.as_mut() }.ok_or(StackError::NullOutput));
    *out = handle.stack.is_empty();
    finish(Ok(()))
}

/// # Safety
/// `stack` must be null or a live handle; `out_size` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_size(stack: *const StackPool, out_size: *mut usize) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    let out = ffi_try!(unsafe { out_size.as_mut() }.ok_or(StackError::NullOutput));
    *out = handle.stack.size();
    finish(Ok(()))
}

/// Number of slots in the pool
///
/// # Safety
/// `stack` must be null or a live handle; `out_capacity` null or valid for
/// writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stack_pool_capacity(
    stack: *const StackPool,
    out_capacity: *mut usize,
) -> c_int {
    let handle = ffi_try!(unsafe { borrow_handle(stack) });
    let out = ffi_try!(unsafe { out_capacity.as_mut() }.ok_or(StackError::NullOutput));
    *out = handle.stack.capacity();
    finish(Ok(()))
}
