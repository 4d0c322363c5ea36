//! LIFO C ABI
//!
//! Procedural interface over two opaque handle types, `StackDyn` (node-chain
//! stack with optional copy/destroy hooks) and `StackPool` (fixed-capacity
//! memory pool). Every function returns a numeric outcome code (`0` on
//! success) and records it as the thread's last error.
//!
//! Validation order is the same everywhere: handle, then output or input
//! pointer, then stack state. A failing call never mutates the stack.
//!
//! Handles are created by `*_init` and released by `*_destroy`; using a handle
//! after destroying it is the caller's responsibility to avoid.

/// Unwrap a `Result` inside an `extern "C"` function, returning its recorded
/// outcome code on failure.
macro_rules! ffi_try {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => return $crate::error::finish(Err(err)),
        }
    };
}

pub mod error;
pub mod stack_dyn;
pub mod stack_pool;

pub use error::{stack_error_str, stack_get_last_error};
pub use stack_dyn::{
    StackCopyData, StackDestroyData, StackDyn, stack_dyn_clear, stack_dyn_destroy,
    stack_dyn_init, stack_dyn_is_empty, stack_dyn_peek, stack_dyn_pop, stack_dyn_push,
    stack_dyn_size,
};
pub use stack_pool::{
    StackPool, stack_pool_capacity, stack_pool_clear, stack_pool_destroy, stack_pool_init,
    stack_pool_is_empty, stack_pool_peek, stack_pool_pop, stack_pool_push, stack_pool_size,
};
