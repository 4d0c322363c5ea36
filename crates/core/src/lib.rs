//! LIFO Core: two stack storage strategies with one error discipline
//!
//! Every operation returns its outcome directly and also records it as the
//! handle's (and the thread's) last outcome for diagnostics.
//!
//! Key design principles:
//! - RefStack: chain of owned nodes; alias mode stores handles, deep-copy mode
//!   duplicates and releases payloads through a paired hook set
//! - PoolStack: one fixed buffer of uniform blocks, copied in and out by value
//! - No operation mutates state before all of its preconditions have passed
//!
//! # Modules
//!
//! - `error`: Outcome codes and the last-outcome cell
//! - `ref_stack`: Node-chain stack with copy/destroy hooks
//! - `pool_stack`: Fixed-capacity memory-pool stack (bytes and typed)

pub mod error;
pub mod pool_stack;
pub mod ref_stack;

// Re-export key types and functions
pub use error::{Outcome, StackError, check, last as last_outcome, reset as reset_last_outcome};
pub use pool_stack::{DEFAULT_POOL_CAPACITY, PoolConfig, PoolStack, PoolStats, TypedPool};
pub use ref_stack::{CopyFn, DestroyFn, RefStack};
