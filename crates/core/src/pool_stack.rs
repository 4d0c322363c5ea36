//! Pooled Stack Implementation
//!
//! One contiguous, zero-initialised buffer carved into `capacity` slots of
//! `block_size` bytes. Elements are copied in and out by value; the stack
//! never keeps a reference to caller memory and never allocates after `init`.
//!
//! ## Pool Layout
//!
//! ```text
//! pool: capacity * block_size bytes
//! ┌──────────┬──────────┬──────────┬──────────┬─────────┐
//! │  slot 0  │  slot 1  │  slot 2  │  slot 3  │  ...    │
//! │ (block)  │ (block)  │ (block)  │ (block)  │         │
//! └──────────┴──────────┴──────────┴──────────┴─────────┘
//!                          ↑ top (highest occupied slot)
//!
//! - The first element occupies slot 0 (the origin)
//! - Push: top = len * block_size, copy in, len += 1
//! - Pop: copy out of top, len -= 1, retreat top while len > 0
//! ```
//!
//! When the last element is popped, `top` is left where it was: it is only
//! meaningful while `len > 0`, and push recomputes it from `len`.
//!
//! [`TypedPool`] layers a compile-time element type over the same buffer so
//! that the block size is `size_of::<T>()` and values move as `T`.

use crate::error::{self, Outcome, StackError, record_on};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{MaybeUninit, size_of};
use std::ptr::{self, NonNull};

/// Alignment of the pool buffer, enough for any primitive element type
pub const POOL_ALIGN: usize = 16;

/// Default slot count used by [`PoolConfig::for_type`]
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Construction parameters for a pooled stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of slots
    pub capacity: usize,
    /// Bytes per slot
    pub block_size: usize,
}

impl PoolConfig {
    pub fn new(capacity: usize, block_size: usize) -> Self {
        PoolConfig {
            capacity,
            block_size,
        }
    }

    /// Slots sized for `T`, with the default capacity
    pub fn for_type<T: Copy>() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, size_of::<T>())
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Occupancy snapshot of a pooled stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub block_size: usize,
    /// Live elements
    pub len: usize,
    /// High-water mark of `len` since creation
    pub peak: usize,
    /// Size of the pool buffer in bytes
    pub bytes: usize,
}

/// Fixed-capacity LIFO stack of uniform byte blocks.
pub struct PoolStack {
    /// Origin of the buffer
    pool: NonNull<u8>,
    layout: Layout,
    /// Byte offset of the top slot (only meaningful while `len > 0`)
    top: usize,
    capacity: usize,
    block_size: usize,
    len: usize,
    peak: usize,
    last: Cell<Outcome>,
}

// The buffer is exclusively owned by the handle.
unsafe impl Send for PoolStack {}

impl PoolStack {
    /// Allocate a pool of `capacity` slots of `block_size` bytes.
    ///
    /// Zero for either parameter is `InvalidArgs`; a buffer that cannot be
    /// allocated (or whose size overflows) is `AllocFailed`.
    pub fn init(capacity: usize, block_size: usize) -> Result<Self, StackError> {
        error::record(Self::allocate(capacity, block_size))
    }

    pub fn from_config(config: &PoolConfig) -> Result<Self, StackError> {
        Self::init(config.capacity, config.block_size)
    }

    fn allocate(capacity: usize, block_size: usize) -> Result<Self, StackError> {
        if capacity == 0 || block_size == 0 {
            return Err(StackError::InvalidArgs);
        }
        let bytes = capacity
            .checked_mul(block_size)
            .ok_or(StackError::AllocFailed)?;
        let layout =
            Layout::from_size_align(bytes, POOL_ALIGN).map_err(|_| StackError::AllocFailed)?;
        let pool = NonNull::new(unsafe { alloc_zeroed(layout) }).ok_or(StackError::AllocFailed)?;

        tracing::debug!(capacity, block_size, bytes, "pool stack allocated");
        Ok(PoolStack {
            pool,
            layout,
            top: 0,
            capacity,
            block_size,
            len: 0,
            peak: 0,
            last: Cell::new(Outcome::Ok),
        })
    }

    /// Copy exactly `block_size` bytes of `data` into the next free slot.
    ///
    /// `NullData` if `data` is absent, `InvalidArgs` if it is not exactly one
    /// block long, `Full` if every slot is occupied.
    pub fn push(&mut self, data: Option<&[u8]>) -> Result<(), StackError> {
        let result = self.push_block(data);
        self.note(result)
    }

    fn push_block(&mut self, data: Option<&[u8]>) -> Result<(), StackError> {
        let data = data.ok_or(StackError::NullData)?;
        if data.len() != self.block_size {
            return Err(StackError::InvalidArgs);
        }
        self.ensure_room()?;
        unsafe { self.write_next(data.as_ptr()) };
        Ok(())
    }

    /// Copy the top block into `out` and remove it.
    ///
    /// `NullOutput` if `out` is absent, `InvalidArgs` if it is shorter than
    /// one block, `Empty` if there is nothing to pop. Only the first
    /// `block_size` bytes of `out` are written.
    pub fn pop(&mut self, out: Option<&mut [u8]>) -> Result<(), StackError> {
        let result = self.pop_block(out);
        self.note(result)
    }

    fn pop_block(&mut self, out: Option<&mut [u8]>) -> Result<(), StackError> {
        let out = self.destination(out)?;
        self.ensure_live()?;
        unsafe { self.read_top(out.as_mut_ptr()) };
        self.retreat();
        Ok(())
    }

    /// Copy the top block into `out` without removing it
    pub fn peek(&self, out: Option<&mut [u8]>) -> Result<(), StackError> {
        let result = self.destination(out).and_then(|out| {
            self.ensure_live()?;
            unsafe { self.read_top(out.as_mut_ptr()) };
            Ok(())
        });
        self.note(result)
    }

    pub fn is_empty(&self) -> bool {
        let _ = self.note(Ok(()));
        self.len == 0
    }

    /// Number of live elements
    pub fn size(&self) -> usize {
        let _ = self.note(Ok(()));
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Index of the top slot; parked at 0 on an empty, freshly cleared pool
    pub fn top_slot(&self) -> usize {
        self.top / self.block_size
    }

    /// Reset to empty. Slot contents are left as-is and overwritten by later
    /// pushes.
    pub fn clear(&mut self) {
        self.top = 0;
        self.len = 0;
        let _ = self.note(Ok(()));
    }

    /// Release the buffer and the handle
    pub fn destroy(self) {
        let _ = self.note(Ok(()));
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            block_size: self.block_size,
            len: self.len,
            peak: self.peak,
            bytes: self.layout.size(),
        }
    }

    /// Outcome of the most recent operation on this handle
    pub fn last_outcome(&self) -> Outcome {
        self.last.get()
    }

    fn destination<'a>(&self, out: Option<&'a mut [u8]>) -> Result<&'a mut [u8], StackError> {
        let out = out.ok_or(StackError::NullOutput)?;
        if out.len() < self.block_size {
            return Err(StackError::InvalidArgs);
        }
        Ok(out)
    }

    fn ensure_room(&self) -> Result<(), StackError> {
        if self.len == self.capacity {
            Err(StackError::Full)
        } else {
            Ok(())
        }
    }

    fn ensure_live(&self) -> Result<(), StackError> {
        if self.len == 0 {
            Err(StackError::Empty)
        } else {
            Ok(())
        }
    }

    /// Copy one block from `src` into the slot at index `len`.
    ///
    /// # Safety
    /// `src` must be readable for `block_size` bytes and the pool must not be
    /// full.
    unsafe fn write_next(&mut self, src: *const u8) {
        debug_assert!(self.len < self.capacity);
        self.top = self.len * self.block_size;
        unsafe {
            ptr::copy_nonoverlapping(src, self.pool.as_ptr().add(self.top), self.block_size);
        }
        self.len += 1;
        self.peak = self.peak.max(self.len);
        tracing::trace!(len = self.len, slot = self.top_slot(), "pool stack push");
    }

    /// Copy the top block into `dst`.
    ///
    /// # Safety
    /// `dst` must be writable for `block_size` bytes and the pool must not be
    /// empty.
    unsafe fn read_top(&self, dst: *mut u8) {
        debug_assert!(self.len > 0);
        unsafe {
            ptr::copy_nonoverlapping(self.pool.as_ptr().add(self.top), dst, self.block_size);
        }
    }

    /// Drop the top element after it has been read
    fn retreat(&mut self) {
        self.len -= 1;
        if self.len > 0 {
            self.top -= self.block_size;
        }
        tracing::trace!(len = self.len, "pool stack pop");
    }

    fn note<R>(&self, result: Result<R, StackError>) -> Result<R, StackError> {
        record_on(&self.last, result)
    }
}

impl Drop for PoolStack {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.pool.as_ptr(), self.layout);
        }
    }
}

impl fmt::Debug for PoolStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolStack")
            .field("capacity", &self.capacity)
            .field("block_size", &self.block_size)
            .field("len", &self.len)
            .field("top_slot", &self.top_slot())
            .field("last", &self.last.get())
            .finish()
    }
}

/// Pooled stack of `T` values, one slot per value.
///
/// `T: Copy` guarantees the element has no ownership semantics of its own, so
/// a byte-wise copy in and out of the pool is a faithful value copy.
pub struct TypedPool<T: Copy> {
    raw: PoolStack,
    _marker: PhantomData<T>,
}

impl<T: Copy> TypedPool<T> {
    /// Pool of `capacity` slots sized for `T`; zero-sized `T` is `InvalidArgs`
    pub fn init(capacity: usize) -> Result<Self, StackError> {
        let raw = PoolStack::init(capacity, size_of::<T>())?;
        Ok(TypedPool {
            raw,
            _marker: PhantomData,
        })
    }

    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        let result = self.raw.ensure_room().map(|()| unsafe {
            self.raw.write_next(&value as *const T as *const u8);
        });
        self.raw.note(result)
    }

    pub fn pop(&mut self) -> Result<T, StackError> {
        let result = match self.raw.ensure_live() {
            Ok(()) => {
                let value = unsafe { self.read_value() };
                self.raw.retreat();
                Ok(value)
            }
            Err(err) => Err(err),
        };
        self.raw.note(result)
    }

    pub fn peek(&self) -> Result<T, StackError> {
        let result = self
            .raw
            .ensure_live()
            .map(|()| unsafe { self.read_value() });
        self.raw.note(result)
    }

    /// # Safety
    /// The pool must not be empty.
    unsafe fn read_value(&self) -> T {
        let mut value = MaybeUninit::<T>::uninit();
        unsafe {
            self.raw.read_top(value.as_mut_ptr() as *mut u8);
            value.assume_init()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn size(&self) -> usize {
        self.raw.size()
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn destroy(self) {
        self.raw.destroy();
    }

    pub fn stats(&self) -> PoolStats {
        self.raw.stats()
    }

    pub fn last_outcome(&self) -> Outcome {
        self.raw.last_outcome()
    }
}

impl<T: Copy> fmt::Debug for TypedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedPool").field(&self.raw).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn push_i32(stack: &mut PoolStack, v: i32) -> Result<(), StackError> {
        stack.push(Some(&v.to_ne_bytes()))
    }

    fn pop_i32(stack: &mut PoolStack) -> Result<i32, StackError> {
        let mut out = [0u8; 4];
        stack.pop(Some(&mut out))?;
        Ok(i32::from_ne_bytes(out))
    }

    #[test]
    fn test_capacity_three_scenario() {
        let mut stack = PoolStack::init(3, 4).unwrap();

        push_i32(&mut stack, 1).unwrap();
        assert_eq!(stack.size(), 1);
        push_i32(&mut stack, 2).unwrap();
        assert_eq!(stack.size(), 2);
        push_i32(&mut stack, 3).unwrap();
        assert_eq!(stack.size(), 3);
        assert_eq!(push_i32(&mut stack, 4), Err(StackError::Full));
        assert_eq!(stack.size(), 3);

        assert_eq!(pop_i32(&mut stack), Ok(3));
        assert_eq!(stack.size(), 2);
        assert_eq!(pop_i32(&mut stack), Ok(2));
        assert_eq!(stack.size(), 1);
        assert_eq!(pop_i32(&mut stack), Ok(1));
        assert_eq!(stack.size(), 0);
        assert_eq!(pop_i32(&mut stack), Err(StackError::Empty));
    }

    #[test]
    fn test_init_rejects_zero_parameters() {
        assert_eq!(PoolStack::init(0, 4).err(), Some(StackError::InvalidArgs));
        assert_eq!(PoolStack::init(4, 0).err(), Some(StackError::InvalidArgs));
        assert_eq!(error::last(), Outcome::Err(StackError::InvalidArgs));
    }

    #[test]
    fn test_init_overflow_is_alloc_failure() {
        assert_eq!(
            PoolStack::init(usize::MAX, 2).err(),
            Some(StackError::AllocFailed)
        );
    }

    #[test]
    fn test_first_element_occupies_origin() {
        let mut stack = PoolStack::init(4, 8).unwrap();
        assert_eq!(stack.top_slot(), 0);

        stack.push(Some(&[1; 8])).unwrap();
        assert_eq!(stack.top_slot(), 0);
        stack.push(Some(&[2; 8])).unwrap();
        assert_eq!(stack.top_slot(), 1);
    }

    #[test]
    fn test_full_leaves_state_unchanged() {
        let mut stack = PoolStack::init(2, 1).unwrap();
        stack.push(Some(&[1])).unwrap();
        stack.push(Some(&[2])).unwrap();
        let before = (stack.size(), stack.top_slot());

        assert_eq!(stack.push(Some(&[3])), Err(StackError::Full));
        assert_eq!(stack.last_outcome(), Outcome::Err(StackError::Full));
        assert_eq!((stack.size(), stack.top_slot()), before);
    }

    #[test]
    fn test_empty_pop_leaves_state_unchanged() {
        let mut stack = PoolStack::init(2, 1).unwrap();
        let mut out = [0u8; 1];
        assert_eq!(stack.pop(Some(&mut out)), Err(StackError::Empty));
        assert_eq!(stack.size(), 0);
        assert_eq!(stack.top_slot(), 0);
        assert_eq!(out, [0]);
    }

    #[test]
    fn test_top_is_recomputed_after_draining() {
        let mut stack = PoolStack::init(3, 2).unwrap();
        stack.push(Some(&[1, 1])).unwrap();
        stack.push(Some(&[2, 2])).unwrap();

        let mut out = [0u8; 2];
        stack.pop(Some(&mut out)).unwrap();
        stack.pop(Some(&mut out)).unwrap();
        assert_eq!(out, [1, 1]);
        assert!(stack.is_empty());

        stack.push(Some(&[3, 3])).unwrap();
        assert_eq!(stack.top_slot(), 0);
        stack.peek(Some(&mut out)).unwrap();
        assert_eq!(out, [3, 3]);
    }

    #[test]
    fn test_argument_validation() {
        let mut stack = PoolStack::init(2, 4).unwrap();

        assert_eq!(stack.push(None), Err(StackError::NullData));
        assert_eq!(stack.push(Some(&[1, 2])), Err(StackError::InvalidArgs));
        assert_eq!(stack.pop(None), Err(StackError::NullOutput));
        assert_eq!(stack.peek(None), Err(StackError::NullOutput));

        let mut short = [0u8; 3];
        assert_eq!(stack.pop(Some(&mut short)), Err(StackError::InvalidArgs));
        assert_eq!(stack.size(), 0);
    }

    #[test]
    fn test_null_output_checked_before_empty() {
        let mut stack = PoolStack::init(1, 1).unwrap();
        assert_eq!(stack.pop(None), Err(StackError::NullOutput));
    }

    #[test]
    fn test_pop_writes_only_one_block() {
        let mut stack = PoolStack::init(1, 2).unwrap();
        stack.push(Some(&[7, 8])).unwrap();

        let mut out = [0xffu8; 4];
        stack.pop(Some(&mut out)).unwrap();
        assert_eq!(out, [7, 8, 0xff, 0xff]);
    }

    #[test]
    fn test_clear_resets_and_reuses() {
        let mut stack = PoolStack::init(3, 4).unwrap();
        for v in 1..=3 {
            push_i32(&mut stack, v).unwrap();
        }
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.size(), 0);
        assert_eq!(stack.top_slot(), 0);

        push_i32(&mut stack, 9).unwrap();
        assert_eq!(pop_i32(&mut stack), Ok(9));
        assert_eq!(pop_i32(&mut stack), Err(StackError::Empty));
    }

    #[test]
    fn test_stats_track_peak() {
        let mut stack = PoolStack::init(4, 4).unwrap();
        for v in 0..3 {
            push_i32(&mut stack, v).unwrap();
        }
        pop_i32(&mut stack).unwrap();

        let stats = stack.stats();
        assert_eq!(stats.len, 2);
        assert_eq!(stats.peak, 3);
        assert_eq!(stats.bytes, 16);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.block_size, 4);
    }

    #[test]
    fn test_from_config() {
        let config = PoolConfig::for_type::<u64>().with_capacity(2);
        let stack = PoolStack::from_config(&config).unwrap();
        assert_eq!(stack.capacity(), 2);
        assert_eq!(stack.block_size(), 8);
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Product {
        id: i32,
        name: [u8; 20],
        price: f64,
    }

    #[test]
    fn test_typed_pool_round_trip() {
        let mut pool = TypedPool::<Product>::init(3).unwrap();
        let mut name = [0u8; 20];
        name[..6].copy_from_slice(b"Laptop");
        let laptop = Product {
            id: 1,
            name,
            price: 999.99,
        };
        let phone = Product {
            id: 2,
            price: 699.99,
            ..laptop
        };

        pool.push(laptop).unwrap();
        pool.push(phone).unwrap();
        assert_eq!(pool.peek(), Ok(phone));
        assert_eq!(pool.pop(), Ok(phone));
        assert_eq!(pool.pop(), Ok(laptop));
        assert_eq!(pool.pop(), Err(StackError::Empty));
    }

    #[test]
    fn test_typed_pool_full() {
        let mut pool = TypedPool::<u16>::init(2).unwrap();
        pool.push(1).unwrap();
        pool.push(2).unwrap();
        assert_eq!(pool.push(3), Err(StackError::Full));
        assert_eq!(pool.last_outcome(), Outcome::Err(StackError::Full));
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.last_outcome(), Outcome::Ok);
    }

    #[test]
    fn test_typed_pool_rejects_zero_sized() {
        assert_eq!(TypedPool::<()>::init(4).err(), Some(StackError::InvalidArgs));
    }
}
