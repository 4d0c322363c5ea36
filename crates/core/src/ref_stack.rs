//! Reference Stack
//!
//! A singly-linked chain of heap nodes, each owning one payload slot.
//!
//! ```text
//! head ─► ┌──────┬──────┐   ┌──────┬──────┐   ┌──────┬──────┐
//!         │ data │ next ├──►│ data │ next ├──►│ data │ None │
//!         └──────┴──────┘   └──────┴──────┘   └──────┴──────┘
//!          (top)                                (bottom)
//! ```
//!
//! ## Modes
//!
//! - **Alias**: the stack stores the caller's handle (`&U`, a raw pointer, an
//!   id) bit-for-bit and never allocates or releases what it points at. A null
//!   (`None`) payload is legal. With `T = &'a U` the borrow checker enforces
//!   that referenced data outlives the stack.
//! - **Deep copy**: every push runs the copy hook to produce a stack-owned
//!   duplicate. The stack owns that duplicate until it is popped (ownership
//!   moves to the caller) or cleared/dropped (the destroy hook releases it).
//!
//! Copy and destroy hooks are always paired; supplying exactly one is
//! `InvalidArgs`.

use crate::error::{self, Outcome, StackError, record_on};
use std::alloc::{Layout, alloc};
use std::cell::Cell;
use std::fmt;

/// Produces an owned duplicate of an element, or `None` on failure
pub type CopyFn<T> = Box<dyn Fn(&T) -> Option<T>>;

/// Releases an element the stack owns
pub type DestroyFn<T> = Box<dyn FnMut(T)>;

enum Mode<T> {
    /// Handle duplication for `Copy` element types
    Alias(fn(&T) -> T),
    DeepCopy {
        copy: CopyFn<T>,
        destroy: DestroyFn<T>,
    },
}

struct Node<T> {
    data: Option<T>,
    next: Option<Box<Node<T>>>,
}

/// LIFO stack over a chain of owned nodes.
pub struct RefStack<T> {
    head: Option<Box<Node<T>>>,
    len: usize,
    mode: Mode<T>,
    last: Cell<Outcome>,
}

impl<T: Copy> RefStack<T> {
    /// Create an empty stack in alias mode
    pub fn new() -> Self {
        Self::from_mode(Mode::Alias(|data| *data))
    }

    /// Create an empty stack from an optional hook pair.
    ///
    /// Both hooks select deep-copy mode, neither selects alias mode, and
    /// exactly one is rejected with `InvalidArgs`.
    pub fn init(
        copy: Option<CopyFn<T>>,
        destroy: Option<DestroyFn<T>>,
    ) -> Result<Self, StackError> {
        let result = match (copy, destroy) {
            (None, None) => Ok(Self::new()),
            (Some(copy), Some(destroy)) => Ok(Self::from_mode(Mode::DeepCopy { copy, destroy })),
            _ => Err(StackError::InvalidArgs),
        };
        error::record(result)
    }
}

impl<T: Copy> Default for RefStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> RefStack<T> {
    /// Deep-copy stack whose hooks are `Clone::clone` and `drop`
    pub fn cloning() -> Self {
        Self::with_hooks(|data: &T| Some(data.clone()), drop)
    }
}

impl<T> RefStack<T> {
    /// Create an empty stack in deep-copy mode
    pub fn with_hooks(
        copy: impl Fn(&T) -> Option<T> + 'static,
        destroy: impl FnMut(T) + 'static,
    ) -> Self {
        Self::from_mode(Mode::DeepCopy {
            copy: Box::new(copy),
            destroy: Box::new(destroy),
        })
    }

    fn from_mode(mode: Mode<T>) -> Self {
        RefStack {
            head: None,
            len: 0,
            mode,
            last: Cell::new(Outcome::Ok),
        }
    }

    /// Whether pushes duplicate their input through the copy hook
    pub fn is_deep_copy(&self) -> bool {
        matches!(self.mode, Mode::DeepCopy { .. })
    }

    /// Push an element.
    ///
    /// In deep-copy mode `data` must be present and is duplicated; the caller
    /// keeps its original. In alias mode the handle itself is stored and
    /// `None` pushes a null payload.
    ///
    /// Fails with `NullData`, `CopyFailed` or `AllocFailed` and leaves the
    /// stack unchanged.
    pub fn push(&mut self, data: Option<&T>) -> Result<(), StackError> {
        let result = self.push_node(data);
        self.note(result)
    }

    fn push_node(&mut self, data: Option<&T>) -> Result<(), StackError> {
        let payload = match &self.mode {
            Mode::Alias(dup) => data.map(|data| dup(data)),
            Mode::DeepCopy { copy, .. } => {
                let data = data.ok_or(StackError::NullData)?;
                Some(copy(data).ok_or(StackError::CopyFailed)?)
            }
        };

        let node = Node {
            data: payload,
            next: None,
        };
        let mut node = match try_box(node) {
            Ok(node) => node,
            Err(node) => {
                // The copy was made for this push; don't leak it
                if let Some(data) = node.data {
                    self.release(data);
                }
                return Err(StackError::AllocFailed);
            }
        };

        node.next = self.head.take();
        self.head = Some(node);
        self.len += 1;
        tracing::trace!(len = self.len, "ref stack push");
        Ok(())
    }

    /// Detach the top element and hand its ownership to the caller.
    ///
    /// `Ok(None)` is a null payload pushed in alias mode.
    pub fn pop(&mut self) -> Result<Option<T>, StackError> {
        let result = match self.head.take() {
            None => Err(StackError::Empty),
            Some(node) => {
                let Node { data, next } = *node;
                self.head = next;
                self.len -= 1;
                tracing::trace!(len = self.len, "ref stack pop");
                Ok(data)
            }
        };
        self.note(result)
    }

    /// Borrow the top element without detaching it
    pub fn peek(&self) -> Result<Option<&T>, StackError> {
        let result = match &self.head {
            None => Err(StackError::Empty),
            Some(node) => Ok(node.data.as_ref()),
        };
        self.note(result)
    }

    pub fn is_empty(&self) -> bool {
        let _ = self.note(Ok(()));
        self.len == 0
    }

    /// Number of live nodes
    pub fn size(&self) -> usize {
        let _ = self.note(Ok(()));
        self.len
    }

    /// Release every node, running the destroy hook on each owned payload
    pub fn clear(&mut self) {
        self.release_all();
        let _ = self.note(Ok(()));
    }

    /// Clear the stack and release the handle
    pub fn destroy(mut self) {
        self.clear();
    }

    /// Outcome of the most recent operation on this handle
    pub fn last_outcome(&self) -> Outcome {
        self.last.get()
    }

    fn release_all(&mut self) {
        // Unlink iteratively; dropping a long chain recursively would overflow
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
            if let Some(data) = node.data.take() {
                self.release(data);
            }
        }
        self.len = 0;
    }

    fn release(&mut self, data: T) {
        if let Mode::DeepCopy { destroy, .. } = &mut self.mode {
            destroy(data);
        }
    }

    fn note<R>(&self, result: Result<R, StackError>) -> Result<R, StackError> {
        record_on(&self.last, result)
    }
}

impl<T> Drop for RefStack<T> {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl<T> fmt::Debug for RefStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefStack")
            .field("len", &self.len)
            .field("deep_copy", &self.is_deep_copy())
            .field("last", &self.last.get())
            .finish()
    }
}

/// Move `value` into a fresh heap allocation, handing it back if the
/// allocator refuses instead of aborting.
fn try_box<U>(value: U) -> Result<Box<U>, U> {
    let layout = Layout::new::<U>();
    if layout.size() == 0 {
        return Ok(Box::new(value));
    }
    let ptr = unsafe { alloc(layout) as *mut U };
    if ptr.is_null() {
        return Err(value);
    }
    unsafe {
        ptr.write(value);
        Ok(Box::from_raw(ptr))
    }
}
