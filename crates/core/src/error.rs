//! Stack Outcome Codes
//!
//! Every stack operation reports exactly one outcome: success, or the first
//! precondition it found violated. The outcome is returned directly as a
//! `Result<_, StackError>`; that return value is the source of truth.
//!
//! For callers that want to inspect "what happened last" without threading the
//! result around, outcomes are also recorded in two advisory places:
//!
//! - on the stack handle itself (`last_outcome()` on each stack type), so that
//!   independent stacks never overwrite each other's diagnostics
//! - in a thread-local cell (`last()`), which backs the C ABI's
//!   `stack_get_last_error`
//!
//! # Usage
//!
//! ```ignore
//! let value = check(stack.pop(), "pop")?;   // logs and propagates failures
//! if last() == Outcome::Err(StackError::Empty) {
//!     // ...
//! }
//! ```

use std::cell::Cell;
use std::fmt;

/// Why a stack operation did not complete.
///
/// The discriminants are the stable numeric codes exported through the C ABI;
/// `0` is reserved for success (see [`Outcome::Ok`]).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackError {
    /// The stack handle itself is absent
    NullHandle = 1,
    /// The stack variant could not be determined
    InvalidType = 2,
    /// Malformed construction or call parameters
    InvalidArgs = 3,
    /// Memory for a node or the pool buffer could not be obtained
    AllocFailed = 4,
    /// The deep-copy hook reported failure
    CopyFailed = 5,
    /// The stack holds no elements
    Empty = 6,
    /// The pool has no free slot left
    Full = 7,
    /// No destination was supplied for the result
    NullOutput = 8,
    /// No source data was supplied where data is required
    NullData = 9,
    /// Unclassified failure
    Unknown = 10,
}

impl StackError {
    /// Every failure variant, in code order
    pub const ALL: [StackError; 10] = [
        StackError::NullHandle,
        StackError::InvalidType,
        StackError::InvalidArgs,
        StackError::AllocFailed,
        StackError::CopyFailed,
        StackError::Empty,
        StackError::Full,
        StackError::NullOutput,
        StackError::NullData,
        StackError::Unknown,
    ];

    /// Stable numeric code
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Stable symbolic name, as used by the C headers
    pub const fn name(self) -> &'static str {
        match self {
            StackError::NullHandle => "STACK_NULL_PTR",
            StackError::InvalidType => "STACK_INVALID_TYPE",
            StackError::InvalidArgs => "STACK_INVALID_ARGS",
            StackError::AllocFailed => "STACK_ALLOC_FAILED",
            StackError::CopyFailed => "STACK_DATA_COPY_FAILED",
            StackError::Empty => "STACK_EMPTY",
            StackError::Full => "STACK_FULL",
            StackError::NullOutput => "STACK_NULL_OUT",
            StackError::NullData => "STACK_NULL_DATA",
            StackError::Unknown => "STACK_UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StackError::NullHandle => "stack handle is null",
            StackError::InvalidType => "stack type could not be determined",
            StackError::InvalidArgs => "invalid arguments",
            StackError::AllocFailed => "memory allocation failed",
            StackError::CopyFailed => "element copy failed",
            StackError::Empty => "stack is empty",
            StackError::Full => "stack is full",
            StackError::NullOutput => "output destination is null",
            StackError::NullData => "input data is null",
            StackError::Unknown => "unknown error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for StackError {}

/// The closed set of outcomes: success or one [`StackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    Ok,
    Err(StackError),
}

impl Outcome {
    /// Stable numeric code (`0` for success)
    pub const fn code(self) -> i32 {
        match self {
            Outcome::Ok => 0,
            Outcome::Err(err) => err.code(),
        }
    }

    /// Decode a numeric code; anything out of range is `Unknown`.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            return Outcome::Ok;
        }
        StackError::ALL
            .iter()
            .copied()
            .find(|err| err.code() == code)
            .map_or(Outcome::Err(StackError::Unknown), Outcome::Err)
    }

    /// Stable symbolic name
    pub const fn name(self) -> &'static str {
        match self {
            Outcome::Ok => "STACK_OK",
            Outcome::Err(err) => err.name(),
        }
    }

    /// Whether this is the success outcome
    pub const fn is_ok(self) -> bool {
        matches!(self, Outcome::Ok)
    }

    /// The outcome a result represents
    pub fn of<T>(result: &Result<T, StackError>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(err) => Outcome::Err(*err),
        }
    }

    /// Back into a `Result`, for `?` at call sites that hold a raw outcome
    pub fn into_result(self) -> Result<(), StackError> {
        match self {
            Outcome::Ok => Ok(()),
            Outcome::Err(err) => Err(err),
        }
    }
}

impl From<StackError> for Outcome {
    fn from(err: StackError) -> Self {
        Outcome::Err(err)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => f.write_str("ok"),
            Outcome::Err(err) => err.fmt(f),
        }
    }
}

thread_local! {
    /// Outcome of the most recent stack operation on this thread
    static LAST_OUTCOME: Cell<Outcome> = const { Cell::new(Outcome::Ok) };
}

/// Record `result` as the thread's most recent outcome and hand it back
pub fn record<T>(result: Result<T, StackError>) -> Result<T, StackError> {
    let outcome = Outcome::of(&result);
    if let Outcome::Err(err) = outcome {
        tracing::debug!(code = err.code(), "stack operation failed: {}", err.name());
    }
    LAST_OUTCOME.with(|cell| cell.set(outcome));
    result
}

/// Record on a handle's own cell as well as the thread-local one
pub(crate) fn record_on<T>(
    slot: &Cell<Outcome>,
    result: Result<T, StackError>,
) -> Result<T, StackError> {
    slot.set(Outcome::of(&result));
    record(result)
}

/// Most recently recorded outcome on this thread
pub fn last() -> Outcome {
    LAST_OUTCOME.with(|cell| cell.get())
}

/// Reset the thread-local cell to `Ok`
pub fn reset() {
    LAST_OUTCOME.with(|cell| cell.set(Outcome::Ok));
}

/// Log a failed outcome with its call-site context and pass the result on.
///
/// Intended for `?` chains in application code:
/// `let top = check(stack.peek(), "peek")?;`
pub fn check<T>(result: Result<T, StackError>, context: &str) -> Result<T, StackError> {
    if let Err(err) = &result {
        tracing::warn!("error in {}: {}", context, err.name());
    }
    result
}
