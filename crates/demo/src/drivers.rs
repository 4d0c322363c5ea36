//! Walkthroughs of both stack variants
//!
//! Each driver returns a transcript of what it did; failures propagate as the
//! stack outcome that caused them.

use lifo_core::{RefStack, StackError, TypedPool, check};
use std::fmt::{self, Write};

/// A fixed-layout record for the pool driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub id: i32,
    name: [u8; 20],
    pub price: f64,
}

impl Product {
    /// Names longer than 19 bytes are truncated at a character boundary
    pub fn new(id: i32, name: &str, price: f64) -> Self {
        let mut buf = [0u8; 20];
        let mut len = name.len().min(buf.len() - 1);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        Product {
            id,
            name: buf,
            price,
        }
    }

    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        std::str::from_utf8(&self.name[..end]).unwrap_or("?")
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {}, ${:.2})", self.name(), self.id, self.price)
    }
}

/// Push `items` onto a reference stack, peek, then drain it.
///
/// With `deep_copy` the stack owns duplicates of the strings; otherwise it
/// holds references to `items` themselves.
pub fn run_dyn(items: &[String], deep_copy: bool) -> Result<String, StackError> {
    let mut out = String::from("=== Dynamic Stack Example ===\n");
    if deep_copy {
        let stack = RefStack::<String>::cloning();
        drive_ref_stack(stack, items.iter(), &mut out)?;
    } else {
        let stack = RefStack::<&str>::new();
        let views: Vec<&str> = items.iter().map(String::as_str).collect();
        drive_ref_stack(stack, views.iter(), &mut out)?;
    }
    Ok(out)
}

fn drive_ref_stack<'a, T>(
    mut stack: RefStack<T>,
    items: impl Iterator<Item = &'a T>,
    out: &mut String,
) -> Result<(), StackError>
where
    T: fmt::Display + 'a,
{
    let mode = if stack.is_deep_copy() { "deep copy" } else { "alias" };
    let _ = writeln!(out, "Pushing items ({mode}):");
    for item in items {
        let _ = writeln!(out, "- {item}");
        check(stack.push(Some(item)), "push")?;
    }

    let _ = writeln!(out, "\nStack size: {}", stack.size());
    if let Some(top) = check(stack.peek(), "peek")? {
        let _ = writeln!(out, "Top element (peek): {top}");
    }

    let _ = writeln!(out, "\nPopping all elements:");
    while let Ok(popped) = stack.pop() {
        match popped {
            Some(item) => {
                let _ = writeln!(out, "- {item}");
            }
            None => {
                let _ = writeln!(out, "- (null)");
            }
        }
    }

    let _ = writeln!(out, "\nStack is empty: {}", stack.is_empty());
    stack.destroy();
    tracing::info!("dynamic stack walkthrough finished");
    Ok(())
}

/// Push three products into a typed pool, peek, drain, then show that one
/// more pop reports `Empty`.
pub fn run_pool(capacity: usize) -> Result<String, StackError> {
    let products = [
        Product::new(1, "Laptop", 999.99),
        Product::new(2, "Phone", 699.99),
        Product::new(3, "Tablet", 399.99),
    ];
    let mut out = String::from("=== Memory Pool Stack Example ===\n");

    let mut stack = check(TypedPool::<Product>::init(capacity), "init")?;

    let _ = writeln!(out, "Pushing products to stack:");
    for product in &products {
        let _ = writeln!(out, "- {product}");
        check(stack.push(*product), "push")?;
    }

    let _ = writeln!(
        out,
        "\nStack size: {} (capacity: {})",
        stack.size(),
        stack.capacity()
    );
    let top = check(stack.peek(), "peek")?;
    let _ = writeln!(out, "Top element (peek): {}", top.name());

    let _ = writeln!(out, "\nPopping all elements:");
    while let Ok(product) = stack.pop() {
        let _ = writeln!(out, "- {product}");
    }

    let verdict = match stack.pop() {
        Err(StackError::Empty) => "EMPTY (correct)",
        _ => "WRONG RESULT",
    };
    let _ = writeln!(out, "\nTrying to pop from empty stack: {verdict}");

    let stats = stack.stats();
    tracing::info!(peak = stats.peak, bytes = stats.bytes, "pool walkthrough finished");
    stack.destroy();
    Ok(out)
}
