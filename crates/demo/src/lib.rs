//! Example drivers for the lifo stacks
//!
//! - `config`: TOML configuration for the drivers
//! - `drivers`: reference-stack and pool-stack walkthroughs

pub mod config;
pub mod drivers;

pub use config::{DemoConfig, DynSection, PoolSection};
pub use drivers::{Product, run_dyn, run_pool};
