//! Driver configuration
//!
//! Loaded from an optional TOML file; command-line flags override it.
//!
//! ```toml
//! [pool]
//! capacity = 5
//!
//! [dyn]
//! items = ["Apple", "Banana", "Cherry"]
//! deep_copy = true
//! ```

use serde::Deserialize;
use std::path::Path;

/// Default pool capacity for the pool driver
pub const DEFAULT_DEMO_CAPACITY: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub pool: PoolSection,
    #[serde(rename = "dyn")]
    pub dyn_stack: DynSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSection {
    /// Slots in the product pool
    pub capacity: usize,
}

impl Default for PoolSection {
    fn default() -> Self {
        PoolSection {
            capacity: DEFAULT_DEMO_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DynSection {
    /// Strings pushed by the reference-stack driver
    pub items: Vec<String>,
    /// Deep-copy the items (false aliases them)
    pub deep_copy: bool,
}

impl Default for DynSection {
    fn default() -> Self {
        DynSection {
            items: vec!["Apple".into(), "Banana".into(), "Cherry".into()],
            deep_copy: true,
        }
    }
}

impl DemoConfig {
    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse demo config: {}", e))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }
}
