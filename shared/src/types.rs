//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized material name used as the join key between kit material
/// lines, inventory items and vendor price entries.
///
/// Names are the primary cross-entity key in this system and are matched
/// case-insensitively with surrounding whitespace ignored. Building the
/// key once keeps every lookup going through the same normalization
/// instead of ad-hoc `to_lowercase` calls at each call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialKey(String);

impl MaterialKey {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaterialKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
