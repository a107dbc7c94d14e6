//! PropertyMap: the secondary properties present on a node instance.

use std::collections::BTreeMap;
use super::Value;

/// A map of property names to values.
///
/// Ordered by name so translation output is deterministic for a given node.
pub type PropertyMap = BTreeMap<String, Value>;
