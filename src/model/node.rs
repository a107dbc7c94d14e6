//! Node instance awaiting translation.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};

/// A concrete node: a form name, its primary value, and the secondary
/// properties actually present on the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub form: String,
    pub primary: Value,
    #[serde(default)]
    pub props: PropertyMap,
}

impl Node {
    pub fn new(form: impl Into<String>, primary: impl Into<Value>) -> Self {
        Self {
            form: form.into(),
            primary: primary.into(),
            props: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }
}
