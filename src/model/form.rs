//! Forms, their properties, and type descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Declarative stand-in for a type's implementation class hierarchy.
///
/// `name` is the model-level type name (for a form-typed property this is the
/// referenced form). `lineage` lists implementation classes most specific
/// first, ending at the class directly below the root type. An empty lineage
/// means the type is its own (and only) class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub lineage: SmallVec<[String; 4]>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), lineage: SmallVec::new() }
    }

    pub fn with_lineage(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.lineage = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Class chain to walk, most specific first.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        let own = self.lineage.is_empty().then_some(self.name.as_str());
        own.into_iter().chain(self.lineage.iter().map(String::as_str))
    }
}

/// A named, typed attribute or reference belonging to a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: TypeDescriptor,
    /// Name of the form that declares this property. Filled in by the model
    /// when omitted from the input.
    #[serde(default)]
    pub defining_form: String,
}

impl Property {
    pub fn new(name: impl Into<String>, source_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            source_type,
            defining_form: String::new(),
        }
    }
}

/// A node kind with a typed primary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub name: String,
    #[serde(rename = "type")]
    pub primary_type: TypeDescriptor,
    /// Declaration order is significant: it is the predicate order.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Reference collection name → property names.
    #[serde(default)]
    pub out_refs: BTreeMap<String, Vec<String>>,
}

impl Form {
    pub fn new(name: impl Into<String>, primary_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            primary_type,
            properties: Vec::new(),
            out_refs: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, source_type: TypeDescriptor) -> Self {
        let mut prop = Property::new(name, source_type);
        prop.defining_form = self.name.clone();
        self.properties.push(prop);
        self
    }

    pub fn with_ref(mut self, collection: impl Into<String>, prop: impl Into<String>) -> Self {
        self.out_refs.entry(collection.into()).or_default().push(prop.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}
