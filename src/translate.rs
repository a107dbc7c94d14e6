//! Node translation: one node instance into mutation entries.
//!
//! Entries come out in a fixed order: the unique primary entry (when the form
//! has a primary predicate), the type declaration, then one entry per present
//! secondary property that maps to a predicate of the form.
//!
//! An edge is only emitted when its object can be looked up: the referenced
//! form must be in the model with an indexed primary predicate.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{DataModel, Form, Node, Value};
use crate::naming::{to_predicate, to_type_name};
use crate::schema::{translate_form, PredicateEntry};
use crate::types::{resolve, TargetType};
use crate::{Error, Result};

/// Predicate the target database reserves for type membership.
pub const TYPE_PREDICATE: &str = "dgraph.type";

/// One fact to write about a node.
///
/// Every field is always present; fields that do not apply hold their
/// defaults (`None`, `false`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEntry {
    /// `None` for the type declaration.
    pub predicate: Option<String>,
    pub value: Value,
    pub unique: bool,
    /// Storage type of the predicate; `None` for the type declaration.
    pub target_type: Option<TargetType>,
    /// Source form the value belongs to.
    pub form: String,
    pub is_edge: bool,
    /// Primary predicate of the referenced form, set only for edges.
    pub edge_predicate: Option<String>,
}

impl MutationEntry {
    fn type_declaration(form: &str) -> Self {
        Self {
            predicate: None,
            value: Value::String(to_type_name(form)),
            unique: false,
            target_type: None,
            form: form.to_string(),
            is_edge: false,
            edge_predicate: None,
        }
    }

    /// The predicate as written in statement text.
    pub fn predicate_name(&self) -> &str {
        self.predicate.as_deref().unwrap_or(TYPE_PREDICATE)
    }
}

/// Primary predicate an edge object is bound by. `None` when the referenced
/// form is unknown or its primary predicate is missing or unindexed.
pub fn edge_target(model: &DataModel, referenced: &str) -> Option<String> {
    let form = model.get_form(referenced).ok()?;
    resolve(&form.primary_type, true)?.index_clause()?;
    Some(to_predicate(&form.name))
}

/// Predicate name → resolved entry, for one form.
struct PredicateLookup<'a> {
    entries: HashMap<&'a str, &'a PredicateEntry>,
    model: &'a DataModel,
}

impl<'a> PredicateLookup<'a> {
    fn new(entries: &'a [PredicateEntry], model: &'a DataModel) -> Self {
        Self {
            entries: entries.iter().map(|e| (e.predicate.as_str(), e)).collect(),
            model,
        }
    }

    fn matched(&self, predicate: &str, form: &str, value: &Value) -> Option<MutationEntry> {
        let entry = self.entries.get(predicate)?;
        let is_edge = entry.target_type.is_reference();
        let edge_predicate = if is_edge {
            if entry.target_type == TargetType::Uid && value.is_list() {
                tracing::warn!(form, predicate, "list value on a single reference");
                return None;
            }
            match edge_target(self.model, &entry.origin) {
                Some(target) => Some(target),
                None => {
                    tracing::debug!(form, predicate, target = %entry.origin, "edge target has no lookup predicate");
                    return None;
                }
            }
        } else {
            None
        };
        Some(MutationEntry {
            predicate: Some(entry.predicate.clone()),
            value: value.clone(),
            unique: false,
            target_type: Some(entry.target_type.clone()),
            form: form.to_string(),
            is_edge,
            edge_predicate,
        })
    }
}

/// Translate a node against the model. Fails with `NotFound` when the node's
/// form is not in the model.
pub fn translate_node(node: &Node, model: &DataModel) -> Result<Vec<MutationEntry>> {
    let form = model.get_form(&node.form)?;
    translate_node_with_form(node, form, model)
}

/// Translate a node against an already resolved form. `model` supplies the
/// forms its edges point at.
pub fn translate_node_with_form(node: &Node, form: &Form, model: &DataModel) -> Result<Vec<MutationEntry>> {
    if node.form != form.name {
        return Err(Error::Model(format!(
            "node of form '{}' translated against form '{}'",
            node.form, form.name
        )));
    }

    let predicates = translate_form(form);
    let lookup = PredicateLookup::new(&predicates, model);
    let mut out = Vec::with_capacity(node.props.len() + 2);

    if let Some(mut primary) = lookup.matched(&to_predicate(&form.name), &form.name, &node.primary) {
        primary.unique = true;
        out.push(primary);
    }

    out.push(MutationEntry::type_declaration(&form.name));

    for (key, value) in &node.props {
        let path = format!("{}.{}", form.name, key);
        // A doubled separator marks a global property not owned by the form.
        if path.contains("..") {
            tracing::trace!(form = %form.name, prop = %key, "skipping global property");
            continue;
        }
        if value.is_null() {
            tracing::trace!(form = %form.name, prop = %key, "skipping null property");
            continue;
        }
        match lookup.matched(&to_predicate(&path), &form.name, value) {
            Some(entry) => out.push(entry),
            None => tracing::trace!(form = %form.name, prop = %key, "no predicate for property"),
        }
    }

    tracing::debug!(form = %form.name, entries = out.len(), "node translated");
    Ok(out)
}
