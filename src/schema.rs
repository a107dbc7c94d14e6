//! Schema emission: predicate declarations and type blocks.
//!
//! ```text
//! DataModel → translate_form() per form → PredicateEntry list
//!   → format_predicate() lines + format_type() blocks → schema text
//! ```
//!
//! [`translate_form`] is also the lookup the node translator uses, so a node
//! can only ever reference predicates emitted here.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::edges::build_edge_map;
use crate::model::{DataModel, Form};
use crate::naming::{to_predicate, to_type_name};
use crate::types::{resolve, TargetType};

/// Property names never translated.
pub const RESERVED_PROPS: &[&str] = &[".created", ".seen"];

/// One resolved predicate of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateEntry {
    pub predicate: String,
    pub target_type: TargetType,
    /// The primary predicate's own form, or a property's declared type name
    /// (the referenced form for references).
    pub origin: String,
}

/// Resolve every predicate a form contributes, primary first, then
/// properties in declaration order.
pub fn translate_form(form: &Form) -> Vec<PredicateEntry> {
    let mut entries = Vec::with_capacity(form.properties.len() + 1);

    if let Some(target_type) = resolve(&form.primary_type, true) {
        entries.push(PredicateEntry {
            predicate: to_predicate(&form.name),
            target_type,
            origin: form.name.clone(),
        });
    }

    let edges = build_edge_map(form);
    for prop in &form.properties {
        if RESERVED_PROPS.contains(&prop.name.as_str()) {
            continue;
        }
        let target_type = match edges.get(&prop.name) {
            Some(edge) => Some(edge.clone()),
            None => resolve(&prop.source_type, false),
        };
        let Some(target_type) = target_type else { continue };
        entries.push(PredicateEntry {
            predicate: to_predicate(&format!("{}.{}", form.name, prop.name)),
            target_type,
            origin: prop.source_type.name.clone(),
        });
    }

    tracing::debug!(form = %form.name, predicates = entries.len(), "form translated");
    entries
}

/// `<name>: <type> <index> .`, the index omitted for references and
/// placeholders.
pub fn format_predicate(name: &str, target_type: &TargetType) -> String {
    match target_type.index_clause() {
        Some(index) => format!("{name}: {target_type} {index} ."),
        None => format!("{name}: {target_type} ."),
    }
}

/// `type <TypeName> {` block listing one predicate per line.
pub fn format_type<S: AsRef<str>>(form_name: &str, predicates: &[S]) -> String {
    let lines: Vec<String> = predicates
        .iter()
        .map(|p| format!("    <{}>", p.as_ref()))
        .collect();
    format!("type {} {{\n{}\n}}\n", to_type_name(form_name), lines.join("\n"))
}

/// Full schema text: all predicate declarations, a blank line, all type
/// blocks, in model order. A predicate declared by an earlier form is not
/// repeated.
pub fn build_schema(model: &DataModel) -> String {
    let mut predicates = Vec::new();
    let mut declared = HashSet::new();
    let mut types = Vec::with_capacity(model.len());
    let mut unresolved = 0usize;

    for form in model.forms() {
        let entries = translate_form(form);
        for entry in &entries {
            if matches!(entry.target_type, TargetType::Unresolved(_)) {
                unresolved += 1;
            }
            if declared.insert(entry.predicate.clone()) {
                predicates.push(format_predicate(&entry.predicate, &entry.target_type));
            }
        }
        let names: Vec<&str> = entries.iter().map(|e| e.predicate.as_str()).collect();
        types.push(format_type(&form.name, &names));
    }

    let mut schema = predicates.join("\n");
    schema.push_str("\n\n");
    schema.push_str(&types.join("\n"));

    tracing::info!(
        forms = model.len(),
        predicates = predicates.len(),
        unresolved,
        "schema built"
    );
    schema
}
