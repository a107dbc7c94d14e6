//! Edge classification from a form's declared outbound references.

use hashbrown::HashMap;

use crate::model::Form;
use crate::types::TargetType;

/// Reference collection whose members are multi-valued.
pub const ARRAY_COLLECTION: &str = "array";

/// Property name → reference cardinality.
pub type EdgeMap = HashMap<String, TargetType>;

/// Classify every property a form reports as an outbound reference.
///
/// Cardinality comes from the collection name alone; the property's own type
/// is not consulted.
pub fn build_edge_map(form: &Form) -> EdgeMap {
    let mut edges = EdgeMap::new();
    for (collection, members) in &form.out_refs {
        let target = if collection == ARRAY_COLLECTION {
            TargetType::UidList
        } else {
            TargetType::Uid
        };
        for member in members {
            edges.insert(member.clone(), target.clone());
        }
    }
    edges
}
