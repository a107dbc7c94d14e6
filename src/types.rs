//! Type mapping from source model classes to target storage types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::TypeDescriptor;

/// Implementation classes treated as scalar bases. Anything whose lineage
/// reaches none of these is a compound type, stored as a reference.
pub const PRIMITIVE_BASES: &[&str] = &[
    "Bool",
    "Comp",
    "Data",
    "Edge",
    "Guid",
    "Hex",
    "IntBase",
    "Latitude",
    "LatLong",
    "Loc",
    "Longitude",
    "StrBase",
];

/// Concrete class → scalar storage. `None` means the class has no scalar
/// representation and produces no predicate.
const SCALAR_TABLE: &[(&str, Option<TargetType>)] = &[
    ("Bool", Some(TargetType::Bool)),
    ("Comp", None),
    ("Data", Some(TargetType::String)),
    ("Edge", None),
    ("FileBytes", Some(TargetType::String)),
    ("Fqdn", Some(TargetType::String)),
    ("Guid", Some(TargetType::String)),
    ("Hex", Some(TargetType::String)),
    ("Imei", Some(TargetType::String)),
    ("Imsi", Some(TargetType::String)),
    ("IntBase", Some(TargetType::Int)),
    // Stored as a string, unlike the integer source representation.
    ("IPv4", Some(TargetType::String)),
    ("IPv6", Some(TargetType::String)),
    ("Latitude", Some(TargetType::Float)),
    ("LatLong", Some(TargetType::Geo)),
    ("Loc", Some(TargetType::String)),
    ("Longitude", Some(TargetType::Float)),
    ("Phone", Some(TargetType::String)),
    ("SemVer", Some(TargetType::String)),
    ("StrBase", Some(TargetType::String)),
];

/// Storage type of a predicate in the target database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Bool,
    Int,
    Float,
    String,
    Geo,
    /// Single reference (`uid`).
    Uid,
    /// List of references (`[uid]`).
    UidList,
    /// No mapping exists for this source class yet.
    Unresolved(String),
}

impl TargetType {
    pub fn is_reference(&self) -> bool {
        matches!(self, TargetType::Uid | TargetType::UidList)
    }

    /// Index directive for the predicate declaration, if the type gets one.
    pub fn index_clause(&self) -> Option<&'static str> {
        match self {
            TargetType::Bool => Some("@index(bool)"),
            TargetType::Float => Some("@index(float)"),
            TargetType::Geo => Some("@index(geo)"),
            TargetType::Int => Some("@index(int)"),
            TargetType::String => Some("@index(hash)"),
            TargetType::Uid | TargetType::UidList | TargetType::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Bool => write!(f, "bool"),
            TargetType::Int => write!(f, "int"),
            TargetType::Float => write!(f, "float"),
            TargetType::String => write!(f, "string"),
            TargetType::Geo => write!(f, "geo"),
            TargetType::Uid => write!(f, "uid"),
            TargetType::UidList => write!(f, "[uid]"),
            TargetType::Unresolved(class) => write!(f, "TODO {class}"),
        }
    }
}

/// The class a type resolves against: the nearest primitive base in its
/// lineage, or the top-most class when no primitive base is present.
pub fn base_class(ty: &TypeDescriptor) -> &str {
    let mut top = ty.name.as_str();
    for class in ty.classes() {
        if PRIMITIVE_BASES.contains(&class) {
            return class;
        }
        top = class;
    }
    top
}

/// Resolve a type to its storage type.
///
/// With `is_form` false, compound types become single references. With
/// `is_form` true a scalar is always looked up, since a primary value is
/// never a reference.
pub fn resolve(ty: &TypeDescriptor, is_form: bool) -> Option<TargetType> {
    let base = base_class(ty);
    if !is_form && !PRIMITIVE_BASES.contains(&base) {
        return Some(TargetType::Uid);
    }
    match SCALAR_TABLE.iter().find(|(class, _)| *class == base) {
        Some((_, target)) => target.clone(),
        None => {
            tracing::warn!(ty = %ty.name, class = base, "no storage mapping for class");
            Some(TargetType::Unresolved(base.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &str, lineage: &[&str]) -> TypeDescriptor {
        TypeDescriptor::new(name).with_lineage(lineage.iter().copied())
    }

    #[test]
    fn test_int_form() {
        let ipv4 = ty("inet:ipv4", &["IPv4", "IntBase"]);
        assert_eq!(base_class(&ipv4), "IntBase");
        assert_eq!(resolve(&ipv4, true), Some(TargetType::Int));
    }

    #[test]
    fn test_primitive_property_stays_scalar() {
        let port = ty("inet:port", &["IntBase"]);
        assert_eq!(resolve(&port, false), Some(TargetType::Int));
        let lat = ty("geo:latitude", &["Latitude"]);
        assert_eq!(resolve(&lat, false), Some(TargetType::Float));
        let latlong = ty("geo:latlong", &["LatLong"]);
        assert_eq!(resolve(&latlong, false), Some(TargetType::Geo));
    }

    #[test]
    fn test_compound_property_is_reference() {
        let fqdn = ty("inet:fqdn", &["Fqdn"]);
        assert_eq!(resolve(&fqdn, false), Some(TargetType::Uid));
    }

    #[test]
    fn test_compound_form_uses_concrete_table() {
        let fqdn = ty("inet:fqdn", &["Fqdn"]);
        assert_eq!(resolve(&fqdn, true), Some(TargetType::String));
        let bytes = ty("file:bytes", &["FileBytes"]);
        assert_eq!(resolve(&bytes, true), Some(TargetType::String));
    }

    #[test]
    fn test_comp_form_has_no_predicate() {
        let comp = ty("inet:dns:a", &["Comp"]);
        assert_eq!(resolve(&comp, true), None);
        let edge = ty("refs", &["Edge"]);
        assert_eq!(resolve(&edge, true), None);
    }

    #[test]
    fn test_unmapped_class_is_placeholder() {
        let time = ty("time", &["Time"]);
        let resolved = resolve(&time, true).unwrap();
        assert_eq!(resolved, TargetType::Unresolved("Time".into()));
        assert_eq!(resolved.to_string(), "TODO Time");
        assert_eq!(resolved.index_clause(), None);
    }

    #[test]
    fn test_empty_lineage_resolves_by_name() {
        assert_eq!(resolve(&TypeDescriptor::new("StrBase"), false), Some(TargetType::String));
        assert_eq!(resolve(&TypeDescriptor::new("inet:fqdn"), false), Some(TargetType::Uid));
    }

    #[test]
    fn test_primitive_form_never_reference() {
        for base in PRIMITIVE_BASES {
            let resolved = resolve(&ty("x", &[*base]), true);
            assert!(!resolved.is_some_and(|t| t.is_reference()), "{base} resolved to a reference");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetType::Uid.to_string(), "uid");
        assert_eq!(TargetType::UidList.to_string(), "[uid]");
        assert_eq!(TargetType::String.index_clause(), Some("@index(hash)"));
    }
}
