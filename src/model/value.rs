//! Universal value type carried by node instances.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A primary or secondary property value on a node instance.
///
/// Covers the scalar types the target database stores natively:
/// - Scalars: Bool, Int, Float, String
/// - Containers: List (multi-valued references)
/// - Spatial: Geo (latitude/longitude point)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Geo { lat: f64, lon: f64 },
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::List(_) => "LIST",
            Value::Geo { .. } => "GEO",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
    pub fn is_list(&self) -> bool { matches!(self, Value::List(_)) }

    /// Attempt to extract as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Iterate the scalar members: a list yields its items, anything else
    /// yields itself once.
    pub fn members(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Value::List(items) => Box::new(items.iter()),
            other => Box::new(std::iter::once(other)),
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// Display
// ============================================================================

/// Renders the bare lexical form, without quoting. Quoting and escaping for
/// statement text happens in [`crate::mutation`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Geo { lat, lon } => {
                write!(f, "{{\"type\":\"Point\",\"coordinates\":[{lon},{lat}]}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(2.5), Value::Float(2.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_untagged_json() {
        let v: Value = serde_json::from_str("16909060").unwrap();
        assert_eq!(v, Value::Int(16909060));

        let v: Value = serde_json::from_str(r#"["a.com", "b.com"]"#).unwrap();
        assert_eq!(v, Value::from(vec!["a.com", "b.com"]));

        let v: Value = serde_json::from_str(r#"{"lat": 1.5, "lon": -2.0}"#).unwrap();
        assert_eq!(v, Value::Geo { lat: 1.5, lon: -2.0 });
    }

    #[test]
    fn test_members() {
        let list = Value::from(vec![1i64, 2, 3]);
        assert_eq!(list.members().count(), 3);
        assert_eq!(Value::Int(7).members().collect::<Vec<_>>(), vec![&Value::Int(7)]);
    }

    #[test]
    fn test_geo_display_is_geojson() {
        let v = Value::Geo { lat: 10.0, lon: 20.5 };
        assert_eq!(v.to_string(), r#"{"type":"Point","coordinates":[20.5,10]}"#);
    }
}
