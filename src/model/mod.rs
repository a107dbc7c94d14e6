//! # Source Data Model
//!
//! Clean DTOs for the introspected object model and the node instances that
//! get translated.
//!
//! Design rule: NO target-database types here. This module is pure data plus
//! the read-only provider contract.

pub mod form;
pub mod node;
pub mod value;
pub mod property_map;
pub mod provider;

pub use form::{Form, Property, TypeDescriptor};
pub use node::Node;
pub use value::Value;
pub use property_map::PropertyMap;
pub use provider::{DataModel, JsonModel, ModelDocument, ModelProvider, StaticModel};
