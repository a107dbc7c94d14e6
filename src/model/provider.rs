//! # Model Provider
//!
//! The contract between graft and whatever introspects the source object
//! model. A provider only has to list forms; [`DataModel`] indexes them.
//!
//! ## Implementations
//!
//! | Provider | Description |
//! |----------|-------------|
//! | `StaticModel` | Forms built in code, for tests and embedding |
//! | `JsonModel` | Forms loaded from a JSON model description |

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::Form;
use crate::{Error, Result};

// ============================================================================
// Provider trait
// ============================================================================

/// Read-only source of forms.
pub trait ModelProvider: Send + Sync {
    /// All forms, in the provider's iteration order.
    fn list_forms(&self) -> Result<Vec<Form>>;

    /// One form by name. The default scans `list_forms`.
    fn get_form(&self, name: &str) -> Result<Form> {
        self.list_forms()?
            .into_iter()
            .find(|form| form.name == name)
            .ok_or_else(|| Error::NotFound(format!("Form '{name}'")))
    }
}

// ============================================================================
// DataModel
// ============================================================================

/// A loaded, immutable model: forms in provider order plus a name index.
#[derive(Debug, Clone, Default)]
pub struct DataModel {
    forms: Vec<Form>,
    index: HashMap<String, usize>,
}

impl DataModel {
    /// Index a list of forms. Duplicate form names are rejected.
    pub fn from_forms(forms: Vec<Form>) -> Result<Self> {
        let mut index = HashMap::with_capacity(forms.len());
        let mut forms = forms;
        for (i, form) in forms.iter_mut().enumerate() {
            if index.insert(form.name.clone(), i).is_some() {
                return Err(Error::Model(format!("duplicate form '{}'", form.name)));
            }
            for prop in &mut form.properties {
                if prop.defining_form.is_empty() {
                    prop.defining_form = form.name.clone();
                }
            }
        }
        Ok(Self { forms, index })
    }

    /// Load everything a provider lists.
    pub fn load<P: ModelProvider + ?Sized>(provider: &P) -> Result<Self> {
        let model = Self::from_forms(provider.list_forms()?)?;
        tracing::info!(forms = model.len(), "data model loaded");
        Ok(model)
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn get_form(&self, name: &str) -> Result<&Form> {
        self.index
            .get(name)
            .map(|&i| &self.forms[i])
            .ok_or_else(|| Error::NotFound(format!("Form '{name}'")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

// ============================================================================
// StaticModel
// ============================================================================

/// Forms assembled in code.
#[derive(Debug, Clone, Default)]
pub struct StaticModel {
    forms: Vec<Form>,
}

impl StaticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.forms.push(form);
        self
    }
}

impl ModelProvider for StaticModel {
    fn list_forms(&self) -> Result<Vec<Form>> {
        Ok(self.forms.clone())
    }
}

// ============================================================================
// JsonModel
// ============================================================================

/// On-disk shape of a JSON model description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub forms: Vec<Form>,
}

/// Where a JSON model comes from.
#[derive(Debug, Clone)]
pub enum JsonModel {
    File(PathBuf),
    Text(String),
}

impl JsonModel {
    pub fn file(path: impl AsRef<Path>) -> Self {
        JsonModel::File(path.as_ref().to_path_buf())
    }

    pub fn text(json: impl Into<String>) -> Self {
        JsonModel::Text(json.into())
    }
}

impl ModelProvider for JsonModel {
    fn list_forms(&self) -> Result<Vec<Form>> {
        let doc: ModelDocument = match self {
            JsonModel::File(path) => {
                tracing::debug!(path = %path.display(), "reading model description");
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            JsonModel::Text(json) => serde_json::from_str(json)?,
        };
        Ok(doc.forms)
    }
}
