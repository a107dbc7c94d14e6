//! # graft: Object Model → Dgraph Translation
//!
//! Translates an introspected form/property data model into artifacts a
//! predicate-based graph database consumes: schema text and per-node upsert
//! mutations.
//!
//! ## Design Principles
//!
//! 1. **One resolution pass**: schema emission and node translation share
//!    `schema::translate_form`, so a node never references an undeclared
//!    predicate
//! 2. **Pure core**: naming, type mapping, schema and node translation do no
//!    I/O and hold no state
//! 3. **Trait seams**: `ModelProvider` feeds the model, `MutationSink` takes
//!    the output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graft::{Graft, Node};
//!
//! # fn example() -> graft::Result<()> {
//! let graft = Graft::open_json("model.json");
//!
//! let schema = graft.schema()?;
//! println!("{schema}");
//!
//! let node = Node::new("inet:ipv4", 16909060i64);
//! for entry in graft.translate_node(&node)? {
//!     println!("{entry:?}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod naming;
pub mod types;
pub mod edges;
pub mod schema;
pub mod translate;
pub mod mutation;
pub mod sink;
pub mod config;

use std::path::Path;

use once_cell::sync::OnceCell;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    DataModel, Form, JsonModel, ModelProvider, Node, Property, PropertyMap,
    StaticModel, TypeDescriptor, Value,
};
pub use types::TargetType;
pub use schema::PredicateEntry;
pub use translate::MutationEntry;
pub use mutation::{Mutation, Upsert};
pub use sink::{MemorySink, MutationSink, Response, RetryPolicy, Uploader};
pub use config::GraftConfig;

// ============================================================================
// Top-level context
// ============================================================================

/// The translation context. Owns a model provider and the model it loads,
/// which is read once on first use and kept for the life of the context.
pub struct Graft<P: ModelProvider> {
    provider: P,
    model: OnceCell<DataModel>,
}

impl<P: ModelProvider> Graft<P> {
    /// Create a context over the given provider. Nothing is loaded yet.
    pub fn with_provider(provider: P) -> Self {
        Self { provider, model: OnceCell::new() }
    }

    /// The loaded model. The first caller loads it; concurrent first callers
    /// block until that load finishes. A failed load is not cached.
    pub fn model(&self) -> Result<&DataModel> {
        self.model.get_or_try_init(|| DataModel::load(&self.provider))
    }

    /// Full schema text for every form.
    pub fn schema(&self) -> Result<String> {
        Ok(schema::build_schema(self.model()?))
    }

    /// Predicates contributed by one form.
    pub fn translate_form(&self, form_name: &str) -> Result<Vec<PredicateEntry>> {
        let form = self.model()?.get_form(form_name)?;
        Ok(schema::translate_form(form))
    }

    /// Mutation entries for one node.
    pub fn translate_node(&self, node: &Node) -> Result<Vec<MutationEntry>> {
        translate::translate_node(node, self.model()?)
    }

    /// Upsert statements for one node.
    pub fn upsert(&self, node: &Node) -> Result<Upsert> {
        Ok(mutation::build_upsert(&self.translate_node(node)?))
    }

    /// Build the schema and send it to a sink.
    pub async fn publish_schema<S: MutationSink>(&self, uploader: &Uploader<S>) -> Result<()> {
        let schema = self.schema()?;
        uploader.set_schema(&schema).await
    }

    /// Translate a node and submit it as an upsert.
    pub async fn ingest<S: MutationSink>(&self, uploader: &Uploader<S>, node: &Node) -> Result<Response> {
        let upsert = self.upsert(node)?;
        uploader.upsert(&upsert).await
    }

    /// Access the provider (for advanced use).
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Context over a JSON model description.
impl Graft<JsonModel> {
    pub fn open_json(path: impl AsRef<Path>) -> Self {
        Self::with_provider(JsonModel::file(path))
    }

    /// Context over the model file named in the configuration.
    pub fn from_config(config: &GraftConfig) -> Result<Self> {
        let path = config
            .model
            .path
            .as_ref()
            .ok_or_else(|| Error::Config("model.path is not set".into()))?;
        Ok(Self::open_json(path))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Optimistic-concurrency conflict on one transaction attempt.
    #[error("Transaction aborted: {0}")]
    Aborted(String),

    /// Any other error reported by a sink.
    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Uploader {idx}: still conflicting after {attempts} attempts")]
    SinkConflict { idx: u64, attempts: u32 },

    #[error("Uploader {idx}: {source}")]
    SinkFailure {
        idx: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
