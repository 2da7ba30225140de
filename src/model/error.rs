//! Error types for graph mutations
//!
//! Every variant describes a request that was rejected before anything was
//! changed. The interactive layer treats them as silent no-ops.

use thiserror::Error;

/// Reasons a graph mutation was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The targeted entity does not exist
    #[error("{table} '{id}' not found")]
    NotFound { table: &'static str, id: String },

    /// A field refers to an entity that does not exist
    #[error("{field} refers to unknown {table} '{id}'")]
    InvalidReference {
        field: &'static str,
        table: &'static str,
        id: String,
    },

    /// The document has no active flow to edit
    #[error("no active flow")]
    NoActiveFlow,

    /// A connection from an element to itself
    #[error("connection from '{id}' to itself")]
    SelfLoop { id: String },

    /// A connection with the same ordered endpoints already exists
    #[error("connection '{from}' -> '{to}' already exists")]
    DuplicateEdge { from: String, to: String },

    /// Re-parenting would make the sitemap cyclic
    #[error("moving page '{page}' under '{parent}' would create a cycle")]
    SitemapCycle { page: String, parent: String },
}

impl GraphError {
    pub fn not_found(table: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            table,
            id: id.into(),
        }
    }

    pub fn invalid_reference(
        field: &'static str,
        table: &'static str,
        id: impl Into<String>,
    ) -> Self {
        Self::InvalidReference {
            field,
            table,
            id: id.into(),
        }
    }

    pub fn duplicate(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::DuplicateEdge {
            from: from.into(),
            to: to.into(),
        }
    }
}
