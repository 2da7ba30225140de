//! The editor document and its mutators
//!
//! This module contains:
//! - Entity types (personas, sitemap pages, flows and their visual layout)
//! - Identifier generation
//! - Validated graph mutations on [`Document`]
//! - Inspector patches
//! - Reference checks for loaded documents

pub mod error;
pub mod graph;
pub mod ids;
pub mod layout;
pub mod lint;
pub mod patch;
pub mod types;

pub use error::GraphError;
pub use graph::HubInsertion;
pub use ids::{IdGenerator, IdKind};
pub use lint::{LintCategory, LintWarning};
pub use patch::{ConnectionPatch, ItemPatch, PersonaPatch, SitemapPagePatch};
pub use types::*;
