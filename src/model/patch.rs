//! Typed field patches for the inspector
//!
//! A patch names the entity kind it applies to, so the dispatch happens once
//! when the patch is built instead of on a string tag at every edit.

use super::types::ItemKind;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonaPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SitemapPagePatch {
    pub name: Option<String>,
    pub path: Option<String>,
    pub description: Option<String>,
    /// Replaces the whole linked-persona set
    pub persona_ids: Option<Vec<String>>,
    /// `Some(None)` moves the page to the root of the sitemap
    pub parent_id: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionPatch {
    pub label: Option<String>,
}

/// A field-merge update for one editable entity
#[derive(Debug, Clone, PartialEq)]
pub enum ItemPatch {
    Persona(PersonaPatch),
    Sitemap(SitemapPagePatch),
    Connection(ConnectionPatch),
}

impl ItemPatch {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemPatch::Persona(_) => ItemKind::Persona,
            ItemPatch::Sitemap(_) => ItemKind::Sitemap,
            ItemPatch::Connection(_) => ItemKind::Connection,
        }
    }

    pub fn persona_name(name: impl Into<String>) -> Self {
        ItemPatch::Persona(PersonaPatch {
            name: Some(name.into()),
            ..Default::default()
        })
    }

    pub fn page_personas(persona_ids: Vec<String>) -> Self {
        ItemPatch::Sitemap(SitemapPagePatch {
            persona_ids: Some(persona_ids),
            ..Default::default()
        })
    }

    pub fn connection_label(label: impl Into<String>) -> Self {
        ItemPatch::Connection(ConnectionPatch {
            label: Some(label.into()),
        })
    }
}
