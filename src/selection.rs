//! Selected item and inspector edits
//!
//! The selection lives on the document as `(selectedItemId, selectedItemType)`
//! but is never an undo step. Inspector edits are turned into an [`ItemPatch`]
//! for the selected kind; fields that kind does not have are rejected.

use crate::model::{
    ConnectionPatch, Document, ItemKind, ItemPatch, PersonaPatch, SitemapPagePatch,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub kind: ItemKind,
}

impl Selection {
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// The current selection of `doc`, if both halves are set
    pub fn of(doc: &Document) -> Option<Self> {
        let id = doc.selected_item_id.clone()?;
        let kind = doc.selected_item_type?;
        Some(Self { id, kind })
    }

    /// Write this selection into `doc`
    pub fn apply(self, doc: &mut Document) {
        doc.selected_item_id = Some(self.id);
        doc.selected_item_type = Some(self.kind);
    }

    /// Whether the selected entity still exists
    pub fn resolves(&self, doc: &Document) -> bool {
        let layout = doc.active_flow().map(|f| &f.visual_layout);
        match self.kind {
            ItemKind::Persona => doc.persona(&self.id).is_some(),
            ItemKind::Sitemap => doc.page(&self.id).is_some(),
            ItemKind::Node => layout.is_some_and(|l| l.node(&self.id).is_some()),
            ItemKind::Hub => layout.is_some_and(|l| l.hub(&self.id).is_some()),
            ItemKind::Connection => layout.is_some_and(|l| l.connection(&self.id).is_some()),
        }
    }
}

/// A single field edit coming from the inspector panel
#[derive(Debug, Clone, PartialEq)]
pub enum InspectorEdit {
    Name(String),
    Description(String),
    Label(String),
    /// Full set of checked personas for a sitemap page
    LinkedPersonas(Vec<String>),
}

impl InspectorEdit {
    /// Patch for an item of `kind`, or `None` if that kind has no such field
    pub fn to_patch(&self, kind: ItemKind) -> Option<ItemPatch> {
        let patch = match (kind, self) {
            (ItemKind::Persona, InspectorEdit::Name(v)) => ItemPatch::Persona(PersonaPatch {
                name: Some(v.clone()),
                ..Default::default()
            }),
            (ItemKind::Persona, InspectorEdit::Description(v)) => {
                ItemPatch::Persona(PersonaPatch {
                    description: Some(v.clone()),
                    ..Default::default()
                })
            }
            (ItemKind::Sitemap, InspectorEdit::Name(v)) => ItemPatch::Sitemap(SitemapPagePatch {
                name: Some(v.clone()),
                ..Default::default()
            }),
            (ItemKind::Sitemap, InspectorEdit::Description(v)) => {
                ItemPatch::Sitemap(SitemapPagePatch {
                    description: Some(v.clone()),
                    ..Default::default()
                })
            }
            (ItemKind::Sitemap, InspectorEdit::LinkedPersonas(ids)) => {
                ItemPatch::page_personas(ids.clone())
            }
            (ItemKind::Connection, InspectorEdit::Label(v)) => {
                ItemPatch::Connection(ConnectionPatch {
                    label: Some(v.clone()),
                })
            }
            _ => return None,
        };
        Some(patch)
    }
}
