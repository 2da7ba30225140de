//! Identifier generation
//!
//! Ids are `<prefix>_<n>` with `n` taken from a per-session counter. When a
//! document is loaded the counter starts past every numeric suffix already in
//! use, so new ids never collide with stored ones.

use super::types::Document;

/// Entity table an id is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Persona,
    Page,
    Flow,
    Step,
    Node,
    Hub,
    Connection,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Persona => "persona",
            IdKind::Page => "page",
            IdKind::Flow => "flow",
            IdKind::Step => "step",
            IdKind::Node => "vis_node",
            IdKind::Hub => "hub",
            IdKind::Connection => "conn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose ids cannot collide with any id in `doc`
    pub fn seeded_from(doc: &Document) -> Self {
        let max = all_ids(doc)
            .filter_map(numeric_suffix)
            .max()
            .unwrap_or(0);
        Self {
            next: max.saturating_add(1),
        }
    }

    /// Move the counter past every id in `doc`; never moves it backwards
    pub fn advance_past(&mut self, doc: &Document) {
        self.next = self.next.max(Self::seeded_from(doc).next);
    }

    pub fn next_id(&mut self, kind: IdKind) -> String {
        let n = self.next;
        self.next = self.next.saturating_add(1);
        format!("{}_{}", kind.prefix(), n)
    }
}

fn numeric_suffix(id: &str) -> Option<u64> {
    let (_, digits) = id.rsplit_once('_')?;
    digits.parse().ok()
}

fn all_ids(doc: &Document) -> impl Iterator<Item = &str> {
    let personas = doc.personas.iter().map(|p| p.id.as_str());
    let pages = doc.sitemap.iter().map(|p| p.id.as_str());
    let flows = doc.user_flows.iter().flat_map(|f| {
        let layout = &f.visual_layout;
        std::iter::once(f.id.as_str())
            .chain(f.steps.iter().map(|s| s.step_id.as_str()))
            .chain(layout.nodes.iter().map(|n| n.node_id.as_str()))
            .chain(layout.hubs.iter().map(|h| h.id.as_str()))
            .chain(layout.connections.iter().map(|c| c.id.as_str()))
    });
    personas.chain(pages).chain(flows)
}
