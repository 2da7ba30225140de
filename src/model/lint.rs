//! Reference checks for stored or imported documents
//!
//! Mutators never create dangling references, but files written by hand or
//! by older versions can. Renderers skip what they cannot resolve; this
//! module reports it.

use std::collections::HashSet;
use std::fmt;

use super::types::Document;

/// A reference that points at nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Sitemap,
    Flow,
    Connection,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Sitemap => write!(f, "sitemap"),
            LintCategory::Flow => write!(f, "flow"),
            LintCategory::Connection => write!(f, "connection"),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Run all reference checks on a document
pub fn check(doc: &Document) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_sitemap(doc, &mut warnings);
    check_flows(doc, &mut warnings);
    warnings
}

fn warn(warnings: &mut Vec<LintWarning>, category: LintCategory, message: String) {
    warnings.push(LintWarning { category, message });
}

fn check_sitemap(doc: &Document, warnings: &mut Vec<LintWarning>) {
    let personas: HashSet<&str> = doc.personas.iter().map(|p| p.id.as_str()).collect();
    for page in &doc.sitemap {
        if let Some(parent) = &page.parent_id {
            if doc.page(parent).is_none() {
                warn(
                    warnings,
                    LintCategory::Sitemap,
                    format!("page \"{}\" has unknown parent \"{}\"", page.id, parent),
                );
            }
        }
        for persona in page.persona_ids.iter().filter(|p| !personas.contains(p.as_str())) {
            warn(
                warnings,
                LintCategory::Sitemap,
                format!("page \"{}\" links unknown persona \"{}\"", page.id, persona),
            );
        }
    }
}

fn check_flows(doc: &Document, warnings: &mut Vec<LintWarning>) {
    for flow in &doc.user_flows {
        if let Some(persona) = &flow.persona_id {
            if doc.persona(persona).is_none() {
                warn(
                    warnings,
                    LintCategory::Flow,
                    format!("flow \"{}\" has unknown persona \"{}\"", flow.id, persona),
                );
            }
        }
        for step in &flow.steps {
            if doc.page(&step.page_id).is_none() {
                warn(
                    warnings,
                    LintCategory::Flow,
                    format!("step \"{}\" shows unknown page \"{}\"", step.step_id, step.page_id),
                );
            }
        }
        let layout = &flow.visual_layout;
        for node in &layout.nodes {
            if flow.step(&node.step_id).is_none() {
                warn(
                    warnings,
                    LintCategory::Flow,
                    format!("node \"{}\" has unknown step \"{}\"", node.node_id, node.step_id),
                );
            }
        }
        for conn in &layout.connections {
            for end in [&conn.from, &conn.to] {
                if !layout.contains(end) {
                    warn(
                        warnings,
                        LintCategory::Connection,
                        format!("connection \"{}\" ends at unknown element \"{}\"", conn.id, end.id),
                    );
                }
            }
        }
    }
}
