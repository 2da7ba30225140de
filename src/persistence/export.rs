//! JSON export and import of a whole project
//!
//! The export wraps the entity tables with a `projectInfo` header. View state
//! (active flow, selection, pan/zoom) is not part of the file; importing
//! starts on the first flow with a fresh canvas.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use super::ImportError;
use crate::model::{Canvas, Document, Persona, SitemapPage, UserFlow, DEFAULT_PROJECT_NAME};

pub const EXPORT_VERSION: &str = "1.0";

const REQUIRED_KEYS: [&str; 4] = ["projectInfo", "personas", "sitemap", "userFlows"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub project_info: ProjectInfo,
    pub personas: Vec<Persona>,
    pub sitemap: Vec<SitemapPage>,
    pub user_flows: Vec<UserFlow>,
}

pub fn export_document(doc: &Document, exported_at: OffsetDateTime) -> ExportDocument {
    let export_date = exported_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());
    ExportDocument {
        project_info: ProjectInfo {
            project_name: doc.project_name.clone(),
            project_description: doc.project_description.clone(),
            export_date,
            version: EXPORT_VERSION.to_string(),
        },
        personas: doc.personas.clone(),
        sitemap: doc.sitemap.clone(),
        user_flows: doc.user_flows.clone(),
    }
}

/// Pretty-printed export of `doc`
pub fn export_json(doc: &Document, exported_at: OffsetDateTime) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_document(doc, exported_at))
}

/// Download name for an export: whitespace runs become `_`
pub fn export_file_name(project_name: &str) -> String {
    let mut name = String::with_capacity(project_name.len());
    let mut in_space = false;
    for c in project_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(c);
            in_space = false;
        }
    }
    if name.is_empty() {
        name.push_str("Untitled_Project");
    }
    name.push_str(".json");
    name
}

/// Parse and validate an exported file into a fresh document
pub fn import_json(input: &str) -> Result<Document, ImportError> {
    let value: Value = serde_json::from_str(input)?;
    for key in REQUIRED_KEYS {
        if value.get(key).map_or(true, Value::is_null) {
            return Err(ImportError::MissingKey(key));
        }
    }
    let export: ExportDocument = serde_json::from_value(value)?;
    check_sitemap(&export.sitemap)?;

    let ExportDocument {
        project_info,
        personas,
        sitemap,
        user_flows,
    } = export;
    let project_name = if project_info.project_name.is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        project_info.project_name
    };

    info!(
        project = %project_name,
        flows = user_flows.len(),
        pages = sitemap.len(),
        "imported project"
    );
    Ok(Document {
        project_name,
        project_description: project_info.project_description,
        personas,
        sitemap,
        active_flow_id: user_flows.first().map(|f| f.id.clone()),
        user_flows,
        selected_item_id: None,
        selected_item_type: None,
        canvas: Canvas::default(),
    })
}

/// Every parent must exist and no page may be its own ancestor
fn check_sitemap(pages: &[SitemapPage]) -> Result<(), ImportError> {
    let parents: HashMap<&str, Option<&str>> = pages
        .iter()
        .map(|p| (p.id.as_str(), p.parent_id.as_deref()))
        .collect();

    for page in pages {
        if let Some(parent) = page.parent_id.as_deref() {
            if !parents.contains_key(parent) {
                return Err(ImportError::InvalidSitemap(format!(
                    "page '{}' has unknown parent '{}'",
                    page.id, parent
                )));
            }
        }
        let mut cursor = page.parent_id.as_deref();
        let mut depth = 0;
        while let Some(current) = cursor {
            depth += 1;
            if current == page.id || depth > pages.len() {
                return Err(ImportError::InvalidSitemap(format!(
                    "page '{}' is its own ancestor",
                    page.id
                )));
            }
            cursor = parents.get(current).copied().flatten();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    fn sample() -> Document {
        let mut doc = Document::with_initial_flow("flow_1");
        doc.project_name = "Shop Redesign".into();
        doc.personas.push(Persona {
            id: "persona_2".into(),
            name: "Buyer".into(),
            description: String::new(),
        });
        doc.selected_item_id = Some("persona_2".into());
        doc.selected_item_type = Some(ItemKind::Persona);
        doc.canvas.zoom = 1.5;
        doc
    }

    #[test]
    fn test_export_header() {
        let export = export_document(&sample(), datetime!(2024-05-01 12:30:00 UTC));
        assert_eq!(export.project_info.export_date, "2024-05-01T12:30:00Z");
        assert_eq!(export.project_info.version, "1.0");
        assert_eq!(export.personas.len(), 1);
    }

    #[test]
    fn test_export_omits_view_state() {
        let json = export_json(&sample(), OffsetDateTime::UNIX_EPOCH).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert!(value.get("canvas").is_none());
        assert!(value.get("selectedItemId").is_none());
    }

    #[test]
    fn test_import_resets_view_state() {
        let json = export_json(&sample(), OffsetDateTime::UNIX_EPOCH).unwrap();
        let doc = import_json(&json).unwrap();
        assert_eq!(doc.project_name, "Shop Redesign");
        assert_eq!(doc.active_flow_id.as_deref(), Some("flow_1"));
        assert_eq!(doc.selected_item_id, None);
        assert_eq!(doc.canvas, Canvas::default());
        assert_eq!(doc.personas, sample().personas);
    }

    #[test]
    fn test_import_missing_key() {
        let err = import_json(r#"{"projectInfo": {}, "personas": [], "sitemap": []}"#).unwrap_err();
        assert_snapshot!(err.to_string(), @"Invalid project file format: missing 'userFlows'");
    }

    #[test]
    fn test_import_not_json() {
        assert!(matches!(import_json("{oops"), Err(ImportError::Malformed(_))));
    }

    #[test]
    fn test_import_rejects_sitemap_cycle() {
        let json = r#"{
            "projectInfo": {"projectName": "x"},
            "personas": [],
            "sitemap": [
                {"id": "a", "name": "A", "path": "/a", "parentId": "b"},
                {"id": "b", "name": "B", "path": "/b", "parentId": "a"}
            ],
            "userFlows": []
        }"#;
        assert!(matches!(import_json(json), Err(ImportError::InvalidSitemap(_))));
    }

    #[test]
    fn test_import_without_flows_has_no_active_flow() {
        let json = r#"{"projectInfo": {"projectName": ""}, "personas": [], "sitemap": [], "userFlows": []}"#;
        let doc = import_json(json).unwrap();
        assert_eq!(doc.active_flow_id, None);
        assert_eq!(doc.project_name, "Untitled Project");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Shop  Redesign v2"), "Shop_Redesign_v2.json");
        assert_eq!(export_file_name(""), "Untitled_Project.json");
        assert_eq!(export_file_name(" lead"), "_lead.json");
    }
}
