//! Path placeholder interpolation
//!
//! Stream paths carry `{placeholder}` segments such as
//! `v1/tables/{tableId}?appId={appId}`. They are resolved from the tap
//! configuration and the parent record that triggered the request.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Values available when resolving a path
#[derive(Debug, Clone, Copy, Default)]
pub struct PathContext<'a> {
    /// Configured application id
    pub app_id: Option<&'a str>,
    /// Parent record driving a nested stream
    pub parent: Option<&'a Value>,
}

impl<'a> PathContext<'a> {
    /// Create a context from the config app id and an optional parent record
    pub fn new(app_id: Option<&'a str>, parent: Option<&'a Value>) -> Self {
        Self { app_id, parent }
    }

    /// Resolve a single placeholder name
    ///
    /// - `appId`: configured app id, else parent `id`
    /// - `tableId`: parent `tableId`, else parent `query.tableId`, else parent `id`
    /// - `fieldId` / `reportId`: parent `id`
    pub fn resolve(&self, name: &str) -> Option<String> {
        match name {
            "appId" => self
                .app_id
                .map(str::to_string)
                .or_else(|| self.parent_field(&["id"])),
            "tableId" => self.table_id(),
            "fieldId" | "reportId" => self.parent_field(&["id"]),
            _ => None,
        }
    }

    /// Table id of the parent record, as used for key augmentation
    pub fn table_id(&self) -> Option<String> {
        self.parent_field(&["tableId"])
            .or_else(|| self.parent_field(&["query", "tableId"]))
            .or_else(|| self.parent_field(&["id"]))
    }

    fn parent_field(&self, path: &[&str]) -> Option<String> {
        let mut current = self.parent?;
        for part in path {
            current = current.as_object()?.get(*part)?;
        }
        value_to_string(current)
    }
}

/// Render a path template with the given context
pub fn render(template: &str, ctx: &PathContext<'_>) -> Result<String> {
    let mut errors = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        match ctx.resolve(name) {
            Some(value) => value,
            None => {
                errors.push(name.to_string());
                String::new()
            }
        }
    });

    if errors.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Check if a path contains placeholders
pub fn has_placeholders(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}

/// Extract all placeholder names from a path
pub fn extract_placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a scalar JSON value to its path form
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_app_id_from_config() {
        let parent = json!({"id": "parent-app"});
        let ctx = PathContext::new(Some("bq8xyz"), Some(&parent));
        assert_eq!(render("v1/apps/{appId}", &ctx).unwrap(), "v1/apps/bq8xyz");
    }

    #[test]
    fn test_app_id_falls_back_to_parent() {
        let parent = json!({"id": "bq8xyz"});
        let ctx = PathContext::new(None, Some(&parent));
        assert_eq!(
            render("v1/apps/{appId}/events", &ctx).unwrap(),
            "v1/apps/bq8xyz/events"
        );
    }

    #[test]
    fn test_table_id_resolution_order() {
        let direct = json!({"id": 7, "tableId": "bqt1"});
        let nested = json!({"id": 7, "query": {"tableId": "bqt2"}});
        let fallback = json!({"id": "bqt3"});

        let path = "v1/reports?tableId={tableId}";
        assert_eq!(
            render(path, &PathContext::new(None, Some(&direct))).unwrap(),
            "v1/reports?tableId=bqt1"
        );
        assert_eq!(
            render(path, &PathContext::new(None, Some(&nested))).unwrap(),
            "v1/reports?tableId=bqt2"
        );
        assert_eq!(
            render(path, &PathContext::new(None, Some(&fallback))).unwrap(),
            "v1/reports?tableId=bqt3"
        );
    }

    #[test]
    fn test_multiple_placeholders() {
        let parent = json!({"id": 6, "tableId": "bqt1"});
        let ctx = PathContext::new(None, Some(&parent));
        assert_eq!(
            render("v1/fields/{fieldId}?tableId={tableId}", &ctx).unwrap(),
            "v1/fields/6?tableId=bqt1"
        );
    }

    #[test]
    fn test_unresolved_placeholder_is_error() {
        let ctx = PathContext::default();
        let err = render("v1/apps/{appId}", &ctx).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { variable } if variable == "appId"));

        let ctx = PathContext::new(Some("app"), None);
        assert!(render("v1/widgets/{widgetId}", &ctx).is_err());
    }

    #[test]
    fn test_extract_placeholders() {
        assert!(has_placeholders("v1/tables/{tableId}"));
        assert!(!has_placeholders("v1/tables"));
        assert_eq!(
            extract_placeholders("v1/tables/{tableId}?appId={appId}"),
            vec!["tableId", "appId"]
        );
    }
}
