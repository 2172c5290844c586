//! View rendering collaborator
//!
//! Resolves a named template plus two data mappings into a markup string.
//! The facade only ever sees the `ViewRenderer` trait; the default
//! implementation is Tera over a template directory.

use std::path::Path;

use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::error::{RenderError, Result};

/// Resolves `(template, data, merge_data)` to a markup string
///
/// `merge_data` overrides `data` key-by-key.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, name: &str, data: &Value, merge_data: &Value) -> Result<String>;
}

/// Tera-backed view renderer
pub struct TeraViews {
    tera: Tera,
}

impl TeraViews {
    /// Load every template under `dir`
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let glob = format!("{}/**/*", dir.as_ref().display());
        let tera = Tera::new(&glob).map_err(|e| RenderError::Template(e.to_string()))?;
        Ok(Self { tera })
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }
}

impl ViewRenderer for TeraViews {
    fn render(&self, name: &str, data: &Value, merge_data: &Value) -> Result<String> {
        let merged = merge_values(data, merge_data)?;
        let context =
            Context::from_serialize(&merged).map_err(|e| RenderError::Template(e.to_string()))?;
        self.tera
            .render(name, &context)
            .map_err(|e| RenderError::Template(e.to_string()))
    }
}

/// Overlay `merge` onto `data`; both must be JSON objects (or null)
fn merge_values(data: &Value, merge: &Value) -> Result<Value> {
    let mut out: Map<String, Value> = match data {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        _ => {
            return Err(RenderError::Template(
                "view data must be a JSON object".to_string(),
            ))
        }
    };
    match merge {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                out.insert(key.clone(), value.clone());
            }
        }
        _ => {
            return Err(RenderError::Template(
                "view merge data must be a JSON object".to_string(),
            ))
        }
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn views_with(template: &str, body: &str) -> TeraViews {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(template), body).unwrap();
        let views = TeraViews::new(dir.path()).unwrap();
        // The tempdir may be dropped once Tera has parsed the sources.
        views
    }

    #[test]
    fn test_render_with_data() {
        let views = views_with("invoice.html", "<p>Total: {{ total }}</p>");
        let html = views
            .render("invoice.html", &json!({"total": 42}), &Value::Null)
            .unwrap();
        assert_eq!(html, "<p>Total: 42</p>");
    }

    #[test]
    fn test_merge_data_overrides_data() {
        let views = views_with("invoice.html", "<p>{{ customer }} owes {{ total }}</p>");
        let html = views
            .render(
                "invoice.html",
                &json!({"customer": "acme", "total": 10}),
                &json!({"total": 99}),
            )
            .unwrap();
        assert_eq!(html, "<p>acme owes 99</p>");
    }

    #[test]
    fn test_missing_template_is_a_template_error() {
        let views = views_with("a.html", "x");
        let err = views.render("b.html", &Value::Null, &Value::Null);
        assert!(matches!(err, Err(RenderError::Template(_))));
    }

    #[test]
    fn test_non_object_data_is_rejected() {
        let views = views_with("a.html", "x");
        let err = views.render("a.html", &json!([1, 2]), &Value::Null);
        assert!(matches!(err, Err(RenderError::Template(_))));
    }
}
