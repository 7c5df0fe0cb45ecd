//! Tera template rendering.
//!
//! Templates are compiled into the binary and parsed once at construction, so
//! a syntax error stops the process at startup instead of surfacing on the
//! first request. Two helpers are available inside every template:
//!
//! | Helper | Example |
//! |---|---|
//! | `route_name_to_url` | `{{ route_name_to_url(name="articles.show", id=article.id) }}` |
//! | `format_int64` | `{{ format_int64(n=id) }}` or `{{ id \| format_int64 }}` |

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Function, Tera, Value};

use crate::error::RenderError;
use crate::router::ReverseUrl;

const TEMPLATES: [(&str, &str); 6] = [
    ("layout.html", include_str!("../templates/layout.html")),
    ("articles/_form_errors.html", include_str!("../templates/articles/_form_errors.html")),
    ("articles/index.html", include_str!("../templates/articles/index.html")),
    ("articles/show.html", include_str!("../templates/articles/show.html")),
    ("articles/create.html", include_str!("../templates/articles/create.html")),
    ("articles/edit.html", include_str!("../templates/articles/edit.html")),
];

/// Renders named templates against serializable data.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Parses the built-in templates and wires the helpers to `urls`.
    pub fn new(urls: Arc<dyn ReverseUrl>) -> Result<Self, tera::Error> {
        Self::with_templates(urls, TEMPLATES)
    }

    fn with_templates<'a>(
        urls: Arc<dyn ReverseUrl>,
        templates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        tera.register_function("route_name_to_url", RouteNameToUrl(urls));
        tera.register_function("format_int64", |args: &HashMap<String, Value>| {
            args.get("n")
                .ok_or_else(|| tera::Error::msg("format_int64: missing `n`"))
                .and_then(format_int64)
        });
        tera.register_filter("format_int64", |value: &Value, _: &HashMap<String, Value>| {
            format_int64(value)
        });
        Ok(Self { tera })
    }

    /// Renders `template` with the fields of `data` as top-level variables.
    ///
    /// `data` must serialize to a map (a struct or `serde_json::json!({..})`).
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, RenderError> {
        let fail = |source| RenderError { template: template.to_owned(), source };
        let context = Context::from_serialize(data).map_err(fail)?;
        self.tera.render(template, &context).map_err(fail)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `route_name_to_url(name="...", <placeholder>=<value>, ...)`
struct RouteNameToUrl(Arc<dyn ReverseUrl>);

impl Function for RouteNameToUrl {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("route_name_to_url: missing `name`"))?;

        let owned = args
            .iter()
            .filter(|(key, _)| key.as_str() != "name")
            .map(|(key, value)| Ok((key.as_str(), param_value(value)?)))
            .collect::<tera::Result<Vec<_>>>()?;
        let params: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();

        self.0
            .reverse_url(name, &params)
            .map(Value::String)
            .map_err(|e| tera::Error::msg(format!("route_name_to_url: {e}")))
    }

    // Output comes from the route table with constraint-checked parameters.
    fn is_safe(&self) -> bool {
        true
    }
}

fn param_value(value: &Value) -> tera::Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(tera::Error::msg(format!("unsupported route parameter `{other}`"))),
    }
}

fn format_int64(value: &Value) -> tera::Result<Value> {
    value
        .as_i64()
        .map(|n| Value::String(n.to_string()))
        .ok_or_else(|| tera::Error::msg(format!("format_int64: `{value}` is not a 64-bit integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;
    use serde_json::json;

    /// Reverses `articles.show` only.
    struct ShowOnly;

    impl ReverseUrl for ShowOnly {
        fn reverse_url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
            match (name, params) {
                ("articles.show", [("id", id)]) => Ok(format!("/articles/{id}")),
                _ => Err(RouteError::UnknownRoute(name.to_owned())),
            }
        }
    }

    fn renderer(templates: &[(&'static str, &'static str)]) -> Renderer {
        Renderer::with_templates(Arc::new(ShowOnly), templates.iter().copied()).unwrap()
    }

    #[test]
    fn route_helper_reverses_unescaped() {
        let r = renderer(&[("t.html", r#"<a href="{{ route_name_to_url(name="articles.show", id=id) }}">"#)]);
        assert_eq!(r.render("t.html", &json!({ "id": 23 })).unwrap(), r#"<a href="/articles/23">"#);
    }

    #[test]
    fn route_helper_failure_is_a_render_error() {
        let r = renderer(&[("t.html", r#"{{ route_name_to_url(name="nope") }}"#)]);
        let err = r.render("t.html", &json!({})).unwrap_err();
        assert_eq!(err.template, "t.html");
    }

    #[test]
    fn int_helper_works_as_function_and_filter() {
        let r = renderer(&[("t.html", "{{ format_int64(n=id) }}/{{ id | format_int64 }}")]);
        let big = i64::MAX;
        assert_eq!(r.render("t.html", &json!({ "id": big })).unwrap(), format!("{big}/{big}"));
        assert!(r.render("t.html", &json!({ "id": "seven" })).is_err());
    }

    #[test]
    fn unknown_template_is_reported() {
        let r = renderer(&[]);
        assert!(r.render("articles/missing.html", &json!({})).is_err());
    }

    #[test]
    fn html_templates_escape_user_text() {
        let r = renderer(&[("t.html", "{{ title }}")]);
        let out = r.render("t.html", &json!({ "title": "<script>" })).unwrap();
        assert_eq!(out, "&lt;script&gt;");
    }

    #[test]
    fn form_partial_shows_only_the_failing_fields() {
        let r = Renderer::new(Arc::new(ShowOnly)).unwrap();
        let data = json!({
            "title": "Hi",
            "body": "long enough body",
            "errors": { "title": "title length must be between 3 and 40" },
        });
        let out = r.render("articles/_form_errors.html", &data).unwrap();
        assert!(out.contains(r#"value="Hi""#));
        assert!(out.contains("title length must be between 3 and 40"));
        assert_eq!(out.matches(r#"class="error""#).count(), 1);
    }

    #[test]
    fn builtin_templates_parse() {
        assert!(Renderer::new(Arc::new(ShowOnly)).is_ok());
    }
}
