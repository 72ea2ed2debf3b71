//! Template interpolation for stream paths and query parameters
//!
//! Handles `{{ variable }}` interpolation. Two roots are available:
//! `{{ context.podcast_id }}` reads the parent-derived context and
//! `{{ config.report_year }}` reads tap configuration. A bare name is looked
//! up in the context first, then in the config.

use crate::context::Context;
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Values available to templates
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Tap configuration values
    pub config: Value,
    /// Parent-derived context values
    pub context: Value,
}

impl TemplateContext {
    /// Create context with config values
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the parent context
    pub fn set_context(&mut self, context: &Context) -> &mut Self {
        self.context = context.to_value();
        self
    }

    /// Get a value by path (e.g., "context.podcast_id")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();

        let root = match *parts.first()? {
            "config" => &self.config,
            "context" => &self.context,
            _ => {
                return get_nested_value(&self.context, &parts)
                    .or_else(|| get_nested_value(&self.config, &parts));
            }
        };

        get_nested_value(root, &parts[1..])
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
///
/// Every variable must resolve to a non-null value; the error lists all
/// variables that did not.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let var_path = &caps[1];
        match ctx.get(var_path) {
            Some(value) if !value.is_null() => value_to_string(value),
            _ => {
                missing.push(var_path.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Render every value of a parameter map
pub fn render_params(
    params: &HashMap<String, String>,
    ctx: &TemplateContext,
) -> Result<HashMap<String, String>> {
    params
        .iter()
        .map(|(key, value)| Ok((key.clone(), render(value, ctx)?)))
        .collect()
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn podcast_context() -> TemplateContext {
        let mut ctx = TemplateContext::with_config(json!({
            "api_url": "https://api.podbean.com",
            "report_year": 2022
        }));
        ctx.set_context(
            &Context::new()
                .with_value("podcast_id", "pod-1")
                .with_value("year", 2021),
        );
        ctx
    }

    #[test]
    fn test_context_substitution() {
        let ctx = podcast_context();
        let result = render(
            "podcast_id={{ context.podcast_id }}&year={{ context.year }}",
            &ctx,
        )
        .unwrap();
        assert_eq!(result, "podcast_id=pod-1&year=2021");
    }

    #[test]
    fn test_config_substitution() {
        let ctx = podcast_context();
        let result = render("{{ config.api_url }}/v1/podcasts", &ctx).unwrap();
        assert_eq!(result, "https://api.podbean.com/v1/podcasts");
    }

    #[test]
    fn test_bare_name_prefers_context() {
        let ctx = podcast_context();
        assert_eq!(render("{{ podcast_id }}", &ctx).unwrap(), "pod-1");
        assert_eq!(render("{{ report_year }}", &ctx).unwrap(), "2022");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::default();
        let err = render("{{ context.podcast_id }} {{ config.missing }}", &ctx).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("context.podcast_id"));
        assert!(message.contains("config.missing"));
    }

    #[test]
    fn test_null_is_undefined() {
        let mut ctx = TemplateContext::default();
        ctx.set_context(&Context::new().with_value("podcast_id", Value::Null));
        assert!(render("{{ context.podcast_id }}", &ctx).is_err());
    }

    #[test]
    fn test_no_templates() {
        let ctx = TemplateContext::default();
        let result = render("/v1/analytics/podcastReports", &ctx).unwrap();
        assert_eq!(result, "/v1/analytics/podcastReports");
    }

    #[test]
    fn test_whitespace_in_template() {
        let ctx = podcast_context();
        assert_eq!(render("{{context.year}}", &ctx).unwrap(), "2021");
        assert_eq!(render("{{  context.year  }}", &ctx).unwrap(), "2021");
    }

    #[test]
    fn test_render_params() {
        let ctx = podcast_context();
        let params: HashMap<String, String> = [
            ("podcast_id".to_string(), "{{ context.podcast_id }}".to_string()),
            ("format".to_string(), "csv".to_string()),
        ]
        .into_iter()
        .collect();

        let rendered = render_params(&params, &ctx).unwrap();
        assert_eq!(rendered.get("podcast_id").map(String::as_str), Some("pod-1"));
        assert_eq!(rendered.get("format").map(String::as_str), Some("csv"));
    }

    #[test]
    fn test_has_templates_and_variables() {
        assert!(has_templates("{{ context.year }}"));
        assert!(!has_templates("{ not a template }"));
        assert_eq!(
            extract_variables("{{ context.podcast_id }}/{{ config.report_year }}"),
            vec!["context.podcast_id", "config.report_year"]
        );
    }
}
