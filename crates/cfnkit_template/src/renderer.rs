//! Template rendering.
//!
//! Placeholders take the form `{{ var }}` or `{{ var | helper }}`; dotted
//! paths traverse nested mappings (`{{ deploy.template_sha }}`). Unresolved
//! placeholders do not abort a render — they are collected into the soft
//! [`RenderedTemplate::error`] field the caller inspects before deploying.

use regex::{Captures, Regex};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::provider::TemplateProvider;
use crate::vars::VarMap;

type HelperFn = fn(&str) -> String;

/// A loaded template ready to render.
pub struct Template {
    name: String,
    provider: Box<dyn TemplateProvider>,
    pattern: Regex,
}

/// Result of rendering a template.
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    /// Rendered body, with unresolved placeholders left in place.
    pub content: String,
    /// Problems encountered while rendering, if any.
    pub error: Option<String>,
}

impl Template {
    /// Build a template, validating the requested helper names.
    pub fn new(
        name: impl Into<String>,
        provider: Box<dyn TemplateProvider>,
        helpers: &[String],
    ) -> TemplateResult<Self> {
        for helper in helpers {
            if lookup_helper(helper).is_none() {
                return Err(TemplateError::UnknownHelper(helper.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            provider,
            pattern: Regex::new(
                r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*(?:\|\s*([A-Za-z_][A-Za-z0-9_]*)\s*)?\}\}",
            )
            .expect("placeholder pattern is valid"),
        })
    }

    /// Render the template with the given variables.
    pub fn render(&self, vars: &VarMap) -> TemplateResult<RenderedTemplate> {
        let body = self.provider.read(&self.name)?;
        debug!("Rendering template {} ({} bytes)", self.name, body.len());

        let mut problems = Vec::new();
        let content = self
            .pattern
            .replace_all(&body, |caps: &Captures| {
                let path = &caps[1];
                let helper = caps.get(2).map(|m| m.as_str());

                let value = match lookup_path(vars, path) {
                    Some(value) => value_text(value),
                    None => {
                        problems.push(format!("undefined variable '{}'", path));
                        return caps[0].to_string();
                    }
                };

                match helper {
                    None => value,
                    Some(name) => match lookup_helper(name) {
                        Some(apply) => apply(&value),
                        None => {
                            problems.push(format!("unknown helper '{}'", name));
                            caps[0].to_string()
                        }
                    },
                }
            })
            .to_string();

        let error = if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        };

        Ok(RenderedTemplate { content, error })
    }
}

impl RenderedTemplate {
    /// IAM capabilities the rendered template requires when deployed.
    ///
    /// Explicitly named IAM resources require `CAPABILITY_NAMED_IAM`; any
    /// other IAM resource requires `CAPABILITY_IAM`. Content that does not
    /// parse as a template declares nothing.
    pub fn iam_capabilities(&self) -> Vec<String> {
        let doc: Value = match serde_yaml::from_str(&self.content) {
            Ok(doc) => doc,
            Err(_) => return Vec::new(),
        };

        let resources = match doc.get("Resources").and_then(Value::as_mapping) {
            Some(resources) => resources,
            None => return Vec::new(),
        };

        let mut named = false;
        let mut unnamed = false;
        for (_, resource) in resources {
            let kind = resource.get("Type").and_then(Value::as_str).unwrap_or("");
            if !kind.starts_with("AWS::IAM::") {
                continue;
            }

            let has_explicit_name = resource
                .get("Properties")
                .and_then(Value::as_mapping)
                .map(|props| {
                    props
                        .iter()
                        .any(|(key, _)| key.as_str().is_some_and(|k| k.ends_with("Name")))
                })
                .unwrap_or(false);

            if has_explicit_name {
                named = true;
            } else {
                unnamed = true;
            }
        }

        if named {
            vec!["CAPABILITY_NAMED_IAM".to_string()]
        } else if unnamed {
            vec!["CAPABILITY_IAM".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Resolve a dotted path against the variable set.
fn lookup_path<'a>(vars: &'a VarMap, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = vars.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

/// Render a variable value as template text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Helper filters addressable as `{{ var | helper }}`.
fn lookup_helper(name: &str) -> Option<HelperFn> {
    match name {
        "snake_case" => Some(to_snake_case),
        "pascal_case" => Some(to_pascal_case),
        "kebab_case" => Some(to_kebab_case),
        "upper" => Some(to_upper),
        "lower" => Some(to_lower),
        _ => None,
    }
}

fn to_upper(s: &str) -> String {
    s.to_uppercase()
}

fn to_lower(s: &str) -> String {
    s.to_lowercase()
}

/// Convert string to snake_case.
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else if c == '-' || c == ' ' {
            result.push('_');
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Convert string to kebab-case.
fn to_kebab_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('-');
            }
            result.push(c.to_ascii_lowercase());
        } else if c == '_' || c == ' ' {
            result.push('-');
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct FixedProvider(String);

    impl TemplateProvider for FixedProvider {
        fn read(&self, _name: &str) -> TemplateResult<String> {
            Ok(self.0.clone())
        }

        fn head(&self) -> TemplateResult<Option<String>> {
            Ok(None)
        }

        fn git_ref(&self) -> Option<String> {
            None
        }
    }

    fn render(body: &str, vars: &VarMap) -> RenderedTemplate {
        let template = Template::new(
            "test.yaml",
            Box::new(FixedProvider(body.to_string())),
            &[],
        )
        .unwrap();
        template.render(vars).unwrap()
    }

    fn vars_from(pairs: &[(&str, &str)]) -> VarMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_render_substitutes_variables() {
        let vars = vars_from(&[("name", "vpc"), ("env", "prod")]);
        let rendered = render("Stack: {{name}}-{{env}}", &vars);
        assert_eq!(rendered.content, "Stack: vpc-prod");
        assert!(rendered.error.is_none());
    }

    #[test]
    fn test_render_dotted_path() {
        let mut deploy = BTreeMap::new();
        deploy.insert("template_sha".to_string(), Value::from("abc123"));
        let mut vars = VarMap::new();
        vars.insert("deploy".to_string(), serde_yaml::to_value(deploy).unwrap());

        let rendered = render("sha: {{ deploy.template_sha }}", &vars);
        assert_eq!(rendered.content, "sha: abc123");
    }

    #[test]
    fn test_render_helper_filter() {
        let vars = vars_from(&[("name", "my-app")]);
        let rendered = render("{{ name | pascal_case }}", &vars);
        assert_eq!(rendered.content, "MyApp");
    }

    #[test]
    fn test_undefined_variable_sets_soft_error() {
        let rendered = render("value: {{missing}}", &VarMap::new());
        assert_eq!(rendered.content, "value: {{missing}}");
        let error = rendered.error.unwrap();
        assert!(error.contains("undefined variable 'missing'"));
    }

    #[test]
    fn test_unknown_helper_in_body_sets_soft_error() {
        let vars = vars_from(&[("name", "vpc")]);
        let rendered = render("{{ name | bogus }}", &vars);
        assert!(rendered.error.unwrap().contains("unknown helper 'bogus'"));
    }

    #[test]
    fn test_unknown_requested_helper_fails_construction() {
        let result = Template::new(
            "test.yaml",
            Box::new(FixedProvider(String::new())),
            &["bogus".to_string()],
        );
        assert!(matches!(result, Err(TemplateError::UnknownHelper(name)) if name == "bogus"));
    }

    #[test]
    fn test_capabilities_for_unnamed_iam_resource() {
        let rendered = RenderedTemplate {
            content: "Resources:\n  Role:\n    Type: AWS::IAM::Role\n    Properties:\n      Path: /\n".to_string(),
            error: None,
        };
        assert_eq!(rendered.iam_capabilities(), vec!["CAPABILITY_IAM"]);
    }

    #[test]
    fn test_capabilities_for_named_iam_resource() {
        let rendered = RenderedTemplate {
            content: "Resources:\n  Role:\n    Type: AWS::IAM::Role\n    Properties:\n      RoleName: admin\n".to_string(),
            error: None,
        };
        assert_eq!(rendered.iam_capabilities(), vec!["CAPABILITY_NAMED_IAM"]);
    }

    #[test]
    fn test_no_capabilities_without_iam_resources() {
        let rendered = RenderedTemplate {
            content: "Resources:\n  Vpc:\n    Type: AWS::EC2::VPC\n".to_string(),
            error: None,
        };
        assert!(rendered.iam_capabilities().is_empty());
    }
}
