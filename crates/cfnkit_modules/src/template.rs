//! The `template` module: render a CloudFormation template with merged
//! variables, reporting IAM capabilities and a diff against the currently
//! deployed stack.

use std::path::PathBuf;

use cfnkit_aws::{render_diff, AwsError, AwsSettings, SettingsArgs, StackApi};
use cfnkit_template::{
    load_vars, set_deploy_info, Template, TemplateResult, TemplateSource, VarMap,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::runtime::{ModuleFailure, ModuleResult, Response};

/// Arguments accepted by the `template` module.
#[derive(Debug, Deserialize)]
pub struct TemplateArgs {
    /// Template descriptor: a bare filename, or a `{name, repo}` mapping.
    pub template: serde_json::Value,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub vars: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub vars_file: Option<PathBuf>,
    #[serde(default)]
    pub aws: Option<SettingsArgs>,
    #[serde(default)]
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub helpers: Vec<String>,
}

fn default_action() -> String {
    "render".to_string()
}

impl TemplateArgs {
    /// Resolve the effective AWS settings for this invocation.
    pub fn settings(&self) -> AwsSettings {
        AwsSettings::resolve(self.aws.clone(), AwsSettings::unspecified())
    }

    /// Parse the template descriptor.
    ///
    /// Playbooks hand the descriptor over either as a YAML string or as a
    /// structured mapping; both shapes funnel into [`TemplateSource::parse`].
    fn source(&self) -> TemplateResult<TemplateSource> {
        match &self.template {
            serde_json::Value::String(descriptor) => TemplateSource::parse(descriptor),
            other => {
                let descriptor = serde_yaml::to_string(other)?;
                TemplateSource::parse(&descriptor)
            }
        }
    }

    /// Convert the inline `vars` mapping into template variables.
    fn inline_vars(&self) -> TemplateResult<Option<VarMap>> {
        match &self.vars {
            None => Ok(None),
            Some(mapping) => {
                let mut vars = VarMap::new();
                for (key, value) in mapping {
                    vars.insert(key.clone(), serde_yaml::to_value(value)?);
                }
                Ok(Some(vars))
            }
        }
    }
}

/// Handler body, with the delegate injected.
pub fn run(args: &TemplateArgs, api: &dyn StackApi) -> ModuleResult {
    let mut result = Response::new();
    result.set("content", json!(""));
    result.set("error", json!(""));

    // Reject unknown actions before touching any other input
    if args.action != "render" {
        let message = format!("Unknown action {}", args.action);
        result.set("error", json!(message.clone()));
        return Err(ModuleFailure::new(message, result));
    }

    let source = match args.source() {
        Ok(source) => source,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Invalid template source", result));
        }
    };

    let provider = match source.provider() {
        Ok(provider) => provider,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Unable to load template", result));
        }
    };

    let inline = match args.inline_vars() {
        Ok(inline) => inline,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Unable to load vars", result));
        }
    };
    let mut vars = match load_vars(args.vars_file.as_deref(), inline.as_ref()) {
        Ok(vars) => vars,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Unable to load vars", result));
        }
    };

    if let Some(tags) = &args.tags {
        debug!("Carrying {} stack tags", tags.len());
    }

    // Inject template commit information under the reserved `deploy` key;
    // failures here are swallowed and rendering proceeds without it
    set_deploy_info(provider.as_ref(), &mut vars);

    let template = match Template::new(source.name(), provider, &args.helpers) {
        Ok(template) => template,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Unknown helper", result));
        }
    };

    let rendered = match template.render(&vars) {
        Ok(rendered) => rendered,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Error rendering template", result));
        }
    };

    result.set("content", json!(rendered.content.clone()));
    if let Some(error) = &rendered.error {
        result.set("error", json!(error));
        return Err(ModuleFailure::new("Error rendering template", result));
    }

    result.set("capabilities", json!(rendered.iam_capabilities()));

    let diff = match template_diff(api, &vars, &rendered.content) {
        Ok(diff) => diff,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Client error", result));
        }
    };
    result.set("diff", json!(diff));

    Ok(result)
}

/// Diff of the rendered template vs. the currently deployed stack.
///
/// Only computed when the variable set names a `stack_name` whose stack
/// already exists; the markup tags the diff renderer emits are stripped so
/// the host sees plain text.
fn template_diff(
    api: &dyn StackApi,
    vars: &VarMap,
    rendered: &str,
) -> Result<String, AwsError> {
    let stack_name = match vars.get("stack_name").and_then(|v| v.as_str()) {
        Some(name) => name,
        None => return Ok(String::new()),
    };

    if !api.stack_exists(stack_name)? {
        return Ok(String::new());
    }

    let deployed = api.stack_template(stack_name)?;
    Ok(strip_markup(&render_diff(&deployed, rendered)))
}

/// Remove bracketed markup substrings (`[red]`, `[/red]`, ...) from diff
/// text.
fn strip_markup(text: &str) -> String {
    let pattern = Regex::new(r"\[[^\]]+\]").expect("markup pattern is valid");
    pattern.replace_all(text, "").to_string()
}
