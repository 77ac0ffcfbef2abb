//! Template variable loading and deploy metadata.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::TemplateResult;
use crate::provider::TemplateProvider;

/// Variable set passed to a template render.
pub type VarMap = BTreeMap<String, Value>;

/// Load template variables from an optional vars file and an optional inline
/// mapping. File-sourced variables load first; inline variables override any
/// same-named keys.
pub fn load_vars(vars_file: Option<&Path>, inline: Option<&VarMap>) -> TemplateResult<VarMap> {
    let mut vars = VarMap::new();

    if let Some(path) = vars_file {
        let content = fs::read_to_string(path)?;
        if !content.trim().is_empty() {
            vars = serde_yaml::from_str(&content)?;
        }
        debug!("Loaded {} variables from {:?}", vars.len(), path);
    }

    if let Some(inline) = inline {
        vars.extend(inline.clone());
    }

    Ok(vars)
}

/// Deployment metadata injected under the reserved `deploy` variable.
#[derive(Debug, Clone, Serialize)]
pub struct DeployMetadata {
    pub deployed_with: String,
    pub deployed_at: String,
    pub config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<String>,
}

impl DeployMetadata {
    fn new() -> Self {
        Self {
            deployed_with: "ansible".to_string(),
            deployed_at: Utc::now().to_rfc3339(),
            config_path: ".".to_string(),
            template_sha: None,
            template_ref: None,
        }
    }
}

/// Attach deploy metadata to the variable set under the `deploy` key.
///
/// Best-effort enrichment: any failure is logged and swallowed, and
/// rendering proceeds without the affected fields.
pub fn set_deploy_info(provider: &dyn TemplateProvider, vars: &mut VarMap) {
    let mut meta = DeployMetadata::new();

    match provider.head() {
        Ok(Some(sha)) => {
            meta.template_sha = Some(sha);
            meta.template_ref = provider.git_ref();
        }
        Ok(None) => {}
        Err(e) => debug!("Could not resolve template head: {}", e),
    }

    match serde_yaml::to_value(&meta) {
        Ok(value) => {
            vars.insert("deploy".to_string(), value);
        }
        Err(e) => debug!("Skipping deploy metadata: {}", e),
    }
}
