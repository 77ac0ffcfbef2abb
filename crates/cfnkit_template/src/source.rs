//! Template source descriptors.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{TemplateError, TemplateResult};
use crate::provider::{GitProvider, LocalProvider, TemplateProvider};

/// Where a template comes from: a local directory, or a git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Local {
        root: String,
        name: String,
    },
    Git {
        name: String,
        repo: String,
        root: Option<String>,
    },
}

/// Structured form of the `template` argument.
#[derive(Debug, Deserialize)]
struct SourceSpec {
    name: String,
    #[serde(default)]
    repo: Option<String>,
    #[serde(default)]
    root: Option<String>,
}

impl TemplateSource {
    /// Parse the module's `template` argument.
    ///
    /// A bare string names a template in the current directory; a mapping
    /// supplies `name` plus `repo` (and optionally a `root` subdirectory
    /// within the repository).
    pub fn parse(input: &str) -> TemplateResult<Self> {
        let value: Value = serde_yaml::from_str(input)?;
        match value {
            Value::String(name) => Ok(TemplateSource::Local {
                root: ".".to_string(),
                name,
            }),
            Value::Mapping(_) => {
                let spec: SourceSpec = serde_yaml::from_value(value)?;
                match spec.repo {
                    Some(repo) => Ok(TemplateSource::Git {
                        name: spec.name,
                        repo,
                        root: spec.root,
                    }),
                    None => Ok(TemplateSource::Local {
                        root: spec.root.unwrap_or_else(|| ".".to_string()),
                        name: spec.name,
                    }),
                }
            }
            other => Err(TemplateError::InvalidSource(format!(
                "expected a template name or a name/repo mapping, got {:?}",
                other
            ))),
        }
    }

    /// Template filename within the source.
    pub fn name(&self) -> &str {
        match self {
            TemplateSource::Local { name, .. } => name,
            TemplateSource::Git { name, .. } => name,
        }
    }

    /// Resolve the descriptor to a provider.
    ///
    /// Git sources clone the repository; local sources read straight from
    /// the filesystem.
    pub fn provider(&self) -> TemplateResult<Box<dyn TemplateProvider>> {
        match self {
            TemplateSource::Local { root, .. } => Ok(Box::new(LocalProvider::new(root))),
            TemplateSource::Git { repo, root, .. } => {
                Ok(Box::new(GitProvider::clone(repo, root.as_deref())?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name_is_local() {
        let source = TemplateSource::parse("vpc.yaml").unwrap();
        assert_eq!(
            source,
            TemplateSource::Local {
                root: ".".to_string(),
                name: "vpc.yaml".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_mapping_with_repo_is_git() {
        let source = TemplateSource::parse(
            "{name: vpc.yaml, repo: 'https://github.com/example/templates.git'}",
        )
        .unwrap();
        assert_eq!(
            source,
            TemplateSource::Git {
                name: "vpc.yaml".to_string(),
                repo: "https://github.com/example/templates.git".to_string(),
                root: None,
            }
        );
    }

    #[test]
    fn test_parse_mapping_without_repo_is_local_with_root() {
        let source = TemplateSource::parse("{name: vpc.yaml, root: templates}").unwrap();
        assert_eq!(
            source,
            TemplateSource::Local {
                root: "templates".to_string(),
                name: "vpc.yaml".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(TemplateSource::parse("[a, b]").is_err());
        assert!(TemplateSource::parse("{repo: 'https://example.com/r.git'}").is_err());
    }
}
