//! # cfnkit_template
//!
//! Template sources, variable merging and rendering for cfnkit.
//!
//! A template is named by a source descriptor — a bare filename for a
//! template in the current directory, or a `{name, repo}` mapping for one
//! kept in a remote git repository. The descriptor resolves to a
//! [`TemplateProvider`] that reads the body (and, for git checkouts, the
//! head commit), and a [`Template`] substitutes `{{ var }}` placeholders
//! from the merged variable set.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cfnkit_template::{load_vars, Template, TemplateSource};
//!
//! let source = TemplateSource::parse("vpc.yaml").unwrap();
//! let provider = source.provider().unwrap();
//! let vars = load_vars(Some("vars.yaml".as_ref()), None).unwrap();
//!
//! let template = Template::new(source.name(), provider, &[]).unwrap();
//! let rendered = template.render(&vars).unwrap();
//! println!("{}", rendered.content);
//! ```

pub mod error;
pub mod provider;
pub mod renderer;
pub mod source;
pub mod vars;

pub use error::{TemplateError, TemplateResult};
pub use provider::{GitProvider, LocalProvider, TemplateProvider};
pub use renderer::{RenderedTemplate, Template};
pub use source::TemplateSource;
pub use vars::{load_vars, set_deploy_info, DeployMetadata, VarMap};
