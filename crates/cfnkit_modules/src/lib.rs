//! # cfnkit_modules
//!
//! Ansible binary modules exposing cfnkit templating and stack inspection.
//!
//! Three modules ship from this crate, one binary each:
//!
//! - `account` — fetch the AWS account id, optionally verifying that we're
//!   deploying to the expected account
//! - `outputs` — expose the outputs of an existing CloudFormation stack
//! - `template` — render a template with merged variables, reporting IAM
//!   capabilities and a diff against the currently deployed stack
//!
//! Handler bodies live here with the delegate injected as
//! [`cfnkit_aws::StackApi`], so they can be exercised without credentials;
//! the binaries wire in [`cfnkit_aws::AwsCli`] and the
//! [`runtime`] argument/response plumbing.

pub mod account;
pub mod outputs;
pub mod runtime;
pub mod template;
