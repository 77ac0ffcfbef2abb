//! # cfnkit_aws
//!
//! AWS settings and CloudFormation stack inspection for cfnkit.
//!
//! This crate carries the pieces every module invocation needs when talking
//! to AWS:
//!
//! - [`AwsSettings`] — the region/artifact-bucket pair, resolved from an
//!   optional caller-supplied block with fixed fallbacks
//! - [`StackApi`] — the trait boundary for account and stack lookups
//! - [`AwsCli`] — a [`StackApi`] implementation driving the `aws` CLI
//! - [`render_diff`] — line diff of a deployed template body vs. a freshly
//!   rendered one
//!
//! ## Example
//!
//! ```rust,no_run
//! use cfnkit_aws::{AwsCli, AwsSettings, StackApi};
//!
//! let settings = AwsSettings::resolve(None, AwsSettings::ansible_defaults());
//! let aws = AwsCli::new(settings);
//! let id = aws.account_id().unwrap();
//! println!("deploying to account {id}");
//! ```

pub mod client;
pub mod diff;
pub mod error;
pub mod settings;
pub mod stack;

pub use client::AwsCli;
pub use diff::render_diff;
pub use error::{AwsError, AwsResult};
pub use settings::{AwsSettings, SettingsArgs};
pub use stack::StackApi;
