//! AWS settings resolution.
//!
//! Every module accepts an optional `aws` argument block. When present it
//! supplies the region and artifact bucket; when absent, fixed fallbacks
//! apply. Settings are built fresh per invocation and never mutated.

use std::fmt;

use serde::Deserialize;

/// The optional `aws` argument block accepted by every module.
///
/// Both fields are required once the block itself is given.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsArgs {
    pub region: String,
    pub cfn_bucket: String,
}

/// Region + artifact-store configuration pair used by delegate calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    /// AWS region passed to every `aws` CLI call.
    pub region: String,
    /// S3 bucket used for uploaded artifacts (lambdas, nested stacks).
    pub cfn_bucket: String,
}

impl AwsSettings {
    pub fn new(region: impl Into<String>, cfn_bucket: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            cfn_bucket: cfn_bucket.into(),
        }
    }

    /// Resolve settings from an optional override block, falling back to
    /// `defaults` when the block is absent.
    pub fn resolve(overrides: Option<SettingsArgs>, defaults: AwsSettings) -> AwsSettings {
        match overrides {
            Some(args) => AwsSettings::new(args.region, args.cfn_bucket),
            None => defaults,
        }
    }

    /// Fallback pair used by the account and outputs modules.
    pub fn ansible_defaults() -> Self {
        Self::new("ap-southeast-2", "None")
    }

    /// Fallback pair used by the template module. Rendering a local template
    /// does not need a real region, so the placeholders only surface if a
    /// helper actually reaches for AWS.
    pub fn unspecified() -> Self {
        Self::new("Not specified", "Not specified")
    }
}

impl fmt::Display for AwsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region={} cfn_bucket={}", self.region, self.cfn_bucket)
    }
}
