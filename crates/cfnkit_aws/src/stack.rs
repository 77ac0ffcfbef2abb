//! Delegate seam for account and stack lookups.

use std::collections::BTreeMap;

use crate::error::AwsResult;

/// Operations the modules need from AWS.
///
/// Implemented by [`crate::AwsCli`] for real invocations; tests substitute a
/// mock so handler logic can be exercised without credentials.
pub trait StackApi {
    /// Account id of the current credentials.
    fn account_id(&self) -> AwsResult<String>;

    /// Whether a stack with the given name exists.
    fn stack_exists(&self, name: &str) -> AwsResult<bool>;

    /// Outputs mapping (key → value) of an existing stack.
    fn stack_outputs(&self, name: &str) -> AwsResult<BTreeMap<String, String>>;

    /// Currently deployed template body of an existing stack.
    fn stack_template(&self, name: &str) -> AwsResult<String>;
}
