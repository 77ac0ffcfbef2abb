//! The `account` module: fetch the AWS account id, optionally verifying
//! that we're deploying to the correct account.

use cfnkit_aws::{AwsSettings, SettingsArgs, StackApi};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::runtime::{ModuleFailure, ModuleResult, Response};

/// Arguments accepted by the `account` module.
#[derive(Debug, Deserialize)]
pub struct AccountArgs {
    #[serde(default)]
    pub expected_account_id: Option<String>,
    #[serde(default)]
    pub aws: Option<SettingsArgs>,
}

impl AccountArgs {
    /// Resolve the effective AWS settings for this invocation.
    pub fn settings(&self) -> AwsSettings {
        AwsSettings::resolve(self.aws.clone(), AwsSettings::ansible_defaults())
    }
}

/// Handler body, with the delegate injected.
pub fn run(args: &AccountArgs, api: &dyn StackApi) -> ModuleResult {
    let settings = args.settings();
    debug!("Resolving account id ({})", settings);

    let mut result = Response::new();
    result.set("error", json!(""));

    let account_id = match api.account_id() {
        Ok(id) => id,
        Err(e) => {
            result.set(
                "error",
                json!(format!("Unable to retrieve account ID: {}, {}", e, settings)),
            );
            return Err(ModuleFailure::new("Client error", result));
        }
    };

    result.set("id", json!(account_id.clone()));

    if let Some(expected) = &args.expected_account_id {
        if expected != &account_id {
            result.set(
                "error",
                json!(format!(
                    "Expected account ID {} but got {}",
                    expected, account_id
                )),
            );
            return Err(ModuleFailure::new("Account mismatch", result));
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use cfnkit_aws::AwsError;
    use serde_json::Value;

    fn args(expected: Option<&str>) -> AccountArgs {
        AccountArgs {
            expected_account_id: expected.map(String::from),
            aws: None,
        }
    }

    #[test]
    fn test_succeeds_without_expectation() {
        let mut api = MockApi::new();
        api.expect_account_id()
            .returning(|| Ok("123456789012".to_string()));

        let response = run(&args(None), &api).unwrap();
        assert_eq!(
            response.get("id"),
            Some(&Value::String("123456789012".to_string()))
        );
    }

    #[test]
    fn test_succeeds_when_expectation_matches() {
        let mut api = MockApi::new();
        api.expect_account_id()
            .returning(|| Ok("123456789012".to_string()));

        assert!(run(&args(Some("123456789012")), &api).is_ok());
    }

    #[test]
    fn test_mismatch_reports_both_ids() {
        let mut api = MockApi::new();
        api.expect_account_id()
            .returning(|| Ok("999999999999".to_string()));

        let failure = run(&args(Some("123456789012")), &api).unwrap_err();
        assert_eq!(failure.msg, "Account mismatch");

        let error = failure.response.get("error").unwrap().as_str().unwrap();
        assert!(error.contains("123456789012"));
        assert!(error.contains("999999999999"));
    }

    #[test]
    fn test_delegate_error_is_flattened() {
        let mut api = MockApi::new();
        api.expect_account_id().returning(|| {
            Err(AwsError::Cli {
                command: "sts get-caller-identity".to_string(),
                message: "Unable to locate credentials".to_string(),
            })
        });

        let failure = run(&args(None), &api).unwrap_err();
        assert_eq!(failure.msg, "Client error");

        let error = failure.response.get("error").unwrap().as_str().unwrap();
        assert!(error.contains("Unable to retrieve account ID"));
        assert!(error.contains("Unable to locate credentials"));
        // Settings are embedded so auth failures are diagnosable
        assert!(error.contains("region=ap-southeast-2"));
    }
}
