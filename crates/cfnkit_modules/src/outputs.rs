//! The `outputs` module: expose the outputs of an existing CloudFormation
//! stack as facts.

use cfnkit_aws::{AwsSettings, SettingsArgs, StackApi};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::runtime::{ModuleFailure, ModuleResult, Response};

/// Arguments accepted by the `outputs` module.
#[derive(Debug, Deserialize)]
pub struct OutputsArgs {
    pub stack_name: String,
    #[serde(default)]
    pub aws: Option<SettingsArgs>,
}

impl OutputsArgs {
    /// Resolve the effective AWS settings for this invocation.
    pub fn settings(&self) -> AwsSettings {
        AwsSettings::resolve(self.aws.clone(), AwsSettings::ansible_defaults())
    }
}

/// Handler body, with the delegate injected.
pub fn run(args: &OutputsArgs, api: &dyn StackApi) -> ModuleResult {
    debug!("Fetching outputs for stack {}", args.stack_name);

    let mut result = Response::new();
    result.set("content", json!(""));
    result.set("error", json!(""));

    let exists = match api.stack_exists(&args.stack_name) {
        Ok(exists) => exists,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Client error", result));
        }
    };

    if !exists {
        let message = format!("Stack {} not found", args.stack_name);
        result.set("error", json!(message.clone()));
        return Err(ModuleFailure::new(message, result));
    }

    let outputs = match api.stack_outputs(&args.stack_name) {
        Ok(outputs) => outputs,
        Err(e) => {
            result.set("error", json!(e.to_string()));
            return Err(ModuleFailure::new("Client error", result));
        }
    };

    // The outputs mapping is the success payload: each output key becomes a
    // top-level response field
    let mut response = Response::new();
    for (key, value) in outputs {
        response.set(key, json!(value));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use cfnkit_aws::AwsError;
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn args(stack_name: &str) -> OutputsArgs {
        OutputsArgs {
            stack_name: stack_name.to_string(),
            aws: None,
        }
    }

    #[test]
    fn test_missing_stack_names_the_stack() {
        let mut api = MockApi::new();
        api.expect_stack_exists()
            .withf(|name| name == "dev-vpc")
            .returning(|_| Ok(false));

        let failure = run(&args("dev-vpc"), &api).unwrap_err();
        assert_eq!(failure.msg, "Stack dev-vpc not found");
        assert_eq!(
            failure.response.get("error"),
            Some(&Value::String("Stack dev-vpc not found".to_string()))
        );
    }

    #[test]
    fn test_outputs_become_response_fields() {
        let mut api = MockApi::new();
        api.expect_stack_exists().returning(|_| Ok(true));
        api.expect_stack_outputs().returning(|_| {
            let mut outputs = BTreeMap::new();
            outputs.insert("VpcId".to_string(), "vpc-0abc".to_string());
            outputs.insert("CidrBlock".to_string(), "10.0.0.0/16".to_string());
            Ok(outputs)
        });

        let response = run(&args("dev-vpc"), &api).unwrap();
        assert_eq!(
            response.get("VpcId"),
            Some(&Value::String("vpc-0abc".to_string()))
        );
        assert_eq!(
            response.get("CidrBlock"),
            Some(&Value::String("10.0.0.0/16".to_string()))
        );
    }

    #[test]
    fn test_delegate_error_is_flattened() {
        let mut api = MockApi::new();
        api.expect_stack_exists().returning(|_| {
            Err(AwsError::Cli {
                command: "cloudformation describe-stacks".to_string(),
                message: "ExpiredToken".to_string(),
            })
        });

        let failure = run(&args("dev-vpc"), &api).unwrap_err();
        assert_eq!(failure.msg, "Client error");
        assert!(failure
            .response
            .get("error")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("ExpiredToken"));
    }
}
