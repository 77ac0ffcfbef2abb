//! `aws` CLI backed implementation of [`StackApi`].

use std::collections::BTreeMap;
use std::process::Command;

use serde_json::Value;
use tracing::debug;

use crate::error::{AwsError, AwsResult};
use crate::settings::AwsSettings;
use crate::stack::StackApi;

/// Stack inspection client driving the `aws` CLI.
#[derive(Debug)]
pub struct AwsCli {
    settings: AwsSettings,
}

impl AwsCli {
    /// Create a new client for the given settings.
    pub fn new(settings: AwsSettings) -> Self {
        Self { settings }
    }

    /// Check if the `aws` CLI is available on the system.
    pub fn is_cli_available() -> bool {
        Command::new("aws")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Run an `aws` subcommand and return its stdout.
    fn run(&self, args: &[&str]) -> AwsResult<String> {
        debug!("Running aws {}", args.join(" "));

        let output = Command::new("aws")
            .args(args)
            .args(["--region", &self.settings.region, "--output", "json"])
            .output()
            .map_err(|e| AwsError::Cli {
                command: args.join(" "),
                message: format!("Failed to run aws: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AwsError::Cli {
                command: args.join(" "),
                message: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn describe_stack(&self, name: &str) -> AwsResult<Value> {
        let raw = self.run(&["cloudformation", "describe-stacks", "--stack-name", name])?;
        let value: Value = serde_json::from_str(&raw)?;
        value
            .get("Stacks")
            .and_then(|stacks| stacks.get(0))
            .cloned()
            .ok_or_else(|| AwsError::MalformedOutput(format!("no stack entry for {}", name)))
    }
}

impl StackApi for AwsCli {
    fn account_id(&self) -> AwsResult<String> {
        let raw = self.run(&["sts", "get-caller-identity"])?;
        let value: Value = serde_json::from_str(&raw)?;
        value
            .get("Account")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AwsError::MalformedOutput("missing Account field".to_string()))
    }

    fn stack_exists(&self, name: &str) -> AwsResult<bool> {
        match self.describe_stack(name) {
            Ok(_) => Ok(true),
            // describe-stacks reports a missing stack as a ValidationError
            // on stderr rather than an empty result
            Err(AwsError::Cli { message, .. }) if message.contains("does not exist") => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn stack_outputs(&self, name: &str) -> AwsResult<BTreeMap<String, String>> {
        let stack = self.describe_stack(name)?;

        let mut outputs = BTreeMap::new();
        if let Some(entries) = stack.get("Outputs").and_then(Value::as_array) {
            for entry in entries {
                let key = entry.get("OutputKey").and_then(Value::as_str);
                let value = entry.get("OutputValue").and_then(Value::as_str);
                if let (Some(key), Some(value)) = (key, value) {
                    outputs.insert(key.to_string(), value.to_string());
                }
            }
        }

        Ok(outputs)
    }

    fn stack_template(&self, name: &str) -> AwsResult<String> {
        let raw = self.run(&["cloudformation", "get-template", "--stack-name", name])?;
        let value: Value = serde_json::from_str(&raw)?;

        match value.get("TemplateBody") {
            // YAML templates come back as a string, JSON templates as an object
            Some(Value::String(body)) => Ok(body.clone()),
            Some(other) => Ok(serde_json::to_string_pretty(other)?),
            None => Err(AwsError::MalformedOutput("missing TemplateBody".to_string())),
        }
    }
}
