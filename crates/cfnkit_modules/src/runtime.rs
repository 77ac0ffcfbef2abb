//! Module runtime: argument binding and response shaping.
//!
//! Every module binary follows the Ansible binary-module protocol: the host
//! passes a JSON arguments file as the single positional argument (stdin is
//! accepted as a fallback for manual runs), and the module prints exactly
//! one JSON response object to stdout. Success and failure map to exit
//! codes 0 and 1; a failure response additionally carries `failed: true`
//! and a `msg`.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes understood by the host.
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
}

/// Command line of every module binary.
#[derive(Parser)]
pub struct ModuleCli {
    /// Path to the JSON arguments file (read from stdin when absent)
    pub args_file: Option<PathBuf>,
}

/// Structured response returned to the host.
///
/// Always carries `changed` (no module mutates cloud state, so it is always
/// `false`); handlers add their own fields on top.
#[derive(Debug, Clone)]
pub struct Response {
    fields: Map<String, Value>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        let mut fields = Map::new();
        fields.insert("changed".to_string(), Value::Bool(false));
        Self { fields }
    }

    /// Set a response field, replacing any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Read a response field back.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Serialize the response to the single JSON line the host consumes.
    pub fn into_json(self) -> String {
        Value::Object(self.fields).to_string()
    }
}

/// Uniform failure signal: a host-facing message plus the partially
/// populated response.
#[derive(Debug)]
pub struct ModuleFailure {
    pub msg: String,
    pub response: Response,
}

impl ModuleFailure {
    pub fn new(msg: impl Into<String>, response: Response) -> Self {
        Self {
            msg: msg.into(),
            response,
        }
    }
}

/// Result of a handler body.
pub type ModuleResult = Result<Response, ModuleFailure>;

/// Bind the module arguments from the args file or stdin.
///
/// Unknown fields (e.g. `_ansible_check_mode`) are ignored; a missing
/// required field or malformed JSON fails before the handler body runs.
pub fn load_args<T: DeserializeOwned>(cli: &ModuleCli) -> Result<T, ModuleFailure> {
    let raw = match &cli.args_file {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            binding_failure(format!("Cannot read arguments file {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| binding_failure(format!("Cannot read arguments from stdin: {}", e)))?;
            buffer
        }
    };

    serde_json::from_str(&raw)
        .map_err(|e| binding_failure(format!("Invalid module arguments: {}", e)))
}

fn binding_failure(msg: String) -> ModuleFailure {
    ModuleFailure::new(msg, Response::new())
}

/// Print the response object on stdout and map the outcome to an exit code.
pub fn respond(result: ModuleResult) -> ExitCode {
    match result {
        Ok(response) => {
            println!("{}", response.into_json());
            ExitCode::from(ExitCodes::SUCCESS)
        }
        Err(failure) => {
            let mut response = failure.response;
            response.set("failed", Value::Bool(true));
            response.set("msg", Value::String(failure.msg));
            println!("{}", response.into_json());
            ExitCode::from(ExitCodes::FAILURE)
        }
    }
}

/// Initialize logging for a module binary.
///
/// Log output goes to stderr; stdout is reserved for the response object.
pub fn init_logging() {
    let log_result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive("cfnkit=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}
