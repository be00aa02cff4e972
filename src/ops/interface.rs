//! Interface synthesis: turning a preprocessed header into Swift declarations.
//!
//! The actual work is done by SourceKit. [`InterfaceService`] is the seam the
//! pipeline talks to; [`SourceKitten`] reaches SourceKit through the
//! `sourcekitten request` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::util::process::ProcessBuilder;

/// SourceKit request kind for generating the interface of a header.
pub const INTERFACE_REQUEST: &str = "source.request.editor.open.interface.header";

/// Response key holding the generated interface text.
pub const SOURCE_TEXT_KEY: &str = "key.sourcetext";

/// A request for the generated interface of one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRequest {
    pub file: PathBuf,
    pub uuid: String,
    pub arguments: Vec<String>,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    #[serde(rename = "key.request")]
    request: &'a str,
    #[serde(rename = "key.name")]
    name: &'a str,
    #[serde(rename = "key.filepath")]
    file_path: String,
    #[serde(rename = "key.compilerargs")]
    compiler_args: Vec<String>,
}

impl InterfaceRequest {
    /// Build a request with a fresh opaque id.
    pub fn new(file: impl Into<PathBuf>, arguments: Vec<String>) -> Self {
        InterfaceRequest {
            file: file.into(),
            uuid: new_uuid(),
            arguments,
        }
    }

    /// Compiler arguments as SourceKit expects them: `-x objective-c`, then
    /// the file, then the flags.
    ///
    /// `-x` only applies to inputs that follow it, so it must precede the
    /// file for the header to be parsed as Objective-C.
    pub fn compiler_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.arguments.len() + 3);
        args.push("-x".to_string());
        args.push("objective-c".to_string());
        args.push(self.file.to_string_lossy().into_owned());
        args.extend(self.arguments.iter().cloned());
        args
    }

    /// The request body in SourceKit's keyed form, as JSON.
    pub fn to_json(&self) -> Result<String> {
        let wire = WireRequest {
            request: INTERFACE_REQUEST,
            name: &self.uuid,
            file_path: self.file.to_string_lossy().into_owned(),
            compiler_args: self.compiler_args(),
        };
        serde_json::to_string(&wire).context("failed to encode interface request")
    }
}

/// Random id in the 8-4-4-4-12 hex layout.
pub fn new_uuid() -> String {
    let hex = format!("{:032X}", rand::thread_rng().gen::<u128>());
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Something that answers interface requests with a keyed result map.
pub trait InterfaceService {
    fn send(&self, request: &InterfaceRequest) -> Result<Map<String, Value>>;
}

/// Interface service backed by the `sourcekitten` command-line tool.
#[derive(Debug, Clone)]
pub struct SourceKitten {
    program: PathBuf,
}

impl SourceKitten {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        SourceKitten {
            program: program.into(),
        }
    }

    /// `sourcekitten request --yaml <request>`; JSON is valid YAML.
    pub fn command(&self, request: &InterfaceRequest) -> Result<ProcessBuilder> {
        Ok(ProcessBuilder::new(&self.program)
            .arg("request")
            .arg("--yaml")
            .arg(request.to_json()?))
    }
}

impl InterfaceService for SourceKitten {
    fn send(&self, request: &InterfaceRequest) -> Result<Map<String, Value>> {
        let stdout = self.command(request)?.exec_stdout()?;
        parse_response(&stdout)
    }
}

/// Parse a service response, which must be a JSON object.
pub fn parse_response(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text).context("failed to decode interface response")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("interface response is not an object: {}", other),
    }
}

/// The generated interface text of a response, if present and not blank.
pub fn source_text(response: &Map<String, Value>) -> Option<&str> {
    response
        .get(SOURCE_TEXT_KEY)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}
