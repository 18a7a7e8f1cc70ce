//! Stash raw-plugin invocation protocol.
//!
//! Stash hands the plugin one JSON object on stdin (server connection plus
//! task arguments) and expects one JSON object back on stdout. Log lines and
//! task progress go to stderr, each prefixed with a SOH level byte and an
//! STX separator so the host can route them.

use std::io::{Read, Write};
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};

/// Full stdin payload for one plugin invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginInput {
    #[serde(default)]
    pub args: PluginArgs,
    pub server_connection: ServerConnection,
}

/// Task arguments: an explicit mode for task invocations, a hook context
/// when triggered by a scene hook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginArgs {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "hookContext")]
    pub hook_context: Option<HookContext>,
}

/// Hook payload. The full pass runs regardless; the context is only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct HookContext {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    pub hook_type: Option<String>,
}

/// Connection details for the invoking Stash instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConnection {
    #[serde(rename = "Scheme")]
    pub scheme: String,
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(default, rename = "SessionCookie")]
    pub session_cookie: Option<SessionCookie>,
    #[serde(default, rename = "ApiKey")]
    pub api_key: Option<String>,
    #[serde(rename = "PluginDir")]
    pub plugin_dir: PathBuf,
    #[serde(default, rename = "Dir")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCookie {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl ServerConnection {
    /// GraphQL endpoint of the invoking instance.
    pub fn graphql_url(&self) -> String {
        // Stash reports its bind address; 0.0.0.0 is not dialable.
        let host = if self.host == "0.0.0.0" {
            "localhost"
        } else {
            self.host.as_str()
        };
        format!("{}://{}:{}/graphql", self.scheme, host, self.port)
    }
}

/// Operation mode requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run the full download-and-convert pass.
    Download,
    /// Plugin disabled; exit without doing anything.
    Disable,
}

impl PluginArgs {
    /// Resolve the requested mode. No mode (hook invocation) runs the full
    /// pass, same as an explicit `download`.
    pub fn mode(&self) -> Result<Mode> {
        match self.mode.as_deref() {
            None | Some("download") => Ok(Mode::Download),
            Some("disable") => Ok(Mode::Disable),
            Some(other) => Err(Error::malformed(format!("unknown mode: {other}"))),
        }
    }
}

/// Parse the plugin input JSON from the host.
pub fn read_input<R: Read>(mut reader: R) -> Result<PluginInput> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::malformed(format!("plugin input: {e}")))
}

/// Write the success reply to stdout.
pub fn write_output<W: Write>(mut writer: W, output: serde_json::Value) -> Result<()> {
    let reply = json!({ "output": output });
    serde_json::to_writer(&mut writer, &reply)
        .map_err(|e| Error::malformed(format!("encoding plugin output: {e}")))?;
    writeln!(writer)?;
    Ok(())
}

/// Write the error reply to stdout.
pub fn write_error<W: Write>(mut writer: W, message: &str) -> Result<()> {
    let reply = json!({ "error": message });
    serde_json::to_writer(&mut writer, &reply)
        .map_err(|e| Error::malformed(format!("encoding plugin output: {e}")))?;
    writeln!(writer)?;
    Ok(())
}

/// Report fractional task progress (0.0..=1.0) to the host.
///
/// Stash parses stderr lines of the form `\x01<level>\x02<body>`; progress
/// uses level `p` with the fraction as the body.
pub fn log_progress(fraction: f64) {
    let clamped = fraction.clamp(0.0, 1.0);
    eprintln!("\u{1}p\u{2}{clamped}");
}
