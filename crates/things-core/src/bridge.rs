use std::collections::HashMap;
use std::env;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::debug;

use crate::script::Script;

pub const BRIDGE_CMD_ENV: &str = "THINGS_OSASCRIPT_CMD";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("osascript not found; install it or set THINGS_OSASCRIPT_CMD")]
    MissingBridge,
    #[error("invalid THINGS_OSASCRIPT_CMD: {0}")]
    InvalidCommand(String),
    #[error("error running {dialect} script: failed to start {program}: {source}")]
    Spawn {
        dialect: crate::script::Dialect,
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error running {dialect} script: {status}{}", stderr_suffix(.stderr))]
    Failed {
        dialect: crate::script::Dialect,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Runs a script and hands back its trimmed standard output.
///
/// Application-level failures arrive as `Ok` output starting with
/// [`crate::script::ERROR_PREFIX`]; `Err` is reserved for the process itself
/// failing.
pub trait ScriptRunner {
    fn run(&self, script: &Script) -> Result<String, BridgeError>;
}

impl<R: ScriptRunner + ?Sized> ScriptRunner for &R {
    fn run(&self, script: &Script) -> Result<String, BridgeError> {
        (**self).run(script)
    }
}

/// Runs scripts through `osascript`, passing the script inline with `-e`.
#[derive(Debug, Clone)]
pub struct Osascript {
    command: Vec<String>,
}

impl Osascript {
    pub fn new(command: Vec<String>) -> Result<Self, BridgeError> {
        if command.is_empty() {
            return Err(BridgeError::InvalidCommand("empty command".to_string()));
        }
        Ok(Self { command })
    }

    /// Resolve the bridge command from the environment, then `configured`,
    /// then `PATH`.
    pub fn discover(configured: Option<Vec<String>>) -> Result<Self, BridgeError> {
        let env_map: HashMap<String, String> = env::vars().collect();
        Self::new(resolve_bridge_command(configured, &env_map)?)
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

impl ScriptRunner for Osascript {
    fn run(&self, script: &Script) -> Result<String, BridgeError> {
        let program = &self.command[0];
        debug!(
            program = %program,
            dialect = %script.dialect,
            script_len = script.text.len(),
            "running bridge script"
        );
        let output = Command::new(program)
            .args(&self.command[1..])
            .args(script.dialect.osascript_args())
            .arg("-e")
            .arg(&script.text)
            .output()
            .map_err(|source| BridgeError::Spawn {
                dialect: script.dialect,
                program: program.clone(),
                source,
            })?;
        debug!(status = %output.status, "bridge exited");
        if !output.status.success() {
            return Err(BridgeError::Failed {
                dialect: script.dialect,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn resolve_bridge_command(
    configured: Option<Vec<String>>,
    env_map: &HashMap<String, String>,
) -> Result<Vec<String>, BridgeError> {
    if let Some(raw) = env_map
        .get(BRIDGE_CMD_ENV)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
    {
        let parts =
            shell_words::split(raw).map_err(|err| BridgeError::InvalidCommand(err.to_string()))?;
        if parts.is_empty() {
            return Err(BridgeError::InvalidCommand(raw.to_string()));
        }
        return Ok(parts);
    }

    if let Some(command) = configured.filter(|command| !command.is_empty()) {
        return Ok(command);
    }

    if let Ok(osascript) = which::which("osascript") {
        return Ok(vec![osascript.to_string_lossy().to_string()]);
    }

    Err(BridgeError::MissingBridge)
}
