//! External tool runner shared by the ffmpeg and yt-dlp adapters

use std::ffi::OsStr;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Failure of an external tool invocation
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {detail}")]
    Failed {
        program: String,
        status: String,
        detail: String,
    },
}

/// Run `program` to completion and return its stdout.
///
/// The child is killed if the returned future is dropped, so a caller-side
/// timeout also stops the process.
pub async fn run_tool<I, S>(program: &str, args: I) -> Result<String, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program, command = ?command.as_std(), "Running external tool");

    let output = command.output().await.map_err(|e| ToolError::Spawn {
        program: program.to_string(),
        source: e,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(program, stderr = %stderr, "External tool failed");
        let detail = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no error output")
            .trim()
            .to_string();
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            detail,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
