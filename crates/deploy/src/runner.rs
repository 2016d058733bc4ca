//! Spawning the external deployment tool.

use std::{future::Future, path::Path, process::Stdio};

use tokio::process::Command;

use crate::error::{DeployError, Result};

/// Runs one tool invocation to completion and returns its stdout.
pub trait ToolRunner {
    /// Run `argv` (binary first) with `workdir` as the child's working directory.
    ///
    /// `contract` is only used for error reporting.
    fn run(
        &self,
        contract: &str,
        argv: &[String],
        workdir: Option<&Path>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// [`ToolRunner`] backed by a real child process.
///
/// Stdout is captured, stderr is passed through to the terminal. The call
/// waits for the child to exit without any timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(&self, contract: &str, argv: &[String], workdir: Option<&Path>) -> Result<String> {
        let (program, args) = argv.split_first().ok_or_else(|| DeployError::ToolInvocation {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        if let Some(workdir) = workdir {
            cmd.current_dir(workdir);
        }

        let output = cmd.output().await.map_err(|source| DeployError::ToolInvocation {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(DeployError::ToolExited {
                program: program.clone(),
                contract: contract.to_string(),
                status: output.status,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::trace!(contract, stdout = %stdout, "Tool output");

        Ok(stdout)
    }
}
