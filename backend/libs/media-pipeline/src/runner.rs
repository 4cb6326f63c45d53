/// Typed external-process invocation.
///
/// Tools are always spawned with explicit argument vectors, never shell
/// strings, so file names cannot smuggle options or commands.
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Trimmed stderr for error reporting.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[async_trait]
pub trait MediaRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ToolOutput>;
}

/// Production runner over `tokio::process`, non-blocking so long encodes
/// never pin a worker thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl MediaRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ToolOutput> {
        debug!(program, ?args, "spawning media tool");
        let output = Command::new(program).args(args).output().await?;
        Ok(ToolOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
