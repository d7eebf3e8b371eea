use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Available,
    /// The program ran but exited unsuccessfully.
    Failed(Option<i32>),
    TimedOut,
    /// The program could not be started, usually because it is not on the search path.
    SpawnFailed,
}

/// Checks whether a program is reachable through the search path.
pub trait SystemProbe {
    fn probe(
        &self,
        program: &str,
        arg: &str,
        timeout: Duration,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CommandProbe;

impl SystemProbe for CommandProbe {
    async fn probe(&self, program: &str, arg: &str, timeout: Duration) -> ProbeOutcome {
        let mut cmd = Command::new(program);
        cmd.arg(arg)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout, cmd.output()).await {
            Err(_) => ProbeOutcome::TimedOut,
            Ok(Err(e)) => {
                log::debug!("Could not run {} {}: {}", program, arg, e);
                ProbeOutcome::SpawnFailed
            }
            Ok(Ok(output)) if output.status.success() => ProbeOutcome::Available,
            Ok(Ok(output)) => ProbeOutcome::Failed(output.status.code()),
        }
    }
}
