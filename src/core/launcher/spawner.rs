use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// A fully resolved program plus argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

/// How a child ended. `code` is `None` when it was killed by a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitSummary {
    pub code: Option<i32>,
}

impl ExitSummary {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Starts child processes for the launcher.
pub trait ProcessSpawner: Send + Sync + 'static {
    fn spawn(&self, invocation: &Invocation) -> io::Result<Box<dyn SpawnedProcess>>;
}

#[async_trait]
pub trait SpawnedProcess: Send + 'static {
    fn id(&self) -> Option<u32>;

    async fn wait(&mut self) -> io::Result<ExitSummary>;

    async fn kill(&mut self) -> io::Result<()>;
}

/// Spawns real OS processes with tokio, detached from our stdio.
pub struct TokioProcessSpawner;

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(&self, invocation: &Invocation) -> io::Result<Box<dyn SpawnedProcess>> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let child = command.spawn()?;
        Ok(Box::new(TokioProcess { child }))
    }
}

struct TokioProcess {
    child: Child,
}

#[async_trait]
impl SpawnedProcess for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> io::Result<ExitSummary> {
        let status = self.child.wait().await?;
        Ok(ExitSummary {
            code: status.code(),
        })
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}
