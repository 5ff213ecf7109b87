// src/exec/process.rs

//! Child-process plumbing: spawning with a merged output stream, and
//! graceful termination.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// An executable plus its argument list. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        // Keep console windows from flashing up on Windows.
        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Spawn `invocation` with stdout and stderr merged into one line channel.
///
/// Both streams are wired to the write end of a single OS pipe, so lines
/// arrive in the order the child wrote them. The channel closes once the
/// child (and anything it spawned) closes the pipe. Bytes that are not
/// valid UTF-8 are replaced rather than ending the stream.
pub fn spawn_merged(invocation: &Invocation) -> Result<(Child, mpsc::UnboundedReceiver<String>)> {
    let (reader, writer) = io::pipe().context("creating output pipe")?;
    let writer_err = writer.try_clone().context("duplicating output pipe")?;

    let mut cmd = invocation.command();
    cmd.stdin(Stdio::null())
        .stdout(writer)
        .stderr(writer_err)
        .kill_on_drop(true);

    let spawned = cmd.spawn();
    // Our copies of the write end live in `cmd`; EOF needs them closed.
    drop(cmd);
    let child =
        spawned.with_context(|| format!("spawning '{}'", invocation.program().display()))?;

    let (tx, rx) = mpsc::unbounded_channel();
    spawn_pipe_reader(reader, tx)?;

    Ok((child, rx))
}

#[cfg(unix)]
fn spawn_pipe_reader(reader: io::PipeReader, tx: mpsc::UnboundedSender<String>) -> Result<()> {
    use std::os::fd::OwnedFd;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::unix::pipe;

    let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))
        .context("registering output pipe")?;

    tokio::spawn(async move {
        let mut reader = BufReader::new(receiver);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                        // Receiver gone: the run is over, stop reading.
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "output pipe read failed");
                    break;
                }
            }
        }

        debug!("output reader finished");
    });

    Ok(())
}

#[cfg(not(unix))]
fn spawn_pipe_reader(reader: io::PipeReader, tx: mpsc::UnboundedSender<String>) -> Result<()> {
    use std::io::BufRead;

    tokio::task::spawn_blocking(move || {
        let mut reader = io::BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "output pipe read failed");
                    break;
                }
            }
        }

        debug!("output reader finished");
    });

    Ok(())
}

/// Ask `child` to exit, escalating to a forced kill after `grace`.
///
/// On Unix the first step is `SIGTERM`. Elsewhere there is no gentler
/// request than termination, so the child is killed straight away.
pub async fn terminate(child: &mut Child, grace: Duration) -> Result<ExitStatus> {
    if let Some(status) = child.try_wait().context("polling child status")? {
        return Ok(status);
    }

    if request_exit(child) {
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => return status.context("waiting for terminated child"),
            Err(_) => {
                warn!(
                    pid = child.id(),
                    grace_ms = grace.as_millis() as u64,
                    "child ignored termination request; killing"
                );
            }
        }
    }

    child.kill().await.context("killing child process")?;
    child.wait().await.context("waiting for killed child")
}

#[cfg(unix)]
fn request_exit(child: &Child) -> bool {
    let Some(pid) = child.id() else {
        return false;
    };
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };

    // SAFETY: `kill` has no memory-safety preconditions; the pid belongs to a
    // child we have not reaped yet.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        debug!(pid, error = %std::io::Error::last_os_error(), "SIGTERM failed");
        return false;
    }
    true
}

#[cfg(not(unix))]
fn request_exit(_child: &Child) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_display_joins_arguments() {
        let inv = Invocation::new("tools/SuspensionTools.exe")
            .arg("hardpoints")
            .args(["add", "front.json"]);
        assert_eq!(
            inv.to_string(),
            "tools/SuspensionTools.exe hardpoints add front.json"
        );
        assert_eq!(inv.arguments().len(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn merged_stream_keeps_write_order() {
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("echo A; echo B 1>&2; echo C; echo D 1>&2; echo E");
        let (mut child, mut rx) = spawn_merged(&inv).unwrap();

        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line.trim().to_string());
        }
        assert_eq!(lines, vec!["A", "B", "C", "D", "E"]);
        assert!(child.wait().await.unwrap().success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn terminate_escalates_to_kill() {
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("trap '' TERM; sleep 30");
        let (mut child, _rx) = spawn_merged(&inv).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = tokio::time::timeout(
            Duration::from_secs(5),
            terminate(&mut child, Duration::from_millis(200)),
        )
        .await
        .expect("terminate finished")
        .unwrap();
        assert!(!status.success());
    }
}
