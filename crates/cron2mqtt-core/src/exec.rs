//! Running a cron job's command and capturing what it did.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cron2mqtt_protocols::{Clock, ExecResult};

/// Exit code reported when the command did not exit normally.
pub const ABNORMAL_EXIT_CODE: i32 = -1;

/// Run `program` with `args` and wait for it to finish.
///
/// Output is passed through to this process's stdout and stderr while also
/// being captured. Firing `cancel` kills the command; whatever it wrote until
/// then is kept. A command that could not be started, was killed or failed to
/// be waited on is reported with [`ABNORMAL_EXIT_CODE`], with the reason
/// appended to its stderr.
pub async fn run<S: AsRef<str>>(
    clock: &dyn Clock,
    cancel: &CancellationToken,
    program: &str,
    args: &[S],
) -> ExecResult {
    let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
    let mut command = Command::new(program);
    command
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let start = clock.now();
    let exit_code = match supervise(&mut command, cancel, &mut stdout, &mut stderr).await {
        Ok(Some(status)) => exit_code(status),
        Ok(None) => {
            debug!(program, "Killed cancelled command");
            ABNORMAL_EXIT_CODE
        }
        Err(err) => {
            warn!(program, error = %err, "Command failed to run");
            stderr.extend_from_slice(format!("cron2mqtt: {}: {}\n", program, err).as_bytes());
            ABNORMAL_EXIT_CODE
        }
    };
    let end = clock.now();
    debug!(program, exit_code, "Command finished");

    let mut all_args = Vec::with_capacity(args.len() + 1);
    all_args.push(program.to_string());
    all_args.extend(args);
    ExecResult {
        args: all_args,
        start,
        end,
        stdout,
        stderr,
        exit_code,
    }
}

/// Spawn `command` and wait for it, capturing into the given buffers.
///
/// Returns `None` when `cancel` fired and the command was killed.
async fn supervise(
    command: &mut Command,
    cancel: &CancellationToken,
    stdout_buf: &mut Vec<u8>,
    stderr_buf: &mut Vec<u8>,
) -> io::Result<Option<ExitStatus>> {
    let mut child = command.spawn()?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr was not captured"))?;

    let capture = async {
        tokio::try_join!(
            tee(stdout, tokio::io::stdout(), stdout_buf),
            tee(stderr, tokio::io::stderr(), stderr_buf),
        )
    };

    tokio::select! {
        _ = cancel.cancelled() => {
            child.kill().await?;
            Ok(None)
        }
        finished = async { tokio::try_join!(child.wait(), capture) } => {
            let (status, _) = finished?;
            Ok(Some(status))
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(ABNORMAL_EXIT_CODE)
}

/// Copy `reader` into `writer`, appending everything copied to `captured`.
async fn tee<R, W>(mut reader: R, mut writer: W, captured: &mut Vec<u8>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        captured.extend_from_slice(&buf[..n]);
        writer.write_all(&buf[..n]).await?;
    }
    writer.flush().await
}
