use std::io::BufRead;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, error, warn};

use super::types::{CancelToken, OutputLine, ToolCommand, ToolResult};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Spawn a tool and return a channel that streams its output.
///
/// The caller receives [`OutputLine::Stdout`]/[`Stderr`] as they arrive,
/// followed by exactly one [`OutputLine::Done`] carrying the final result.
///
/// A spawn failure (binary not found or not executable) is returned as `Err`
/// right here, before any output is streamed.
pub fn spawn(cmd: ToolCommand, cancel: CancelToken) -> Result<Receiver<OutputLine>> {
    debug!(program = %cmd.program, "spawning tool");
    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            error!(program = %cmd.program, err = %e, "failed to spawn tool");
            e
        })
        .with_context(|| format!("failed to run `{}` — is it installed and on PATH?", cmd.program))?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        supervise(
            child,
            stdout,
            stderr,
            tx,
            cancel,
            cmd.program,
            cmd.timeout,
            cmd.log_path,
        );
    });

    Ok(rx)
}

#[allow(clippy::too_many_arguments)]
fn supervise(
    mut child: std::process::Child,
    stdout: std::process::ChildStdout,
    stderr: std::process::ChildStderr,
    tx: Sender<OutputLine>,
    cancel: CancelToken,
    program: String,
    timeout: Duration,
    log_path: Option<std::path::PathBuf>,
) {
    // Accumulates all output for the final log / log_path write.
    let log_buf = std::sync::Arc::new(std::sync::Mutex::new(String::new()));

    // --- reader threads ---------------------------------------------------
    let tx_out = tx.clone();
    let buf_out = log_buf.clone();
    let stdout_handle = std::thread::spawn(move || {
        let reader = std::io::BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(l) => {
                    if let Ok(mut buf) = buf_out.lock() {
                        buf.push_str(&l);
                        buf.push('\n');
                    }
                    // Receiver may be dropped — ignore send errors.
                    let _ = tx_out.send(OutputLine::Stdout(l));
                }
                Err(_) => break,
            }
        }
    });

    let tx_err = tx.clone();
    let buf_err = log_buf.clone();
    let stderr_handle = std::thread::spawn(move || {
        let reader = std::io::BufReader::new(stderr);
        for line in reader.lines() {
            match line {
                Ok(l) => {
                    if let Ok(mut buf) = buf_err.lock() {
                        buf.push_str(&l);
                        buf.push('\n');
                    }
                    let _ = tx_err.send(OutputLine::Stderr(l));
                }
                Err(_) => break,
            }
        }
    });

    // --- wait loop ---------------------------------------------------------
    let start = Instant::now();
    let mut cancelled = false;
    let mut timed_out = false;

    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(_) => break None,
        }

        if cancel.is_cancelled() {
            cancelled = true;
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }

        if start.elapsed() > timeout {
            warn!(program = %program, timeout_secs = timeout.as_secs(), "tool timed out, killing");
            timed_out = true;
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }

        std::thread::sleep(POLL_INTERVAL);
    };

    // --- finalize ----------------------------------------------------------
    let _ = stdout_handle.join();
    let _ = stderr_handle.join();

    let exit_code = exit_status.and_then(|s| s.code());
    let success = exit_code == Some(0);
    let log = log_buf.lock().map(|b| b.clone()).unwrap_or_default();

    if let Some(path) = log_path {
        let _ = std::fs::write(&path, &log);
    }

    debug!(program = %program, exit_code = ?exit_code, cancelled, timed_out, "tool finished");
    let _ = tx.send(OutputLine::Done(ToolResult {
        success,
        exit_code,
        log,
        cancelled,
        timed_out,
    }));
}
