//! Streamed child process execution.
//!
//! Stdout and stderr are piped separately and forwarded line-by-line over a
//! channel by two reader threads, so output appears incrementally in arrival
//! order and neither pipe can fill up and deadlock the child. The loop ends
//! only when both pipes hit end-of-stream; the child is reaped afterwards
//! for its real exit status. There is no timeout: a hung child hangs the
//! batch.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use colored::{Color, Colorize};
use tracing::debug;

use crate::report;

/// One external command to stream.
#[derive(Debug, Clone)]
pub struct StreamRequest<'a> {
    /// Program and arguments; must be non-empty.
    pub argv: &'a [String],
    pub cwd: &'a Path,
    /// Color for the elapsed-time/line-number tags, so simulation output is
    /// visually distinct from hook output.
    pub color: Color,
}

/// One received output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedLine {
    /// Wall-clock time since spawn.
    pub elapsed: Duration,
    /// Sequential counter starting at 1.
    pub number: u64,
    pub text: String,
}

/// Everything one execution produced.
#[derive(Debug)]
pub struct StreamOutcome {
    pub status: ExitStatus,
    pub lines: Vec<StreamedLine>,
}

/// Spawn the command and stream its merged output until it exits.
///
/// Each line is printed as it arrives, tagged with elapsed time and a
/// zero-padded counter, with `Error`/`Warning`/`Failed` keywords
/// emphasized. The environment is inherited unmodified. A non-zero exit
/// status is returned, not raised; failure policy belongs to the caller.
pub fn stream_command(request: &StreamRequest<'_>) -> Result<StreamOutcome> {
    let (program, args) = request
        .argv
        .split_first()
        .ok_or_else(|| anyhow!("empty command"))?;

    debug!(program, cwd = %request.cwd.display(), "spawning child process");
    let mut child = Command::new(program)
        .args(args)
        .current_dir(request.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn `{program}`"))?;
    let start = Instant::now();

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let (sender, receiver) = mpsc::channel::<Vec<u8>>();
    let stderr_sender = sender.clone();
    let stdout_handle = thread::spawn(move || forward_lines(stdout, &sender));
    let stderr_handle = thread::spawn(move || forward_lines(stderr, &stderr_sender));

    // The receive loop ends when both reader threads drop their senders,
    // i.e. both pipes reached end-of-stream.
    let mut lines = Vec::new();
    let mut number = 0u64;
    for raw in receiver {
        number += 1;
        let elapsed = start.elapsed();
        let text = decode_line(&raw);
        println!(
            "{} {} {}",
            format!("{:>8.2}s", elapsed.as_secs_f64()).color(request.color),
            format!("{number:04}").color(request.color),
            report::highlight_findings(&text)
        );
        lines.push(StreamedLine {
            elapsed,
            number,
            text,
        });
    }

    join_reader(stdout_handle).context("stdout reader")?;
    join_reader(stderr_handle).context("stderr reader")?;

    let status = child
        .wait()
        .with_context(|| format!("wait for `{program}`"))?;
    debug!(exit_code = ?status.code(), "command finished");
    Ok(StreamOutcome { status, lines })
}

fn forward_lines<R: Read>(reader: R, sender: &mpsc::Sender<Vec<u8>>) -> Result<()> {
    let mut reader = BufReader::new(reader);
    loop {
        let mut line = Vec::new();
        let n = reader
            .read_until(b'\n', &mut line)
            .context("read child output")?;
        if n == 0 {
            return Ok(());
        }
        while line.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
            line.pop();
        }
        if sender.send(line).is_err() {
            return Ok(());
        }
    }
}

fn join_reader(handle: thread::JoinHandle<Result<()>>) -> Result<()> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
