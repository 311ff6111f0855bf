//! External command execution.
//!
//! Provides utilities for running PowerShell and system commands and
//! collecting their output.

use super::SourceError;
use colored::Colorize;
use regex::Regex;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

/// Largest stdout accepted from a single command.
const MAX_OUTPUT_BYTES: usize = 50_000_000;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run a command line and return its stdout.
///
/// The command string is split on spaces, with quoted substrings preserved.
pub fn run(cmd: &str, timeout: Duration) -> Result<String, SourceError> {
    let cmds: Vec<&str> = split_and_strip(cmd)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    log::trace!("split cmds={:?}", cmds);

    match cmds.split_first() {
        Some((program, args)) => run_args(program, args, timeout),
        None => Err("empty command".into()),
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf) {
            log::debug!("pipe read failed: {e}");
        }
    }
    buf
}

/// Run `program` with `args` passed through untouched and return its stdout.
///
/// The child is killed once `timeout` has passed.
pub fn run_args(program: &str, args: &[&str], timeout: Duration) -> Result<String, SourceError> {
    log::debug!("run({program} ..{} args)", args.len(), program = program.on_blue());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            log::error!("Command execution failed: {}", e);
            format!("Failed to execute {program}: {e}")
        })?;

    // pipes are drained on their own threads so a chatty child cannot block
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || read_pipe(stdout));
    let stderr_reader = thread::spawn(move || read_pipe(stderr));

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill {program}: {e}");
                }
                let _ = child.wait();
                log::warn!(
                    "{program} killed after {:.1}s",
                    timeout.as_secs_f64(),
                    program = program.on_blue()
                );
                return Err(format!(
                    "{program} timed out after {:.1}s",
                    timeout.as_secs_f64()
                )
                .into());
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("Failed waiting for {program}: {e}").into()),
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    if status.success() {
        log::debug!("Success output.stdout.len(): {}", stdout.len());
        if stdout.len() > MAX_OUTPUT_BYTES {
            return Err(format!("Response too large: {} bytes from {program}", stdout.len()).into());
        }
    } else {
        let stderr = String::from_utf8_lossy(&stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = status.code(),
            status = status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {program}",
            failed = "failed".on_red(),
            program = program.on_blue()
        );
        return Err(format!("ERROR running {program}: {}", stderr.trim()).into());
    }

    let stdout = String::from_utf8(stdout).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    Ok(stdout)
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}
