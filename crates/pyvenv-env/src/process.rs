//! Child process helpers shared by the builder and the proxy.

use crate::progress::{ProgressSink, StreamLabel};
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// Exit code to report for a finished child.
///
/// Unix children killed by a signal report `128 + signal`, like shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Run `cmd` with both pipes captured, forwarding every line to `sink`.
///
/// Each pipe is drained on its own thread while the child runs; otherwise a
/// child filling one pipe buffer blocks forever. Both readers are joined
/// after the child exits so no trailing output is lost. Ordering between the
/// two streams is not preserved.
pub fn run_streaming(cmd: &mut Command, sink: &dyn ProgressSink) -> Result<ExitStatus> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    tracing::debug!(command = ?cmd, "spawning with streamed output");
    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {:?}", cmd.get_program()))?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    thread::scope(|s| {
        let readers = [
            stdout.map(|out| s.spawn(move || drain(out, StreamLabel::Stdout, sink))),
            stderr.map(|err| s.spawn(move || drain(err, StreamLabel::Stderr, sink))),
        ];
        let status = child.wait().context("Failed to wait for child process");
        for reader in readers.into_iter().flatten() {
            if reader.join().is_err() {
                tracing::warn!("output reader thread panicked");
            }
        }
        status
    })
}

fn drain<R: Read>(stream: R, label: StreamLabel, sink: &dyn ProgressSink) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => sink.line(label, &buf),
            Err(e) => {
                tracing::warn!(stream = label.as_str(), error = %e, "stopped reading child output");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::progress::{CallbackSink, ProgressEvent};
    use std::sync::Mutex;

    #[test]
    fn test_streams_both_pipes_and_returns_status() {
        let lines = Mutex::new(Vec::new());
        let sink = CallbackSink::new(|event: ProgressEvent<'_>| {
            if let ProgressEvent::Line { stream, line } = event {
                lines
                    .lock()
                    .unwrap()
                    .push((stream, String::from_utf8_lossy(line).into_owned()));
            }
        });
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "echo one; echo two >&2; printf three; exit 4"]);
        let status = run_streaming(&mut cmd, &sink).unwrap();
        drop(sink);
        assert_eq!(exit_code(status), 4);

        let mut lines = lines.into_inner().unwrap();
        lines.sort();
        assert_eq!(
            lines,
            vec![
                (StreamLabel::Stdout, "one\n".to_string()),
                (StreamLabel::Stdout, "three".to_string()),
                (StreamLabel::Stderr, "two\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_large_output_does_not_block() {
        let count = Mutex::new(0usize);
        let sink = CallbackSink::new(|_: ProgressEvent<'_>| {
            *count.lock().unwrap() += 1;
        });
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "i=0; while [ $i -lt 5000 ]; do echo line-$i; echo err-$i >&2; i=$((i+1)); done"]);
        let status = run_streaming(&mut cmd, &sink).unwrap();
        drop(sink);
        assert!(status.success());
        assert_eq!(count.into_inner().unwrap(), 10_000);
    }

    #[test]
    fn test_signal_exit_code() {
        let status = Command::new("/bin/sh")
            .args(["-c", "kill -9 $$"])
            .status()
            .unwrap();
        assert_eq!(exit_code(status), 128 + 9);
    }
}
