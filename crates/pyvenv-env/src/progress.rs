//! Progress reporting for bootstrap installs.
//!
//! Child output arrives line by line tagged `stdout`/`stderr`; milestones
//! ("Installing pip ...", "done.") are tagged `main`. Without a caller
//! callback, [`WriterSink`] echoes lines (verbose) or prints one dot per line.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamLabel {
    Stdout,
    Stderr,
    Main,
}

impl StreamLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamLabel::Stdout => "stdout",
            StreamLabel::Stderr => "stderr",
            StreamLabel::Main => "main",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Milestone {
    Installing(String),
    Done,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Milestone::Installing(name) => write!(f, "Installing {} ...", name),
            Milestone::Done => f.write_str("done."),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    /// Raw line from the child, newline included when present.
    Line { stream: StreamLabel, line: &'a [u8] },
    Milestone(&'a Milestone),
}

impl ProgressEvent<'_> {
    pub fn label(&self) -> StreamLabel {
        match self {
            ProgressEvent::Line { stream, .. } => *stream,
            ProgressEvent::Milestone(_) => StreamLabel::Main,
        }
    }
}

/// Receives bootstrap output. Called from the two pipe reader threads at once.
pub trait ProgressSink: Send + Sync {
    fn line(&self, stream: StreamLabel, line: &[u8]);
    fn milestone(&self, milestone: &Milestone);
}

/// Forwards every event to a caller-supplied closure.
pub struct CallbackSink<F>(F);

impl<F> CallbackSink<F>
where
    F: Fn(ProgressEvent<'_>) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> ProgressSink for CallbackSink<F>
where
    F: Fn(ProgressEvent<'_>) + Send + Sync,
{
    fn line(&self, stream: StreamLabel, line: &[u8]) {
        (self.0)(ProgressEvent::Line { stream, line });
    }

    fn milestone(&self, milestone: &Milestone) {
        (self.0)(ProgressEvent::Milestone(milestone));
    }
}

/// Writes progress as text; stderr in normal use.
pub struct WriterSink<W> {
    out: Mutex<W>,
    verbose: bool,
}

impl WriterSink<io::Stderr> {
    pub fn stderr(verbose: bool) -> Self {
        Self::new(io::stderr(), verbose)
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out: Mutex::new(out),
            verbose,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self, bytes: &[u8]) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }
}

impl<W: Write + Send> ProgressSink for WriterSink<W> {
    fn line(&self, _stream: StreamLabel, line: &[u8]) {
        if self.verbose {
            self.write(String::from_utf8_lossy(line).as_bytes());
        } else {
            self.write(b".");
        }
    }

    fn milestone(&self, milestone: &Milestone) {
        // Non-verbose mode keeps the dots on the "Installing" line.
        let text = match milestone {
            Milestone::Installing(_) if !self.verbose => milestone.to_string(),
            _ => format!("{}\n", milestone),
        };
        self.write(text.as_bytes());
    }
}
