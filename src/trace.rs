//! Call-stack capture for alert bodies.
//!
//! Frames are recorded innermost first and the walk stops at the first frame
//! that cannot be symbolized, so a trace never contains a placeholder entry.

use std::fmt;

/// Maximum number of frames recorded in a trace.
pub const MAX_DEPTH: usize = 100;

/// A single resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Source file, or `?` when debug info has no file for the frame.
    pub file: String,
    /// Demangled function name without the hash suffix.
    pub function: String,
    /// Source line, `0` when unknown.
    pub line: u32,
    /// Program counter of the frame.
    pub pc: usize,
    /// Entry address of the enclosing function.
    pub entry: usize,
}

/// An ordered list of resolved frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    frames: Vec<Frame>,
}

impl StackTrace {
    /// Captures the current call stack.
    ///
    /// Frames belonging to the capture itself are left out, so the first frame
    /// is the caller of this function.
    #[must_use]
    #[inline(never)]
    pub fn capture() -> Self {
        let backtrace = backtrace::Backtrace::new();

        let resolved = backtrace
            .frames()
            .iter()
            .map(resolve_frame)
            .skip_while(|frame| frame.as_ref().is_some_and(is_capture_frame));

        Self::from_frames(resolved, MAX_DEPTH)
    }

    /// Builds a trace from possibly unresolved frames.
    ///
    /// Stops at the first `None` and keeps at most `max_depth` frames.
    #[must_use]
    pub fn from_frames<I>(frames: I, max_depth: usize) -> Self
    where
        I: IntoIterator<Item = Option<Frame>>,
    {
        let frames = frames
            .into_iter()
            .map_while(|frame| frame)
            .take(max_depth)
            .collect();
        Self { frames }
    }

    /// Returns the recorded frames, innermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of recorded frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frame could be resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Renders the trace section of an alert body, one CRLF-terminated block per frame.
impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            write!(f, "Frame {index:02}:\r\n")?;
            write!(f, "\tFile: {}\r\n", frame.file)?;
            write!(f, "\tFunction: {}\r\n", frame.function)?;
            write!(f, "\tLine: {}\r\n", frame.line)?;
            write!(f, "\tPC/Entry: 0x{:08x}/0x{:08x}\r\n", frame.pc, frame.entry)?;
        }
        Ok(())
    }
}

fn resolve_frame(frame: &backtrace::BacktraceFrame) -> Option<Frame> {
    // Inlined calls yield several symbols; the first one is the innermost
    let symbol = frame.symbols().first()?;
    let name = symbol.name()?;

    Some(Frame {
        file: symbol
            .filename()
            .map_or_else(|| "?".to_string(), |path| path.display().to_string()),
        function: format!("{name:#}"),
        line: symbol.lineno().unwrap_or(0),
        pc: frame.ip() as usize,
        entry: frame.symbol_address() as usize,
    })
}

fn is_capture_frame(frame: &Frame) -> bool {
    frame.function.starts_with("backtrace::") || frame.function.ends_with("StackTrace::capture")
}
