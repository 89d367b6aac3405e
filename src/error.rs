use std::fmt;

/// Errors surfaced by the editor engine and its host-provided collaborators.
///
/// `ProbeTimeout`, `ParseError` and `AllocFailure` are soft: the engine
/// catches them itself and degrades gracefully (dumb-terminal mode, or a
/// no-op completion/history add). `Interrupted`, `Eof` and `Io` are the
/// only variants a host ever sees returned from a public operation.
#[derive(Debug)]
pub enum EditorError {
    /// The terminal prober armed a deadline and it elapsed with no reply.
    ProbeTimeout,
    /// A cursor-position report (or other probe reply) did not parse.
    ParseError(String),
    /// A bounded collection (history, completion set) was asked to grow
    /// past capacity and the push was dropped.
    AllocFailure,
    /// Ctrl-C.
    Interrupted,
    /// Ctrl-D on an empty buffer.
    Eof,
    /// History file I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::ProbeTimeout => write!(f, "terminal did not answer the column probe"),
            EditorError::ParseError(msg) => write!(f, "could not parse terminal reply: {msg}"),
            EditorError::AllocFailure => write!(f, "bounded collection is full"),
            EditorError::Interrupted => write!(f, "interrupted"),
            EditorError::Eof => write!(f, "end of file"),
            EditorError::Io(e) => write!(f, "history I/O error: {e}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EditorError {
    fn from(e: std::io::Error) -> Self {
        EditorError::Io(e)
    }
}
