use std::time::Duration;

use crate::error::EditorError;

/// The byte-polled keyboard source. `poll_byte` must never block: it
/// returns `None` immediately when nothing is available yet, matching the
/// source's `get_byte() -> i32` with a negative sentinel for "nothing now".
pub trait KeySource {
    fn poll_byte(&mut self) -> Option<u8>;
}

/// The raw byte sink to the terminal. Writes must not block indefinitely.
pub trait ByteSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EditorError>;
}

/// Optional deadline timer used only by the terminal prober. A host with no
/// timer source can use [`NeverTimer`], whose deadline never elapses —
/// probing then always times out eventually is wrong; instead probing with
/// `NeverTimer` relies on the reply arriving, and a host that truly has no
/// way to measure time should disable probing via
/// [`crate::engine::Engine::with_probing`] instead.
pub trait DeadlineTimer {
    fn arm(&mut self, dur: Duration);
    fn elapsed(&mut self) -> bool;
}

/// Timer that never reports elapsed; the default for hosts with no clock.
#[derive(Default)]
pub struct NeverTimer;

impl DeadlineTimer for NeverTimer {
    fn arm(&mut self, _dur: Duration) {}
    fn elapsed(&mut self) -> bool {
        false
    }
}

/// A timer backed by [`std::time::Instant`], for hosts that run on an OS.
#[derive(Default)]
pub struct InstantTimer {
    deadline: Option<std::time::Instant>,
}

impl DeadlineTimer for InstantTimer {
    fn arm(&mut self, dur: Duration) {
        self.deadline = Some(std::time::Instant::now() + dur);
    }

    fn elapsed(&mut self) -> bool {
        match self.deadline {
            Some(d) => std::time::Instant::now() >= d,
            None => false,
        }
    }
}
